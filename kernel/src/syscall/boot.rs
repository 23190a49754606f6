//! Handlers available before the rest of the kernel registers its own.
//!
//! Only `none` and `log` are served; everything else keeps the default
//! [`Error::Failed`].

use kestrel_abi::{Error, SysResult};

use super::Handlers;
use crate::config::MAX_LOG_MESSAGE;

/// Boot-time handler set.
#[derive(Debug, Default, Clone, Copy)]
pub struct BootHandlers;

impl Handlers for BootHandlers {
    fn none(&self) -> SysResult<()> {
        Ok(())
    }

    fn log(&self, message: *const u8, len: usize) -> SysResult<()> {
        if message.is_null() {
            return Err(Error::Param);
        }
        if len > MAX_LOG_MESSAGE {
            return Err(Error::Buffer);
        }

        // SAFETY: the caller owns `len` bytes at `message`; user memory is
        // still identity-accessible while its address space is active.
        let bytes = unsafe { core::slice::from_raw_parts(message, len) };
        let text = core::str::from_utf8(bytes).map_err(|_| Error::Param)?;
        log::info!(target: "user", "{}", text);
        Ok(())
    }
}
