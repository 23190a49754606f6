//! Message queues.
//!
//! A queue holds up to a fixed number of messages, each at most a fixed
//! number of bytes and tagged with a type. Readers select by type.

use kestrel_abi::flags::MsgFlags;
use kestrel_abi::wire::MsgKey;

use crate::syscall::{self, SysResult};

/// Message queue handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgQueue {
    key: MsgKey,
}

impl MsgQueue {
    /// Create a queue of `slots` messages of at most `max_bytes` each.
    pub fn create(slots: u64, max_bytes: u64) -> SysResult<MsgQueue> {
        let key = unsafe { syscall::create_msg_queue(slots, max_bytes) }?;
        Ok(MsgQueue { key })
    }

    /// Attach to an existing queue by key.
    pub const fn from_key(key: MsgKey) -> Self {
        Self { key }
    }

    pub const fn key(&self) -> MsgKey {
        self.key
    }

    /// Queue a message of type `msg_type`.
    ///
    /// With [`MsgFlags::NO_BLOCK`] a full queue fails with `Busy` instead
    /// of waiting.
    pub fn send(&self, msg_type: u64, data: &[u8], flags: MsgFlags) -> SysResult<()> {
        unsafe { syscall::write_msg_queue(self.key, msg_type, data.as_ptr(), data.len(), flags) }
    }

    /// Dequeue the next message of type `msg_type` into `buf`. Returns its
    /// length.
    pub fn recv(&self, msg_type: u64, buf: &mut [u8], flags: MsgFlags) -> SysResult<usize> {
        unsafe { syscall::read_msg_queue(self.key, msg_type, buf.as_mut_ptr(), buf.len(), flags) }
    }

    /// Close the queue.
    pub fn close(self) -> SysResult<()> {
        unsafe { syscall::close_msg_queue(self.key) }
    }
}
