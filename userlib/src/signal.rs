//! Signals for userspace.

use core::ptr;

use kestrel_abi::signal::{SigInfo, SigMask, SigSet, SigTarget, Signal, SigmaskOp};
use kestrel_abi::wire::Pid;

use crate::syscall::{self, Error, SysResult};

/// Raise `signal` on the calling thread.
pub fn raise(signal: Signal, value: u64) -> SysResult<()> {
    let info = SigInfo { value };
    unsafe { syscall::raise(signal, &info) }
}

/// Send `signal` to process `pid`.
pub fn kill(pid: Pid, signal: Signal, value: u64) -> SysResult<()> {
    let info = SigInfo { value };
    unsafe { syscall::sigsend(pid.raw(), signal, &info, SigTarget::Process) }
}

/// Send `signal` to process group `group`.
pub fn kill_group(group: u64, signal: Signal, value: u64) -> SysResult<()> {
    let info = SigInfo { value };
    unsafe { syscall::sigsend(group, signal, &info, SigTarget::Group) }
}

/// Block until a signal arrives.
pub fn wait() -> SysResult<(Signal, SigInfo)> {
    let mut number = 0u64;
    let mut info = SigInfo::default();
    unsafe { syscall::sigwait(&mut number, &mut info) }?;
    let signal = Signal::from_raw(number).ok_or(Error::Internal)?;
    Ok((signal, info))
}

fn opt_ptr(set: Option<&mut SigSet>) -> *mut SigSet {
    set.map_or(ptr::null_mut(), |s| s as *mut SigSet)
}

/// Apply `op` to each sub-mask whose operand is given. On return every
/// given set holds the resulting mask.
pub fn mask(
    op: SigmaskOp,
    valid: Option<&mut SigSet>,
    block: Option<&mut SigSet>,
    ignore: Option<&mut SigSet>,
) -> SysResult<()> {
    unsafe { syscall::sigmask(op, opt_ptr(valid), opt_ptr(block), opt_ptr(ignore)) }
}

/// The calling thread's current masks.
pub fn current_mask() -> SysResult<SigMask> {
    let mut current = SigMask::default();
    mask(
        SigmaskOp::Get,
        Some(&mut current.valid),
        Some(&mut current.block),
        Some(&mut current.ignore),
    )?;
    Ok(current)
}

/// Block `signals` in addition to those already blocked.
pub fn block(signals: SigSet) -> SysResult<SigSet> {
    let mut set = signals;
    mask(SigmaskOp::Or, None, Some(&mut set), None)?;
    Ok(set)
}
