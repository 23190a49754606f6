//! Process and thread management for userspace.
//!
//! This module provides functions to control the current process, create
//! new processes and threads, and wait for them.

use alloc::vec::Vec;
use core::ffi::CStr;

use kestrel_abi::flags::{ProcessFlags, ThreadFlags};
use kestrel_abi::wire::{CpuMask, Pid, Tid};

use crate::syscall::{self, SysResult};

/// Exit the current process.
pub fn exit(code: i64) -> ! {
    let _ = unsafe { syscall::exit(code) };
    // Should never reach here
    loop {
        core::hint::spin_loop();
    }
}

/// Exit the current thread.
pub fn exit_thread(code: i64) -> ! {
    let _ = unsafe { syscall::exit_thread(code) };
    loop {
        core::hint::spin_loop();
    }
}

/// Null-terminated pointer array for argv/envp.
fn pointer_array(strings: &[&CStr]) -> Vec<*const u8> {
    strings
        .iter()
        .map(|s| s.as_ptr().cast::<u8>())
        .chain(core::iter::once(core::ptr::null()))
        .collect()
}

/// Start the program at `path`.
pub fn spawn(path: &CStr, argv: &[&CStr], envp: &[&CStr], flags: ProcessFlags) -> SysResult<Pid> {
    let argv = pointer_array(argv);
    let envp = pointer_array(envp);
    unsafe { syscall::create_process(path.as_ptr().cast(), argv.as_ptr(), envp.as_ptr(), flags) }
}

/// Wait for process `pid` to exit. Returns its exit code.
pub fn wait(pid: Pid) -> SysResult<i64> {
    let mut code = 0i64;
    unsafe { syscall::wait_process(pid, &mut code) }?;
    Ok(code)
}

/// Thread entry function type.
pub type ThreadFn = extern "C" fn(arg: u64) -> i64;

/// Create a thread running `entry(arg)`.
pub fn spawn_thread(entry: ThreadFn, arg: u64, flags: ThreadFlags) -> SysResult<Tid> {
    unsafe { syscall::create_thread(entry as *const u8, arg, flags) }
}

/// Join a thread (wait for it to finish). Returns its exit code.
pub fn join(tid: Tid) -> SysResult<i64> {
    let mut code = 0i64;
    unsafe { syscall::join(tid, &mut code) }?;
    Ok(code)
}

/// Let a thread run to completion without being joined.
pub fn detach(tid: Tid) -> SysResult<()> {
    unsafe { syscall::detach(tid) }
}

/// Sleep for milliseconds.
pub fn sleep_ms(ms: u64) -> SysResult<()> {
    unsafe { syscall::sleep(ms) }
}

/// CPUs the calling thread may run on.
pub fn cpumask() -> SysResult<CpuMask> {
    let mut mask = CpuMask::NONE;
    unsafe { syscall::get_cpumask(&mut mask.low, &mut mask.high) }?;
    Ok(mask)
}

/// Restrict the calling thread to `mask`.
pub fn set_cpumask(mask: CpuMask) -> SysResult<()> {
    unsafe { syscall::set_cpumask(mask.low, mask.high) }
}
