//! Memory management for userspace.
//!
//! This module provides program break and memory mapping functions.

use core::ptr::NonNull;

use kestrel_abi::flags::MmapFlags;
use kestrel_abi::wire::Fd;

use crate::syscall::{self, Error, SysResult};

/// Set the program break to `address`.
pub fn brk(address: usize) -> SysResult<()> {
    unsafe { syscall::brk(address as u64) }
}

/// Move the program break by `increment` bytes. Returns the previous
/// break, i.e. the start of the new memory when growing.
pub fn sbrk(increment: isize) -> SysResult<NonNull<u8>> {
    let old = unsafe { syscall::sbrk(increment as i64) }?;
    NonNull::new(old).ok_or(Error::Internal)
}

/// Map `len` bytes of anonymous memory.
pub fn map_anonymous(len: usize, flags: MmapFlags) -> SysResult<NonNull<u8>> {
    let flags = flags - MmapFlags::FILE;
    let ptr = unsafe { syscall::mmap(0, Fd(0), 0, len, flags) }?;
    NonNull::new(ptr).ok_or(Error::Internal)
}

/// Map `len` bytes of `fd` starting at `offset`.
pub fn map_file(fd: Fd, offset: u64, len: usize, flags: MmapFlags) -> SysResult<NonNull<u8>> {
    let ptr = unsafe { syscall::mmap(0, fd, offset, len, flags | MmapFlags::FILE) }?;
    NonNull::new(ptr).ok_or(Error::Internal)
}

/// Unmap a range returned by one of the map functions.
///
/// # Safety
///
/// Nothing may reference the range afterwards.
pub unsafe fn unmap(ptr: NonNull<u8>, len: usize) -> SysResult<()> {
    unsafe { syscall::munmap(ptr.as_ptr() as u64, len) }
}
