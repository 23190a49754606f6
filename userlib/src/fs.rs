//! Files and directories.
//!
//! Paths are NUL-terminated, as the kernel expects; take them as
//! [`CStr`], e.g. `c"/etc/motd"`.

use alloc::vec::Vec;
use core::ffi::CStr;

use kestrel_abi::flags::{AccessMode, OpenAttr, OpenMode, RwFlags};
use kestrel_abi::wire::{packed_names, DirCursor, Fd, Whence};

use crate::syscall::{self, SysResult};

/// An open file descriptor, closed on drop.
#[derive(Debug)]
pub struct File {
    fd: Fd,
}

impl File {
    /// Open `path`.
    pub fn open(path: &CStr, mode: OpenMode, attr: OpenAttr) -> SysResult<File> {
        let fd = unsafe { syscall::open(path.as_ptr().cast(), mode, attr) }?;
        Ok(File { fd })
    }

    /// Adopt an already-open descriptor.
    pub const fn from_raw(fd: Fd) -> File {
        File { fd }
    }

    pub fn fd(&self) -> Fd {
        self.fd
    }

    pub fn read(&self, buf: &mut [u8]) -> SysResult<usize> {
        unsafe { syscall::read(self.fd, buf.as_mut_ptr(), buf.len(), RwFlags::empty()) }
    }

    pub fn write(&self, buf: &[u8]) -> SysResult<usize> {
        unsafe { syscall::write(self.fd, buf.as_ptr(), buf.len(), RwFlags::empty()) }
    }

    /// Read at `offset` without moving the file position.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> SysResult<usize> {
        unsafe { syscall::pread(self.fd, offset, buf.as_mut_ptr(), buf.len(), RwFlags::empty()) }
    }

    /// Write at `offset` without moving the file position.
    pub fn write_at(&self, offset: u64, buf: &[u8]) -> SysResult<usize> {
        unsafe { syscall::pwrite(self.fd, offset, buf.as_ptr(), buf.len(), RwFlags::empty()) }
    }

    /// Move the file position. Returns the new absolute position.
    pub fn seek(&self, offset: i64, whence: Whence) -> SysResult<u64> {
        unsafe { syscall::lseek(self.fd, offset, whence) }
    }

    /// Iterate the entries of this directory.
    pub fn read_dir(&self) -> ReadDir {
        ReadDir::new(self.fd)
    }

    /// Close explicitly, reporting the kernel's answer.
    pub fn close(self) -> SysResult<()> {
        let fd = self.fd;
        core::mem::forget(self);
        unsafe { syscall::close(fd) }
    }
}

impl Drop for File {
    fn drop(&mut self) {
        let _ = unsafe { syscall::close(self.fd) };
    }
}

/// Size of the name buffer [`ReadDir`] hands to `list_dir`.
const LIST_BUFFER: usize = 512;

/// Directory listing.
///
/// Pages through `list_dir`, carrying the cursor between calls, and yields
/// each name once. Ends when the kernel returns an empty page.
pub struct ReadDir {
    fd: Fd,
    cursor: DirCursor,
    buffer: Vec<u8>,
    names: Vec<Vec<u8>>,
    done: bool,
}

impl ReadDir {
    pub fn new(fd: Fd) -> Self {
        Self {
            fd,
            cursor: DirCursor::START,
            buffer: alloc::vec![0; LIST_BUFFER],
            names: Vec::new(),
            done: false,
        }
    }

    fn fill(&mut self) -> SysResult<usize> {
        let count = unsafe {
            syscall::list_dir(
                self.fd,
                &mut self.cursor,
                self.buffer.as_mut_ptr(),
                self.buffer.len(),
            )
        }?;
        self.names
            .extend(packed_names(&self.buffer, count).map(|name| name.to_vec()));
        // `next` pops from the back.
        self.names.reverse();
        Ok(count)
    }
}

impl Iterator for ReadDir {
    type Item = SysResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(name) = self.names.pop() {
                return Some(Ok(name));
            }
            if self.done {
                return None;
            }
            match self.fill() {
                Ok(0) => self.done = true,
                Ok(_) => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

macro_rules! path_calls {
    ($( $(#[$meta:meta])* $name:ident => $call:ident; )*) => {
        $(
            $(#[$meta])*
            pub fn $name(path: &CStr) -> SysResult<()> {
                unsafe { syscall::$call(path.as_ptr().cast()) }
            }
        )*
    };
}

path_calls! {
    /// Create an empty file.
    create => create;
    /// Create a directory.
    mkdir => mkdir;
    /// Remove an empty directory.
    rmdir => rmdir;
    /// Change the working directory.
    chdir => chdir;
    /// Change the root directory.
    chroot => chroot;
    /// Remove a name.
    unlink => unlink;
    /// Unmount the filesystem at a path.
    umount => umount;
}

/// Check `path` against `mode`.
pub fn access(path: &CStr, mode: AccessMode) -> SysResult<()> {
    unsafe { syscall::access(path.as_ptr().cast(), mode) }
}

pub fn rename(src: &CStr, dst: &CStr) -> SysResult<()> {
    unsafe { syscall::rename(src.as_ptr().cast(), dst.as_ptr().cast()) }
}

/// Create a hard link `target` naming `src`.
pub fn link(src: &CStr, target: &CStr) -> SysResult<()> {
    unsafe { syscall::link(src.as_ptr().cast(), target.as_ptr().cast()) }
}

/// Create a symbolic link `target` pointing at `src`.
pub fn symlink(src: &CStr, target: &CStr, flags: u64) -> SysResult<()> {
    unsafe { syscall::symlink(src.as_ptr().cast(), target.as_ptr().cast(), flags) }
}

/// Mount `device` on `target`. `data` is passed to the filesystem as is.
pub fn mount(device: &CStr, target: &CStr, fs_type: &CStr, flags: u64, data: &[u8]) -> SysResult<()> {
    unsafe {
        syscall::mount(
            device.as_ptr().cast(),
            target.as_ptr().cast(),
            fs_type.as_ptr().cast(),
            flags,
            data.as_ptr(),
            data.len(),
        )
    }
}

/// Write the working directory into `buf`. Returns the path length.
pub fn current_dir(buf: &mut [u8]) -> SysResult<usize> {
    unsafe { syscall::current_dir(buf.as_mut_ptr(), buf.len()) }
}
