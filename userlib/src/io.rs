//! I/O functions for userspace.
//!
//! This module provides standard I/O operations like print and read.

use core::fmt;

use kestrel_abi::flags::RwFlags;
use kestrel_abi::wire::Fd;

use crate::syscall::{self, SysResult};

/// File descriptor for stdin.
pub const STDIN: Fd = Fd::STDIN;
/// File descriptor for stdout.
pub const STDOUT: Fd = Fd::STDOUT;
/// File descriptor for stderr.
pub const STDERR: Fd = Fd::STDERR;

/// Write bytes to a file descriptor. Returns the number of bytes written.
pub fn write(fd: Fd, buf: &[u8]) -> SysResult<usize> {
    unsafe { syscall::write(fd, buf.as_ptr(), buf.len(), RwFlags::empty()) }
}

/// Read bytes from a file descriptor. Returns the number of bytes read.
pub fn read(fd: Fd, buf: &mut [u8]) -> SysResult<usize> {
    unsafe { syscall::read(fd, buf.as_mut_ptr(), buf.len(), RwFlags::empty()) }
}

/// Write all of `buf`, retrying on short writes.
pub fn write_all(fd: Fd, mut buf: &[u8]) -> SysResult<()> {
    while !buf.is_empty() {
        let written = write(fd, buf)?;
        if written == 0 {
            return Err(syscall::Error::Failed);
        }
        buf = &buf[written.min(buf.len())..];
    }
    Ok(())
}

/// Print a string to stdout.
pub fn print(s: &str) {
    let _ = write_all(STDOUT, s.as_bytes());
}

/// Print a string to stdout with a newline.
pub fn println(s: &str) {
    print(s);
    print("\n");
}

/// Print a string to stderr.
pub fn eprint(s: &str) {
    let _ = write_all(STDERR, s.as_bytes());
}

/// Debug print (always goes to the kernel log).
pub fn debug_print(s: &str) -> SysResult<()> {
    unsafe { syscall::log(s.as_ptr(), s.len()) }
}

/// `fmt::Write` adapter over a descriptor.
pub struct FdWriter(pub Fd);

impl fmt::Write for FdWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_all(self.0, s.as_bytes()).map_err(|_| fmt::Error)
    }
}

/// Formatted print to stdout.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::io::_print(format_args!($($arg)*));
    };
}

/// Formatted print to stdout with a newline.
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => {
        $crate::print!("{}\n", format_args!($($arg)*));
    };
}

/// Internal print function.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    let _ = FdWriter(STDOUT).write_fmt(args);
}
