//! Kestrel Userspace Library
//!
//! This library provides system call trampolines and runtime support
//! for userspace applications running on Kestrel.
//!
//! # Architecture
//!
//! Userspace programs never trap directly. [`syscall`] holds one
//! generated trampoline per syscall in the ABI table; each is an ordinary
//! function that marshals its arguments and goes through the single trap
//! primitive in [`arch`]. The remaining modules wrap the trampolines in
//! safe, typed functions.
//!
//! # Example
//!
//! ```rust,no_run
//! use userlib::io;
//!
//! io::println("Hello from userspace!");
//! ```

#![cfg_attr(target_os = "none", no_std)]

extern crate alloc;

pub mod allocator;
pub mod arch;
pub mod fs;
pub mod io;
pub mod ipc;
pub mod mem;
pub mod process;
pub mod signal;
pub mod syscall;

pub use kestrel_abi::{Error, SysResult};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::fs::File;
    pub use crate::io::{print, println};
    pub use crate::process::exit;
    pub use crate::{Error, SysResult};
    pub use kestrel_abi::flags::{OpenAttr, OpenMode};
    pub use kestrel_abi::wire::Fd;
}

// Global allocator for userspace applications
#[cfg(target_os = "none")]
#[global_allocator]
static ALLOCATOR: allocator::UserHeap = allocator::UserHeap::new();
