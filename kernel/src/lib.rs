//! Kestrel Kernel
//!
//! The boundary layer of the Kestrel x86_64 kernel: everything between the
//! bootloader handoff and the first user-mode syscall.
//!
//! # Boot Process
//!
//! 1. bootloader loads the kernel and jumps to `kernel_main`
//! 2. [`serial::init`] installs the serial logger
//! 3. A [`boot_alloc::BootArena`] is carved out of usable memory
//! 4. [`percpu`] bootstraps each core's control block and GS base
//! 5. [`syscall::init`] registers handlers; the arch layer programs
//!    `syscall`/`sysret`
//! 6. The arena's unused tail becomes the [`heap`]
//!
//! Hosted builds (`cargo test`) link `std` and swap the hardware for
//! simulated registers; everything touching MSRs or ports is
//! `cfg(target_os = "none")`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod arch;
pub mod boot_alloc;
pub mod config;
pub mod heap;
#[cfg(target_os = "none")]
mod panic;
pub mod percpu;
pub mod serial;
pub mod syscall;
pub mod util;
