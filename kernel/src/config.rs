//! Kernel configuration constants.
//!
//! This module contains compile-time configuration for the kernel.
//! Values here affect memory layout, limits, and feature availability.

/// Maximum number of CPUs supported.
pub const MAX_CPUS: usize = 32;

/// Page size (4 KB).
pub const PAGE_SIZE: usize = 4096;

/// Stack size per kernel task (64 KB).
pub const KERNEL_STACK_SIZE: usize = 64 * 1024;

/// Physical memory map base.
/// Direct mapping of all physical memory for kernel access, used when the
/// bootloader does not report its own offset.
pub const PHYS_MAP_BASE: u64 = 0xFFFF_8000_0000_0000;

/// Size of the region handed to the boot arena (4 MB). Whatever the arena
/// has not used when the heap comes up becomes the heap.
pub const BOOT_ARENA_SIZE: usize = 4 * 1024 * 1024;

/// Smallest tail the heap will accept from the boot arena.
pub const MIN_HEAP_SIZE: usize = 64 * 1024;

/// Maximum level the serial logger emits.
pub const LOG_LEVEL: log::Level = if cfg!(debug_assertions) {
    log::Level::Debug
} else {
    log::Level::Info
};

/// Serial port for debug output (COM1).
pub const DEBUG_SERIAL_PORT: u16 = 0x3F8;

/// Kernel code selector loaded by `syscall` (STAR[47:32]).
/// Kernel SS is this plus 8.
pub const KERNEL_CODE_SELECTOR: u16 = 0x08;

/// Base selector for `sysretq` (STAR[63:48]).
/// User SS = base + 8 (0x1B), user CS = base + 16 (0x23).
pub const SYSRET_SELECTOR_BASE: u16 = 0x13;

/// RFLAGS bits cleared on `syscall`: TF, IF and DF.
pub const SYSCALL_FLAG_MASK: u64 = 0x100 | 0x200 | 0x400;

/// Longest message the boot-time `log` handler copies out of userspace.
pub const MAX_LOG_MESSAGE: usize = 1024;
