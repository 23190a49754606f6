//! x86_64 `syscall` trap.

use core::arch::asm;

/// Enter the kernel with syscall `nr` and six argument words.
///
/// Unused argument registers are passed as zero.
///
/// # Safety
///
/// The arguments must satisfy the contract of syscall `nr`; pointer
/// arguments in particular are dereferenced by the kernel.
#[inline]
pub unsafe fn trap(nr: u64, args: [u64; 6]) -> i64 {
    let ret: i64;
    unsafe {
        asm!(
            "syscall",
            inout("rax") nr => ret,
            in("rdi") args[0],
            in("rsi") args[1],
            in("rdx") args[2],
            in("r10") args[3],
            in("r8") args[4],
            in("r9") args[5],
            out("rcx") _,  // clobbered by syscall
            out("r11") _,  // clobbered by syscall
            options(nostack, preserves_flags)
        );
    }
    ret
}
