//! x86_64 syscall plumbing.
//!
//! # Syscall Entry
//!
//! When user code executes `syscall`:
//!
//! - CPU saves RIP → RCX, RFLAGS → R11
//! - CPU loads CS/SS from STAR (kernel segments)
//! - CPU clears RFLAGS bits per SFMASK
//! - CPU jumps to LSTAR ([`kestrel_syscall_entry`])
//!
//! The entry then switches to the kernel GS base and the kernel stack
//! recorded in this core's [`ControlBlock`](crate::percpu::ControlBlock),
//! calls the dispatcher, and returns with `sysretq`.

use ::x86_64::registers::model_specific::{Efer, EferFlags, Msr};

use crate::config;
use crate::percpu::{offsets, BaseRegisters, CpuFlags, CpuId};

const STAR_MSR: u32 = 0xC000_0081;
const LSTAR_MSR: u32 = 0xC000_0082;
const SFMASK_MSR: u32 = 0xC000_0084;
const FS_BASE_MSR: u32 = 0xC000_0100;
const GS_BASE_MSR: u32 = 0xC000_0101;
/// Swapped with GS base on `swapgs`.
const KERNEL_GS_BASE_MSR: u32 = 0xC000_0102;

/// The current core's base registers, accessed through MSRs.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsrBaseRegisters;

impl BaseRegisters for MsrBaseRegisters {
    fn gs_base(&self) -> u64 {
        unsafe { Msr::new(GS_BASE_MSR).read() }
    }

    fn kernel_gs_base(&self) -> u64 {
        unsafe { Msr::new(KERNEL_GS_BASE_MSR).read() }
    }

    fn fs_base(&self) -> u64 {
        unsafe { Msr::new(FS_BASE_MSR).read() }
    }

    unsafe fn set_gs_base(&mut self, value: u64) {
        unsafe { Msr::new(GS_BASE_MSR).write(value) }
    }

    unsafe fn set_kernel_gs_base(&mut self, value: u64) {
        unsafe { Msr::new(KERNEL_GS_BASE_MSR).write(value) }
    }

    unsafe fn set_fs_base(&mut self, value: u64) {
        unsafe { Msr::new(FS_BASE_MSR).write(value) }
    }

    unsafe fn swapgs(&mut self) {
        unsafe { core::arch::asm!("swapgs", options(nostack, preserves_flags)) }
    }
}

/// Core number of the running CPU, read through GS.
///
/// Only meaningful in kernel mode after [`crate::percpu::init`].
pub fn current_cpu() -> CpuId {
    let id: u64;
    unsafe {
        core::arch::asm!(
            "mov {}, gs:[{off}]",
            out(reg) id,
            off = const offsets::CPU_ID,
            options(nostack, readonly, preserves_flags),
        );
    }
    id as CpuId
}

/// Enable `syscall`/`sysret` and point LSTAR at [`kestrel_syscall_entry`].
///
/// # Safety
///
/// The GDT must contain the selectors named in [`config`], and this
/// core's control block must be bootstrapped with a valid kernel stack
/// before user code runs.
pub unsafe fn init_syscall() {
    // SYSCALL: CS = STAR[47:32], SS = STAR[47:32] + 8
    // SYSRET:  CS = STAR[63:48] + 16, SS = STAR[63:48] + 8
    let star = ((config::SYSRET_SELECTOR_BASE as u64) << 48)
        | ((config::KERNEL_CODE_SELECTOR as u64) << 32);

    unsafe {
        let mut efer = Efer::read();
        efer |= EferFlags::SYSTEM_CALL_EXTENSIONS;
        Efer::write(efer);

        Msr::new(STAR_MSR).write(star);
        Msr::new(LSTAR_MSR).write(kestrel_syscall_entry as usize as u64);
        Msr::new(SFMASK_MSR).write(config::SYSCALL_FLAG_MASK);
    }

    log::debug!(
        "syscall: STAR={:#018x} LSTAR={:#x} SFMASK={:#x}",
        star,
        kestrel_syscall_entry as usize,
        config::SYSCALL_FLAG_MASK
    );
}

/// Syscall entry point, installed in LSTAR.
///
/// Saved frame (top → bottom): r15, r14, r13, r12, rbp, rbx, r9, r8, r10,
/// rdx, rsi, rdi, rax, rcx, r11, user rsp. Argument registers are restored
/// on exit; only RAX (result), RCX and R11 change.
#[unsafe(naked)]
#[no_mangle]
pub unsafe extern "C" fn kestrel_syscall_entry() {
    core::arch::naked_asm!(
        "swapgs",
        "mov gs:[{user_stack}], rsp",
        "mov rsp, gs:[{kernel_stack}]",

        "push qword ptr gs:[{user_stack}]",
        "push r11",
        "push rcx",
        "push rax",
        "push rdi",
        "push rsi",
        "push rdx",
        "push r10",
        "push r8",
        "push r9",
        "push rbx",
        "push rbp",
        "push r12",
        "push r13",
        "push r14",
        "push r15",

        "or qword ptr gs:[{flags}], {in_syscall}",

        // dispatch(nr, a1, a2, a3, a4, a5, a6)
        "mov rdi, [rsp + 12*8]",
        "mov rsi, [rsp + 11*8]",
        "mov rdx, [rsp + 10*8]",
        "mov rcx, [rsp + 9*8]",
        "mov r8,  [rsp + 8*8]",
        "mov r9,  [rsp + 7*8]",
        // 16 saved words keep the stack aligned; pad before the 7th arg.
        "sub rsp, 8",
        "push qword ptr [rsp + 7*8]",
        "call {dispatch}",
        "add rsp, 16",

        "and qword ptr gs:[{flags}], {clear_in_syscall}",

        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop rbp",
        "pop rbx",
        "pop r9",
        "pop r8",
        "pop r10",
        "pop rdx",
        "pop rsi",
        "pop rdi",
        // saved rax; the result stays in rax
        "add rsp, 8",
        "pop rcx",
        "pop r11",
        "pop rsp",

        "swapgs",
        "sysretq",

        user_stack = const offsets::USER_STACK,
        kernel_stack = const offsets::KERNEL_STACK,
        flags = const offsets::FLAGS,
        in_syscall = const CpuFlags::IN_SYSCALL.bits(),
        clear_in_syscall = const !(CpuFlags::IN_SYSCALL.bits() as i64),
        dispatch = sym kestrel_syscall_dispatch,
    );
}

/// Called from [`kestrel_syscall_entry`] with the user registers.
extern "C" fn kestrel_syscall_dispatch(
    nr: u64,
    a1: u64,
    a2: u64,
    a3: u64,
    a4: u64,
    a5: u64,
    a6: u64,
) -> i64 {
    crate::syscall::dispatch_registered(nr, [a1, a2, a3, a4, a5, a6])
}

/// Halt the CPU until the next interrupt, forever.
pub fn hlt_loop() -> ! {
    loop {
        ::x86_64::instructions::hlt();
    }
}
