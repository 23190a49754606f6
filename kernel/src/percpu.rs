//! Per-CPU Control Blocks
//!
//! One fixed-size control block per core, used during syscall entry/exit.
//! Bootstrap points the core's `KERNEL_GS_BASE` at its block so that
//! `swapgs` at syscall entry gives the kernel the kernel stack pointer and
//! a scratch slot for the user RSP, with no lookup.
//!
//! # Memory Layout (at GS base)
//!
//! | Offset | Field        | Description                          |
//! |--------|--------------|--------------------------------------|
//! |   0    | kernel_stack | Kernel stack top for this CPU        |
//! |   8    | user_stack   | Saved user RSP during a syscall      |
//! |  16    | cpu_id       | CPU core number                      |
//! |  24    | flags        | [`CpuFlags`]                         |
//! | 32..64 | reserved     | Zero; kept for scheduler/trap state  |

use core::fmt;
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::config::MAX_CPUS;

/// Index of a core in the control block table.
pub type CpuId = usize;

/// The bootstrap processor.
pub const BSP: CpuId = 0;

bitflags::bitflags! {
    /// Per-core state bits kept in [`ControlBlock`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CpuFlags: u64 {
        /// Bootstrap completed on this core.
        const ONLINE = 1 << 0;
        /// This core is the bootstrap processor.
        const BSP = 1 << 1;
        /// A syscall is executing on this core.
        const IN_SYSCALL = 1 << 2;
    }
}

/// Per-CPU control block.
///
/// Accessed via the GS segment during syscall entry. Field offsets must
/// match [`offsets`].
#[repr(C, align(64))]
pub struct ControlBlock {
    kernel_stack: AtomicU64,
    user_stack: AtomicU64,
    cpu_id: AtomicU64,
    flags: AtomicU64,
    reserved: [AtomicU64; 4],
}

// Verify layout at compile time.
const _: () = {
    assert!(core::mem::size_of::<ControlBlock>() == 64);
    assert!(core::mem::align_of::<ControlBlock>() == 64);
};

/// Assembly-visible field offsets.
pub mod offsets {
    pub const KERNEL_STACK: usize = 0;
    pub const USER_STACK: usize = 8;
    pub const CPU_ID: usize = 16;
    pub const FLAGS: usize = 24;
}

impl ControlBlock {
    #[allow(clippy::declare_interior_mutable_const)]
    const ZERO_WORD: AtomicU64 = AtomicU64::new(0);

    const fn new() -> Self {
        Self {
            kernel_stack: AtomicU64::new(0),
            user_stack: AtomicU64::new(0),
            cpu_id: AtomicU64::new(0),
            flags: AtomicU64::new(0),
            reserved: [Self::ZERO_WORD; 4],
        }
    }

    fn reset(&self) {
        self.kernel_stack.store(0, Ordering::Relaxed);
        self.user_stack.store(0, Ordering::Relaxed);
        self.cpu_id.store(0, Ordering::Relaxed);
        self.flags.store(0, Ordering::Relaxed);
        for word in &self.reserved {
            word.store(0, Ordering::Relaxed);
        }
    }

    /// Kernel stack top loaded on syscall entry.
    pub fn kernel_stack(&self) -> u64 {
        self.kernel_stack.load(Ordering::Acquire)
    }

    /// User RSP saved by the most recent syscall entry.
    pub fn user_stack(&self) -> u64 {
        self.user_stack.load(Ordering::Acquire)
    }

    /// Core number stored at bootstrap.
    pub fn cpu_id(&self) -> CpuId {
        self.cpu_id.load(Ordering::Relaxed) as CpuId
    }

    pub fn flags(&self) -> CpuFlags {
        CpuFlags::from_bits_retain(self.flags.load(Ordering::Acquire))
    }

    pub fn is_online(&self) -> bool {
        self.flags().contains(CpuFlags::ONLINE)
    }

    pub fn in_syscall(&self) -> bool {
        self.flags().contains(CpuFlags::IN_SYSCALL)
    }
}

/// Fixed-capacity table of control blocks, one per core.
pub struct ControlBlockTable {
    slots: [ControlBlock; MAX_CPUS],
    online: AtomicUsize,
}

impl ControlBlockTable {
    /// Zero-initialized table.
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const INIT: ControlBlock = ControlBlock::new();
        Self {
            slots: [INIT; MAX_CPUS],
            online: AtomicUsize::new(0),
        }
    }

    /// The control block of `cpu`.
    ///
    /// # Panics
    ///
    /// Panics if `cpu >= MAX_CPUS`.
    pub fn slot(&self, cpu: CpuId) -> &ControlBlock {
        assert!(cpu < MAX_CPUS, "CPU ID {} out of range", cpu);
        &self.slots[cpu]
    }

    /// Address of the control block of `cpu`, as programmed into the base
    /// registers.
    pub fn slot_address(&self, cpu: CpuId) -> u64 {
        self.slot(cpu) as *const ControlBlock as u64
    }

    /// Set the kernel stack loaded on `cpu`'s next syscall entry.
    ///
    /// Called by the scheduler on context switch. Must not race with a
    /// syscall entry on that core.
    pub fn set_kernel_stack(&self, cpu: CpuId, stack_top: u64) {
        self.slot(cpu).kernel_stack.store(stack_top, Ordering::Release);
    }

    pub fn kernel_stack(&self, cpu: CpuId) -> u64 {
        self.slot(cpu).kernel_stack()
    }

    /// User RSP saved by `cpu`'s most recent syscall entry.
    pub fn user_stack(&self, cpu: CpuId) -> u64 {
        self.slot(cpu).user_stack()
    }

    pub fn is_bsp(&self, cpu: CpuId) -> bool {
        self.slot(cpu).flags().contains(CpuFlags::BSP)
    }

    /// Number of cores that completed bootstrap.
    pub fn online_count(&self) -> usize {
        self.online.load(Ordering::Acquire)
    }

    /// Whether any core has completed bootstrap.
    pub fn has_init(&self) -> bool {
        self.online_count() > 0
    }

    /// The online core whose control block lives at `base`, if any.
    pub fn cpu_at(&self, base: u64) -> Option<CpuId> {
        (0..MAX_CPUS).find(|&cpu| self.slot_address(cpu) == base && self.slots[cpu].is_online())
    }

    /// Snapshot of `cpu`'s control block. `None` for an out-of-range id.
    pub fn report(&self, cpu: CpuId) -> Option<CpuReport> {
        let slot = self.slots.get(cpu)?;
        Some(CpuReport {
            cpu,
            flags: slot.flags(),
            kernel_stack: slot.kernel_stack(),
            user_stack: slot.user_stack(),
        })
    }
}

/// A core's control block state, as printed in a panic report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuReport {
    pub cpu: CpuId,
    pub flags: CpuFlags,
    pub kernel_stack: u64,
    pub user_stack: u64,
}

impl CpuReport {
    pub fn in_syscall(&self) -> bool {
        self.flags.contains(CpuFlags::IN_SYSCALL)
    }
}

impl fmt::Display for CpuReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cpu{}", self.cpu)?;
        if self.flags.contains(CpuFlags::BSP) {
            f.write_str(" (BSP)")?;
        }
        write!(f, " kernel_stack={:#x}", self.kernel_stack)?;
        if self.in_syscall() {
            write!(f, " in syscall, user_stack={:#x}", self.user_stack)?;
        }
        Ok(())
    }
}

impl Default for ControlBlockTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Global control block table.
pub static CONTROL_BLOCKS: ControlBlockTable = ControlBlockTable::new();

/// The core-local base address registers used to find a control block.
///
/// Writes and `swapgs` are unsafe: a wrong GS base sends the next syscall
/// entry to an arbitrary stack.
pub trait BaseRegisters {
    /// Active GS base.
    fn gs_base(&self) -> u64;
    /// GS base swapped in by `swapgs`.
    fn kernel_gs_base(&self) -> u64;
    fn fs_base(&self) -> u64;

    unsafe fn set_gs_base(&mut self, value: u64);
    unsafe fn set_kernel_gs_base(&mut self, value: u64);
    unsafe fn set_fs_base(&mut self, value: u64);

    /// Exchange the active and kernel GS bases.
    unsafe fn swapgs(&mut self);
}

/// In-memory register file with the same swap semantics as the hardware.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedBaseRegisters {
    pub gs_base: u64,
    pub kernel_gs_base: u64,
    pub fs_base: u64,
}

impl BaseRegisters for SimulatedBaseRegisters {
    fn gs_base(&self) -> u64 {
        self.gs_base
    }

    fn kernel_gs_base(&self) -> u64 {
        self.kernel_gs_base
    }

    fn fs_base(&self) -> u64 {
        self.fs_base
    }

    unsafe fn set_gs_base(&mut self, value: u64) {
        self.gs_base = value;
    }

    unsafe fn set_kernel_gs_base(&mut self, value: u64) {
        self.kernel_gs_base = value;
    }

    unsafe fn set_fs_base(&mut self, value: u64) {
        self.fs_base = value;
    }

    unsafe fn swapgs(&mut self) {
        core::mem::swap(&mut self.gs_base, &mut self.kernel_gs_base);
    }
}

/// Bring `cpu` online: clear its control block and point its base
/// registers at it.
///
/// Afterwards the running kernel sees the block through GS, and the user
/// GS/FS bases (swapped in on return to user mode) are zero.
///
/// # Safety
///
/// Must run on core `cpu` with `regs` addressing that core's registers,
/// once, before the first syscall on that core. `table` must outlive every
/// syscall on that core.
///
/// # Panics
///
/// Panics if `cpu` is out of range or the registers do not read back the
/// programmed values.
pub unsafe fn bootstrap<R: BaseRegisters>(
    table: &ControlBlockTable,
    cpu: CpuId,
    regs: &mut R,
) -> CpuId {
    let slot = table.slot(cpu);
    let address = table.slot_address(cpu);

    slot.reset();
    slot.cpu_id.store(cpu as u64, Ordering::Relaxed);

    unsafe {
        regs.set_kernel_gs_base(address);
        assert_eq!(regs.kernel_gs_base(), address, "KERNEL_GS_BASE read-back");

        regs.set_gs_base(0);
        regs.set_fs_base(0);

        regs.swapgs();
    }

    assert_eq!(regs.gs_base(), address, "GS_BASE after swapgs");
    assert_eq!(regs.kernel_gs_base(), 0, "KERNEL_GS_BASE after swapgs");

    let mut flags = CpuFlags::ONLINE;
    if cpu == BSP {
        flags |= CpuFlags::BSP;
    }
    slot.flags.store(flags.bits(), Ordering::Release);
    table.online.fetch_add(1, Ordering::AcqRel);

    log::info!("cpu{}: control block at {:#x}", cpu, address);
    cpu
}

/// Bootstrap `cpu` against the global table and the real MSRs.
///
/// # Safety
///
/// See [`bootstrap`].
#[cfg(target_os = "none")]
pub unsafe fn init(cpu: CpuId) -> CpuId {
    let mut regs = crate::arch::x86_64::MsrBaseRegisters;
    unsafe { bootstrap(&CONTROL_BLOCKS, cpu, &mut regs) }
}

/// Set the kernel stack for `cpu` in the global table.
pub fn set_kernel_stack(cpu: CpuId, stack_top: u64) {
    CONTROL_BLOCKS.set_kernel_stack(cpu, stack_top);
}
