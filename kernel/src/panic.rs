//! Panic handler for the kernel.
//!
//! Bootstrap contract violations (arena exhaustion, bad core ids, base
//! register mismatches) end up here, as does anything a syscall handler
//! panics on. The report names the core and whether it was inside a
//! syscall, read from its control block.

use core::panic::PanicInfo;

use crate::arch::x86_64::{current_cpu, hlt_loop, MsrBaseRegisters};
use crate::percpu::{BaseRegisters, CONTROL_BLOCKS};
use crate::serial_println;

/// Output to serial and halt.
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    serial_println!();
    serial_println!("KERNEL PANIC: {}", info.message());

    if let Some(location) = info.location() {
        serial_println!("  at {}:{}:{}", location.file(), location.line(), location.column());
    }

    // GS only addresses a control block once this core is bootstrapped.
    let gs_base = MsrBaseRegisters.gs_base();
    match CONTROL_BLOCKS.cpu_at(gs_base).and_then(|_| CONTROL_BLOCKS.report(current_cpu())) {
        Some(report) => serial_println!("  on {}", report),
        None => serial_println!(
            "  before per-CPU bootstrap (gs_base={:#x}, {} cores online)",
            gs_base,
            CONTROL_BLOCKS.online_count()
        ),
    }

    serial_println!("System halted.");
    hlt_loop()
}
