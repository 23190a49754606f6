//! Kestrel kernel binary.
//!
//! Bare-metal entry point. On hosted targets this builds as an empty
//! program so the workspace still compiles and tests on the host.

#![cfg_attr(target_os = "none", no_std, no_main)]

#[cfg(target_os = "none")]
mod entry {
    use bootloader_api::config::Mapping;
    use bootloader_api::info::MemoryRegionKind;
    use bootloader_api::{entry_point, BootInfo, BootloaderConfig};

    use kestrel_kernel::arch::x86_64 as arch;
    use kestrel_kernel::boot_alloc::BootArena;
    use kestrel_kernel::config::{BOOT_ARENA_SIZE, KERNEL_STACK_SIZE, PAGE_SIZE, PHYS_MAP_BASE};
    use kestrel_kernel::syscall::boot::BootHandlers;
    use kestrel_kernel::{heap, percpu, serial, syscall};

    /// Bootloader configuration.
    ///
    /// - Physical memory mapping: Dynamic (bootloader chooses offset)
    pub static BOOTLOADER_CONFIG: BootloaderConfig = {
        let mut config = BootloaderConfig::new_default();
        config.mappings.physical_memory = Some(Mapping::Dynamic);
        config
    };

    entry_point!(kernel_main, config = &BOOTLOADER_CONFIG);

    static HANDLERS: BootHandlers = BootHandlers;

    fn kernel_main(boot_info: &'static mut BootInfo) -> ! {
        if serial::init().is_err() {
            kestrel_kernel::serial_println!("[kestrel] logger already installed");
        }
        log::info!("Hello, Kestrel");

        let phys_offset = boot_info
            .physical_memory_offset
            .into_option()
            .unwrap_or(PHYS_MAP_BASE);

        // Smallest usable region that still fits the arena.
        let region = boot_info
            .memory_regions
            .iter()
            .filter(|r| r.kind == MemoryRegionKind::Usable)
            .map(|r| (((r.start as usize) + PAGE_SIZE - 1) & !(PAGE_SIZE - 1), r.end as usize))
            .filter(|(start, end)| *start != 0 && end.saturating_sub(*start) >= BOOT_ARENA_SIZE)
            .min_by_key(|(start, end)| end - start);
        let Some((start, _)) = region else {
            panic!("no usable region of {} bytes for the boot arena", BOOT_ARENA_SIZE);
        };

        // SAFETY: the region is usable RAM reported by the bootloader and is
        // reached through the direct map.
        let mut arena = unsafe { BootArena::new(start, BOOT_ARENA_SIZE) };
        unsafe { arena.relocate(phys_offset as usize) };

        let stack = arena.alloc_zeroed(KERNEL_STACK_SIZE, PAGE_SIZE);
        let stack_top = stack.as_ptr() as u64 + KERNEL_STACK_SIZE as u64;

        // SAFETY: running on the BSP, once, before any user code.
        let cpu = unsafe { percpu::init(percpu::BSP) };
        percpu::set_kernel_stack(cpu, stack_top);

        syscall::init(&HANDLERS);
        unsafe { arch::init_syscall() };

        if let Err(err) = heap::init(arena.into_remaining()) {
            panic!("heap initialization failed: {}", err);
        }

        log::info!(
            "boot complete: {} cpu(s) online",
            percpu::CONTROL_BLOCKS.online_count()
        );
        arch::hlt_loop()
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
