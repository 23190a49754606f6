//! Early bump allocator.
//!
//! The boot arena hands out aligned memory from one contiguous region
//! before any real allocator exists. Memory is never freed: allocations
//! live for the rest of the kernel's lifetime. Once paging and the page
//! allocator are up, the untouched tail of the region is handed to the
//! kernel heap with [`BootArena::into_remaining`].
//!
//! # Region Layout
//!
//! ```text
//! base                 cursor                       base + limit
//!  |--------------------|----------------------------|
//!  |  handed out        |  remaining                 |
//! ```
//!
//! The arena is owned by the boot path and passed by `&mut` to whoever
//! needs early memory, so it is single-owner by construction.

use core::mem::{align_of, size_of};
use core::ptr::NonNull;

use crate::heap::HeapRegion;

/// Bump allocator over `[base, base + limit)`.
#[derive(Debug)]
pub struct BootArena {
    base: usize,
    cursor: usize,
    end: usize,
}

impl BootArena {
    /// Create an arena over `limit` bytes starting at `base`.
    ///
    /// # Safety
    ///
    /// `[base, base + limit)` must be mapped, writable, and not used by
    /// anything else for the rest of the kernel's lifetime.
    ///
    /// # Panics
    ///
    /// Panics if `base` is null or the region wraps the address space.
    pub unsafe fn new(base: usize, limit: usize) -> Self {
        assert!(base != 0, "boot arena at null");
        let end = base
            .checked_add(limit)
            .unwrap_or_else(|| panic!("boot arena {:#x}+{:#x} wraps", base, limit));

        log::debug!("boot arena: {:#x}..{:#x} ({} KiB)", base, end, limit / 1024);

        Self {
            base,
            cursor: base,
            end,
        }
    }

    /// Allocate `size` bytes aligned to `align`.
    ///
    /// The returned pointer is at or past the previous cursor and never
    /// overlaps an earlier allocation. A zero `size` returns an aligned
    /// pointer without consuming space beyond the padding.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two, or if the allocation does
    /// not fit in the remaining space. Running out of boot memory is not
    /// recoverable.
    pub fn alloc(&mut self, size: usize, align: usize) -> NonNull<u8> {
        assert!(align.is_power_of_two(), "alignment {} is not a power of two", align);

        let start = self
            .cursor
            .checked_add(align - 1)
            .map(|addr| addr & !(align - 1));
        let next = start.and_then(|start| start.checked_add(size));

        let (start, next) = match (start, next) {
            (Some(start), Some(next)) if next <= self.end => (start, next),
            _ => panic!(
                "boot arena exhausted: {} bytes @ {} requested, {} remaining",
                size,
                align,
                self.remaining()
            ),
        };

        self.cursor = next;

        // `base` is non-null and `start >= base`.
        unsafe { NonNull::new_unchecked(start as *mut u8) }
    }

    /// Allocate `size` zero-filled bytes aligned to `align`.
    pub fn alloc_zeroed(&mut self, size: usize, align: usize) -> NonNull<u8> {
        let ptr = self.alloc(size, align);
        unsafe { ptr.as_ptr().write_bytes(0, size) };
        ptr
    }

    /// Move `value` into the arena.
    pub fn alloc_value<T>(&mut self, value: T) -> &'static mut T {
        let ptr = self.alloc(size_of::<T>(), align_of::<T>()).cast::<T>();
        unsafe {
            ptr.as_ptr().write(value);
            &mut *ptr.as_ptr()
        }
    }

    /// Allocate `len` copies of `fill`.
    pub fn alloc_slice<T: Copy>(&mut self, len: usize, fill: T) -> &'static mut [T] {
        let bytes = size_of::<T>()
            .checked_mul(len)
            .unwrap_or_else(|| panic!("boot arena: {} elements overflow", len));
        let ptr = self.alloc(bytes, align_of::<T>()).cast::<T>();
        unsafe {
            for i in 0..len {
                ptr.as_ptr().add(i).write(fill);
            }
            core::slice::from_raw_parts_mut(ptr.as_ptr(), len)
        }
    }

    /// First address of the region.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Next address the arena will consider.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Size of the region in bytes.
    pub fn limit(&self) -> usize {
        self.end - self.base
    }

    /// Bytes handed out so far, padding included.
    pub fn used(&self) -> usize {
        self.cursor - self.base
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.end - self.cursor
    }

    /// Shift the arena by `offset` bytes, typically from its physical
    /// address into the direct map once paging is on. Pointers handed out
    /// before the move keep their old addresses.
    ///
    /// # Safety
    ///
    /// The whole region must be mapped at the new addresses, and the shift
    /// must not wrap.
    pub unsafe fn relocate(&mut self, offset: usize) {
        let shift = |addr: usize| {
            addr.checked_add(offset)
                .unwrap_or_else(|| panic!("boot arena relocation by {:#x} wraps", offset))
        };
        self.base = shift(self.base);
        self.cursor = shift(self.cursor);
        self.end = shift(self.end);

        log::debug!("boot arena relocated to {:#x}", self.base);
    }

    /// Retire the arena and return the part it never handed out.
    pub fn into_remaining(self) -> HeapRegion {
        log::debug!(
            "boot arena retired: {} bytes used, {} bytes left",
            self.used(),
            self.remaining()
        );
        HeapRegion {
            start: self.cursor,
            size: self.remaining(),
        }
    }
}
