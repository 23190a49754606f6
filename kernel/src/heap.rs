//! Kernel heap.
//!
//! The heap is a `linked_list_allocator` instance fed with whatever the
//! boot arena did not hand out. On the bare-metal target it is the global
//! allocator.

use core::fmt;

use linked_list_allocator::LockedHeap;

use crate::config::MIN_HEAP_SIZE;

/// Heap start alignment.
pub const HEAP_ALIGN: usize = 16;

/// A free memory range handed to the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapRegion {
    pub start: usize,
    pub size: usize,
}

/// Heap initialization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The region is smaller than the minimum heap after alignment.
    TooSmall { size: usize },
    /// The heap was already initialized.
    AlreadyInitialized,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::TooSmall { size } => {
                write!(f, "heap region of {} bytes is below {}", size, MIN_HEAP_SIZE)
            }
            HeapError::AlreadyInitialized => write!(f, "heap already initialized"),
        }
    }
}

/// Global kernel allocator.
#[cfg(target_os = "none")]
#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// Initialize the global kernel heap.
#[cfg(target_os = "none")]
pub fn init(region: HeapRegion) -> Result<(), HeapError> {
    // SAFETY: the region comes from the retired boot arena, which owned it
    // exclusively.
    unsafe { init_heap(&ALLOCATOR, region) }
}

/// Hand `region` to `heap`.
///
/// # Safety
///
/// The region must be mapped, writable, and unused for the rest of the
/// heap's lifetime.
pub unsafe fn init_heap(heap: &LockedHeap, region: HeapRegion) -> Result<(), HeapError> {
    let start = region
        .start
        .checked_add(HEAP_ALIGN - 1)
        .map(|addr| addr & !(HEAP_ALIGN - 1))
        .ok_or(HeapError::TooSmall { size: 0 })?;
    let size = region.size.saturating_sub(start - region.start);
    if size < MIN_HEAP_SIZE {
        return Err(HeapError::TooSmall { size });
    }

    let mut heap = heap.lock();
    if heap.size() != 0 {
        return Err(HeapError::AlreadyInitialized);
    }

    unsafe { heap.init(start as *mut u8, size) };

    log::info!("heap: {:#x}..{:#x} ({} KiB)", start, start + size, size / 1024);
    Ok(())
}
