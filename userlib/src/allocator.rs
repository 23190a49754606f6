//! Userspace memory allocator
//!
//! A simple bump allocator for userspace applications. Grows the program
//! break with `sbrk` whenever the current chunk runs out; memory is
//! reclaimed only when the process exits.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr;

use spin::Mutex;

use crate::mem;
use crate::syscall::SysResult;

/// Page size (4KB)
const PAGE_SIZE: usize = 4096;

/// Smallest amount the break is moved by (64KB).
const GROW_STEP: usize = 64 * 1024;

/// Maximum heap size (256MB)
const MAX_HEAP_SIZE: usize = 256 * 1024 * 1024;

#[derive(Debug, Default)]
struct HeapState {
    /// Current allocation pointer
    next: usize,
    /// End of memory obtained from the kernel (exclusive)
    end: usize,
    /// Total bytes obtained so far
    size: usize,
}

/// Bump heap over the program break.
pub struct UserHeap<G = fn(isize) -> SysResult<usize>> {
    state: Mutex<HeapState>,
    grow: G,
}

fn sbrk(increment: isize) -> SysResult<usize> {
    mem::sbrk(increment).map(|p| p.as_ptr() as usize)
}

impl UserHeap {
    /// Heap growing through the `sbrk` syscall.
    pub const fn new() -> Self {
        Self::with_grow(sbrk)
    }
}

impl<G> UserHeap<G>
where
    G: Fn(isize) -> SysResult<usize>,
{
    /// Heap growing through `grow`, which behaves like `sbrk`: it moves the
    /// break and returns the previous one.
    pub const fn with_grow(grow: G) -> Self {
        Self {
            state: Mutex::new(HeapState { next: 0, end: 0, size: 0 }),
            grow,
        }
    }

    /// Bytes obtained from the kernel so far.
    pub fn size(&self) -> usize {
        self.state.lock().size
    }

    /// Make room for `needed` more bytes at the end of the heap.
    fn expand(&self, state: &mut HeapState, needed: usize) -> bool {
        let step = align_up(needed.max(GROW_STEP), PAGE_SIZE);
        if state.size + step > MAX_HEAP_SIZE {
            return false;
        }

        let Ok(previous) = (self.grow)(step as isize) else {
            return false;
        };

        if previous != state.end {
            // Someone else moved the break; restart from the new chunk.
            state.next = previous;
        }
        state.end = previous + step;
        state.size += step;
        true
    }

    fn alloc_inner(&self, layout: Layout) -> *mut u8 {
        let mut state = self.state.lock();
        loop {
            let aligned = align_up(state.next, layout.align());
            let new_next = aligned + layout.size();

            if state.end != 0 && new_next <= state.end {
                state.next = new_next;
                return aligned as *mut u8;
            }

            // Need more memory
            let needed = new_next.saturating_sub(state.end).max(layout.size() + layout.align());
            if !self.expand(&mut state, needed) {
                return ptr::null_mut();
            }
        }
    }
}

unsafe impl<G> GlobalAlloc for UserHeap<G>
where
    G: Fn(isize) -> SysResult<usize> + Sync,
{
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.alloc_inner(layout)
    }

    unsafe fn dealloc(&self, _ptr: *mut u8, _layout: Layout) {
        // Bump allocator doesn't free individual allocations
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // Shrinking stays in place
        if new_size <= layout.size() {
            return ptr;
        }
        let Ok(new_layout) = Layout::from_size_align(new_size, layout.align()) else {
            return ptr::null_mut();
        };
        let new_ptr = self.alloc_inner(new_layout);

        if !new_ptr.is_null() {
            unsafe {
                ptr::copy_nonoverlapping(ptr, new_ptr, layout.size());
                self.dealloc(ptr, layout);
            }
        }

        new_ptr
    }
}

/// Align address up to the given alignment
#[inline]
const fn align_up(addr: usize, align: usize) -> usize {
    (addr + align - 1) & !(align - 1)
}
