//! Hosted trap backend.

use std::cell::RefCell;
use std::rc::Rc;

use kestrel_abi::Error;

/// Something that services traps on behalf of a kernel.
pub trait Trap {
    fn trap(&self, nr: u64, args: [u64; 6]) -> i64;
}

thread_local! {
    static BACKEND: RefCell<Option<Rc<dyn Trap>>> = RefCell::new(None);
}

/// Restores the previously installed backend when dropped.
pub struct TrapGuard {
    previous: Option<Rc<dyn Trap>>,
}

impl Drop for TrapGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        BACKEND.with(|backend| *backend.borrow_mut() = previous);
    }
}

/// Route this thread's traps to `backend` until the guard is dropped.
pub fn install(backend: Rc<dyn Trap>) -> TrapGuard {
    let previous = BACKEND.with(|slot| slot.borrow_mut().replace(backend));
    TrapGuard { previous }
}

/// Enter the installed backend. Without one every call fails with
/// [`Error::Internal`].
///
/// # Safety
///
/// Same contract as the bare-metal trap: pointer arguments are
/// dereferenced by whatever services the call.
pub unsafe fn trap(nr: u64, args: [u64; 6]) -> i64 {
    // Clone out so a backend may itself trap.
    let backend = BACKEND.with(|slot| slot.borrow().clone());
    match backend {
        Some(backend) => backend.trap(nr, args),
        None => Error::Internal.code(),
    }
}
