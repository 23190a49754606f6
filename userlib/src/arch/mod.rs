//! The trap primitive every trampoline goes through.
//!
//! On the bare-metal target this is the `syscall` instruction. Hosted
//! builds route traps to a per-thread [`Trap`] backend instead, so the
//! whole library can run against a simulated kernel.

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
mod x86_64;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub use self::x86_64::trap;

#[cfg(not(target_os = "none"))]
mod hosted;
#[cfg(not(target_os = "none"))]
pub use self::hosted::{install, trap, Trap, TrapGuard};
