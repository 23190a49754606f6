//! Architecture-specific code.
//!
//! Only built for the bare-metal target; hosted builds (unit tests, the
//! conformance suite) use the simulated backends instead.

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod x86_64;
