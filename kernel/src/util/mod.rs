//! Small kernel utilities with no dependencies on the rest of the kernel.

pub mod random;
