//! Handles and structures shared across the user/kernel boundary.
//!
//! Structures passed by pointer are `#[repr(C)]` and made only of words so
//! their layout is identical on both sides.

use crate::{ArgKind, RetKind, SyscallArg, SyscallRet};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u64 {
                self.0
            }
        }

        impl SyscallArg for $name {
            const KIND: ArgKind = ArgKind::Word;

            fn into_word(self) -> u64 {
                self.0
            }

            fn from_word(word: u64) -> Option<Self> {
                Some(Self(word))
            }
        }

        impl SyscallRet for $name {
            const KIND: RetKind = RetKind::Word;

            fn into_word(self) -> u64 {
                self.0
            }

            fn from_word(word: u64) -> Self {
                Self(word)
            }
        }
    };
}

handle!(
    /// File descriptor.
    Fd
);
handle!(
    /// Process id.
    Pid
);
handle!(
    /// Thread id.
    Tid
);
handle!(
    /// Message queue key.
    MsgKey
);

impl Fd {
    pub const STDIN: Fd = Fd(0);
    pub const STDOUT: Fd = Fd(1);
    pub const STDERR: Fd = Fd(2);
}

/// `lseek` origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum Whence {
    Begin = 0,
    Current = 1,
    End = 2,
}

impl SyscallArg for Whence {
    const KIND: ArgKind = ArgKind::Word;

    fn into_word(self) -> u64 {
        self as u64
    }

    fn from_word(word: u64) -> Option<Self> {
        match word {
            0 => Some(Whence::Begin),
            1 => Some(Whence::Current),
            2 => Some(Whence::End),
            _ => None,
        }
    }
}

/// Resumable directory listing position.
///
/// Opaque to the caller: start from [`DirCursor::START`] and pass back
/// exactly what the previous `list_dir` call wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct DirCursor {
    pub size: u64,
    pub position: u64,
}

impl DirCursor {
    pub const START: DirCursor = DirCursor { size: 0, position: 0 };
}

/// Iterate the NUL-separated names `list_dir` packed into `buffer`, looking
/// at no more than the first `count` bytes.
pub fn packed_names(buffer: &[u8], count: usize) -> impl Iterator<Item = &[u8]> + '_ {
    buffer[..count.min(buffer.len())]
        .split(|b| *b == 0)
        .filter(|name| !name.is_empty())
}

/// A set of descriptors for `select`. The kernel rewrites `fds[..count]`
/// with the ready subset and updates `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct FdSet {
    pub fds: *mut Fd,
    pub count: u64,
}

impl FdSet {
    pub const EMPTY: FdSet = FdSet { fds: core::ptr::null_mut(), count: 0 };

    pub fn new(fds: &mut [Fd]) -> Self {
        FdSet { fds: fds.as_mut_ptr(), count: fds.len() as u64 }
    }
}

/// 128-bit CPU affinity mask, passed as two 64-bit halves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct CpuMask {
    pub low: u64,
    pub high: u64,
}

impl CpuMask {
    pub const NONE: CpuMask = CpuMask { low: 0, high: 0 };
    pub const ALL: CpuMask = CpuMask { low: u64::MAX, high: u64::MAX };

    pub const fn from_halves(low: u64, high: u64) -> Self {
        CpuMask { low, high }
    }

    pub const fn from_bits(bits: u128) -> Self {
        CpuMask { low: bits as u64, high: (bits >> 64) as u64 }
    }

    pub const fn bits(self) -> u128 {
        ((self.high as u128) << 64) | self.low as u128
    }

    /// Add `cpu` (0..128).
    pub fn insert(&mut self, cpu: u32) {
        *self = CpuMask::from_bits(self.bits() | (1u128 << cpu));
    }

    pub const fn contains(self, cpu: u32) -> bool {
        cpu < 128 && self.bits() & (1u128 << cpu) != 0
    }
}
