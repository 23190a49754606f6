//! Flag words carried in argument slots.
//!
//! Every set is an independent, or-combinable bit mask. Bits the ABI does
//! not name are retained when decoded, so a newer userspace passing a flag
//! this kernel does not know reaches the handler unchanged.

use crate::{ArgKind, SyscallArg};

bitflags::bitflags! {
    /// `open` access mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenMode: u64 {
        const READ = 1;
        const WRITE = 2;
        const BINARY = 4;
        const APPEND = 8;
    }
}

bitflags::bitflags! {
    /// `open` attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenAttr: u64 {
        /// Create the file if it does not exist.
        const AUTO_CREATE_FILE = 1;
        /// Create missing parent directories.
        const AUTO_CREATE_DIR = 2;
    }
}

bitflags::bitflags! {
    /// `access` probe mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessMode: u64 {
        const EXEC = 1;
        const WRITE = 2;
        const READ = 4;
        const EXISTS = 8;
    }
}

bitflags::bitflags! {
    /// `read`/`write`/`pread`/`pwrite` flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RwFlags: u64 {
        /// Return `Busy` instead of blocking.
        const NO_BLOCK = 1;
    }
}

bitflags::bitflags! {
    /// `select` flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SelectFlags: u64 {
        /// Poll once; do not wait for readiness.
        const NO_BLOCK = 1;
    }
}

bitflags::bitflags! {
    /// `mmap` flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MmapFlags: u64 {
        const READ = 1;
        const WRITE = 2;
        const EXEC = 4;
        /// Back the mapping with the file named by the `fd` argument.
        const FILE = 8;
        const SHARED = 16;
    }
}

bitflags::bitflags! {
    /// Message queue `write`/`read` flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MsgFlags: u64 {
        /// Never block.
        const NO_BLOCK = 1;
        /// Block only while no message of any type is queued. A read that
        /// finds only messages of other types returns `Continue`.
        const NO_BLOCK_OTHER_TYPE = 2;
    }
}

bitflags::bitflags! {
    /// `create_process` flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProcessFlags: u64 {
        /// The calling thread does not expect to return.
        const NO_RETURN = 1 << 0;
        /// The path names a flat binary rather than an ELF image.
        const BINARY = 1 << 1;
        /// Child gets its own root directory.
        const NO_SHARED_ROOT = 1 << 20;
        /// Child gets its own working directory.
        const NO_SHARED_WORK_DIR = 1 << 21;
        /// Child gets an empty file descriptor table.
        const NO_SHARED_FILES = 1 << 25;
    }
}

bitflags::bitflags! {
    /// `create_thread` flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ThreadFlags: u64 {
        /// Make the thread runnable before the call returns.
        const IMMEDIATELY = 1;
        /// The entry never returns.
        const NO_RETURN = 4;
    }
}

macro_rules! impl_flags_arg {
    ($($flags:ty),* $(,)?) => {
        $(
            impl SyscallArg for $flags {
                const KIND: ArgKind = ArgKind::Word;

                fn into_word(self) -> u64 {
                    self.bits()
                }

                fn from_word(word: u64) -> Option<Self> {
                    Some(Self::from_bits_retain(word))
                }
            }
        )*
    };
}

impl_flags_arg!(
    OpenMode,
    OpenAttr,
    AccessMode,
    RwFlags,
    SelectFlags,
    MmapFlags,
    MsgFlags,
    ProcessFlags,
    ThreadFlags,
);
