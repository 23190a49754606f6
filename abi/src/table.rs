//! Syscall descriptor registry.
//!
//! Expanded from [`for_each_syscall!`](crate::for_each_syscall): the
//! [`Sysno`] enum and one [`SyscallDesc`] per assigned number.

use crate::error::ErrorSet;
use crate::{ArgKind, RetKind, SyscallArg, SyscallRet};

/// One argument slot of a syscall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgDesc {
    /// Parameter name, for diagnostics.
    pub name: &'static str,
    /// How the slot is interpreted.
    pub kind: ArgKind,
}

/// Static description of one syscall: its number, the ordered argument
/// slots, the return kind and the error codes it may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyscallDesc {
    pub nr: Sysno,
    pub name: &'static str,
    pub args: &'static [ArgDesc],
    pub ret: RetKind,
    pub errors: ErrorSet,
}

impl SyscallDesc {
    /// Number of argument registers the call consumes.
    pub const fn arity(&self) -> usize {
        self.args.len()
    }
}

macro_rules! define_table {
    ($(
        $nr:literal => $variant:ident fn $name:ident ( $( $arg:ident : $ty:ty ),* $(,)? )
            -> $ret:ty, errors [ $( $err:ident ),* $(,)? ];
    )*) => {
        /// Syscall numbers. The discriminant is the value loaded into RAX.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u64)]
        pub enum Sysno {
            $( $variant = $nr, )*
        }

        impl Sysno {
            /// Decode a raw number. Reserved and out-of-range numbers yield
            /// `None`.
            pub const fn from_raw(raw: u64) -> Option<Self> {
                match raw {
                    $( $nr => Some(Sysno::$variant), )*
                    _ => None,
                }
            }

            /// The raw number.
            pub const fn raw(self) -> u64 {
                self as u64
            }

            /// Name of the trampoline for this number.
            pub const fn name(self) -> &'static str {
                match self {
                    $( Sysno::$variant => stringify!($name), )*
                }
            }
        }

        /// Every assigned syscall, in ascending number order.
        pub static SYSCALLS: &[SyscallDesc] = &[
            $(
                SyscallDesc {
                    nr: Sysno::$variant,
                    name: stringify!($name),
                    args: &[
                        $( ArgDesc { name: stringify!($arg), kind: <$ty as SyscallArg>::KIND }, )*
                    ],
                    ret: <$ret as SyscallRet>::KIND,
                    errors: ErrorSet::from_bits_retain(0 $( | ErrorSet::$err.bits() )*),
                },
            )*
        ];
    };
}

crate::for_each_syscall!(define_table);

/// Find the descriptor for a raw number.
pub fn lookup(raw: u64) -> Option<&'static SyscallDesc> {
    let nr = Sysno::from_raw(raw)?;
    SYSCALLS.iter().find(|desc| desc.nr == nr)
}
