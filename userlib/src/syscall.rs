//! Raw system call interface.
//!
//! One trampoline per syscall, generated from the ABI table. Each
//! trampoline marshals its arguments into words, enters the kernel
//! through [`arch::trap`](crate::arch::trap) and decodes the result.
//!
//! These are `unsafe`: pointer arguments go to the kernel unchecked. The
//! typed wrappers in [`fs`](crate::fs), [`process`](crate::process) and
//! friends are the safe surface.

pub use kestrel_abi::{Error, SysResult, Sysno};

use kestrel_abi::{decode, SyscallArg, SyscallRet};

use crate::arch;

/// Trap with already-marshalled words and decode the raw result.
///
/// # Safety
///
/// See [`arch::trap`].
#[inline]
pub unsafe fn raw_syscall(nr: Sysno, words: &[u64]) -> SysResult<u64> {
    let mut args = [0u64; 6];
    args[..words.len()].copy_from_slice(words);
    decode(unsafe { arch::trap(nr.raw(), args) })
}

macro_rules! define_trampolines {
    ($(
        $nr:literal => $variant:ident fn $name:ident ( $( $arg:ident : $ty:ty ),* $(,)? )
            -> $ret:ty, errors [ $( $err:ident ),* $(,)? ];
    )*) => {
        $(
            #[doc = concat!("Syscall ", stringify!($nr), ": `", stringify!($name), "`.")]
            #[doc = ""]
            #[doc = concat!("Possible errors: ", $( "`", stringify!($err), "` ", )* ".")]
            #[doc = ""]
            #[doc = "# Safety"]
            #[doc = ""]
            #[doc = "Pointer arguments must be valid for the access the call makes."]
            #[inline]
            pub unsafe fn $name($( $arg: $ty ),*) -> SysResult<$ret> {
                let words: &[u64] = &[$( <$ty as SyscallArg>::into_word($arg) ),*];
                let raw = unsafe { raw_syscall(Sysno::$variant, words) }?;
                Ok(<$ret as SyscallRet>::from_word(raw))
            }
        )*
    };
}

kestrel_abi::for_each_syscall!(define_trampolines);
