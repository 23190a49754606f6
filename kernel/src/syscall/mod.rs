//! System call handling module.
//!
//! The kernel side of the ABI in `kestrel-abi`. The handler trait and the
//! number-based dispatcher are both expanded from the same syscall table
//! the userspace trampolines are built from.
//!
//! Handlers themselves live outside this layer: the scheduler, VFS and
//! signal code implement [`Handlers`] and register it with [`init`].

pub mod boot;

use kestrel_abi::{encode, Error, SysResult, SyscallArg, SyscallRet, Sysno};
use spin::Once;

/// Take the next argument word and decode it as `T`.
fn next_arg<T: SyscallArg>(words: &mut impl Iterator<Item = u64>) -> SysResult<T> {
    words.next().and_then(T::from_word).ok_or(Error::Param)
}

macro_rules! define_handlers {
    ($(
        $nr:literal => $variant:ident fn $name:ident ( $( $arg:ident : $ty:ty ),* $(,)? )
            -> $ret:ty, errors [ $( $err:ident ),* $(,)? ];
    )*) => {
        /// Kernel implementations of each syscall.
        ///
        /// Arguments arrive already decoded into their ABI types. Every
        /// method defaults to [`Error::Failed`], so an implementation only
        /// overrides what it supports.
        #[allow(unused_variables)]
        pub trait Handlers: Sync {
            $(
                fn $name(&self, $( $arg: $ty ),*) -> SysResult<$ret> {
                    Err(Error::Failed)
                }
            )*
        }

        fn call(handlers: &dyn Handlers, sysno: Sysno, args: [u64; 6]) -> SysResult<u64> {
            #[allow(unused_mut)]
            let mut words = args.into_iter();
            match sysno {
                $(
                    Sysno::$variant => {
                        $( let $arg: $ty = next_arg(&mut words)?; )*
                        handlers.$name($( $arg ),*).map(<$ret as SyscallRet>::into_word)
                    }
                )*
            }
        }
    };
}

kestrel_abi::for_each_syscall!(define_handlers);

/// Dispatch syscall `nr` to `handlers` and fold the result into the value
/// returned in RAX.
///
/// Unassigned numbers and arguments that do not decode into their ABI
/// type fail with [`Error::Param`].
pub fn dispatch(handlers: &dyn Handlers, nr: u64, args: [u64; 6]) -> i64 {
    let Some(sysno) = Sysno::from_raw(nr) else {
        log::warn!("syscall: unknown number {}", nr);
        return Error::Param.code();
    };

    #[cfg(feature = "trace-syscalls")]
    log::trace!("syscall: {} ({}) {:x?}", sysno.name(), nr, args);

    let result = call(handlers, sysno, args);

    #[cfg(feature = "trace-syscalls")]
    log::trace!("syscall: {} -> {:?}", sysno.name(), result);

    encode(result)
}

static HANDLERS: Once<&'static dyn Handlers> = Once::new();

/// Register the kernel's handler set. Only the first registration takes
/// effect.
pub fn init(handlers: &'static dyn Handlers) {
    register(&HANDLERS, handlers);
}

/// Store `handlers` in `slot` unless it is already filled. Returns whether
/// this call did the registration.
fn register(slot: &Once<&'static dyn Handlers>, handlers: &'static dyn Handlers) -> bool {
    let mut registered = false;
    slot.call_once(|| {
        registered = true;
        log::info!("syscall: handlers registered");
        handlers
    });
    if !registered {
        log::warn!("syscall: handlers already registered, ignoring");
    }
    registered
}

/// Dispatch through the registered handler set. Before [`init`] every
/// call fails with [`Error::Internal`].
pub fn dispatch_registered(nr: u64, args: [u64; 6]) -> i64 {
    match HANDLERS.get() {
        Some(handlers) => dispatch(*handlers, nr, args),
        None => Error::Internal.code(),
    }
}
