//! Kestrel System Call ABI
//!
//! This crate is the contract between every user-mode program and the
//! kernel: syscall numbers, the typed calling convention, the closed error
//! namespace and the flag words carried in argument slots.
//!
//! # Calling Convention (x86_64)
//!
//! | Register | Purpose                   |
//! |----------|---------------------------|
//! | RAX      | Syscall number            |
//! | RDI      | Argument 1                |
//! | RSI      | Argument 2                |
//! | RDX      | Argument 3                |
//! | R10      | Argument 4 (not RCX!)     |
//! | R8       | Argument 5                |
//! | R9       | Argument 6                |
//! | RAX      | Return value              |
//! | RCX/R11  | Clobbered by `syscall`    |
//!
//! Every argument slot is one machine word. Aggregates larger than a word
//! are passed by pointer.
//!
//! # Single Source of Truth
//!
//! [`for_each_syscall!`] holds the whole syscall surface as one table. The
//! descriptor registry in this crate, the userspace trampolines and the
//! kernel dispatcher are all expanded from it, so a number can never drift
//! between the two sides.

#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod flags;
pub mod signal;
pub mod table;
pub mod wire;

pub use error::{decode, encode, Error, ErrorSet, SysResult};
pub use table::{lookup, ArgDesc, SyscallDesc, Sysno, SYSCALLS};

/// Highest syscall number the ABI currently assigns.
pub const MAX_SYSCALL_NUMBER: u64 = 57;

/// Number of argument registers available to a syscall.
pub const MAX_ARGS: usize = 6;

/// How an argument slot is interpreted by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Unsigned word: counts, lengths, handles, flag words.
    Word,
    /// Two's-complement signed word.
    Signed,
    /// User-space address.
    Pointer,
}

/// How the return slot is interpreted on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetKind {
    /// Only success (0) or an error code.
    Void,
    /// Non-negative word: byte count, handle, id.
    Word,
    /// User-space address.
    Pointer,
}

/// A value that travels in one argument register.
pub trait SyscallArg: Sized {
    /// Interpretation of the slot.
    const KIND: ArgKind;

    /// Marshal into the register word.
    fn into_word(self) -> u64;

    /// Unmarshal on the kernel side. `None` means the word is not a valid
    /// encoding of `Self` (e.g. an unassigned signal number).
    fn from_word(word: u64) -> Option<Self>;
}

/// A value that travels back in the return register on success.
pub trait SyscallRet: Sized {
    /// Interpretation of the slot.
    const KIND: RetKind;

    /// Encode on the kernel side. Must not set bit 63.
    fn into_word(self) -> u64;

    /// Decode on the user side.
    fn from_word(word: u64) -> Self;
}

impl SyscallArg for u64 {
    const KIND: ArgKind = ArgKind::Word;

    fn into_word(self) -> u64 {
        self
    }

    fn from_word(word: u64) -> Option<Self> {
        Some(word)
    }
}

impl SyscallArg for usize {
    const KIND: ArgKind = ArgKind::Word;

    fn into_word(self) -> u64 {
        self as u64
    }

    fn from_word(word: u64) -> Option<Self> {
        usize::try_from(word).ok()
    }
}

impl SyscallArg for i64 {
    const KIND: ArgKind = ArgKind::Signed;

    fn into_word(self) -> u64 {
        self as u64
    }

    fn from_word(word: u64) -> Option<Self> {
        Some(word as i64)
    }
}

impl<T> SyscallArg for *const T {
    const KIND: ArgKind = ArgKind::Pointer;

    fn into_word(self) -> u64 {
        self as usize as u64
    }

    fn from_word(word: u64) -> Option<Self> {
        Some(word as usize as *const T)
    }
}

impl<T> SyscallArg for *mut T {
    const KIND: ArgKind = ArgKind::Pointer;

    fn into_word(self) -> u64 {
        self as usize as u64
    }

    fn from_word(word: u64) -> Option<Self> {
        Some(word as usize as *mut T)
    }
}

impl SyscallRet for () {
    const KIND: RetKind = RetKind::Void;

    fn into_word(self) -> u64 {
        0
    }

    fn from_word(_word: u64) -> Self {}
}

impl SyscallRet for u64 {
    const KIND: RetKind = RetKind::Word;

    fn into_word(self) -> u64 {
        self
    }

    fn from_word(word: u64) -> Self {
        word
    }
}

impl SyscallRet for usize {
    const KIND: RetKind = RetKind::Word;

    fn into_word(self) -> u64 {
        self as u64
    }

    fn from_word(word: u64) -> Self {
        word as usize
    }
}

impl SyscallRet for *mut u8 {
    const KIND: RetKind = RetKind::Pointer;

    fn into_word(self) -> u64 {
        self as usize as u64
    }

    fn from_word(word: u64) -> Self {
        word as usize as *mut u8
    }
}

/// Expand a macro once with the complete syscall table.
///
/// Each row has the shape
///
/// ```text
/// <number> => <Variant> fn <name>(<arg>: <type>, ...) -> <ret>, errors [<ErrorSet flag>, ...];
/// ```
///
/// The argument order and return type of a row are a frozen ABI contract.
/// The `errors` list documents which codes the call may produce; every
/// blocking call also lists `INTERRUPTED`.
///
/// Gaps in the numbering are reserved for future calls.
#[macro_export]
macro_rules! for_each_syscall {
    ($callback:ident) => {
        $callback! {
            0 => None fn none() -> (), errors [];
            1 => Log fn log(message: *const u8, len: usize) -> (), errors [PARAM, BUFFER];

            // I/O
            2 => Open fn open(
                path: *const u8,
                mode: $crate::flags::OpenMode,
                attr: $crate::flags::OpenAttr
            ) -> $crate::wire::Fd, errors [PARAM, NOT_FOUND, PERMISSION, FAILED];
            3 => Close fn close(fd: $crate::wire::Fd) -> (), errors [PARAM];
            4 => Read fn read(
                fd: $crate::wire::Fd,
                buffer: *mut u8,
                len: usize,
                flags: $crate::flags::RwFlags
            ) -> usize, errors [EOF, PARAM, BUFFER, PERMISSION, BUSY, INTERRUPTED, FAILED];
            5 => Write fn write(
                fd: $crate::wire::Fd,
                buffer: *const u8,
                len: usize,
                flags: $crate::flags::RwFlags
            ) -> usize, errors [PARAM, BUFFER, PERMISSION, BUSY, INTERRUPTED, FAILED];
            6 => Pread fn pread(
                fd: $crate::wire::Fd,
                offset: u64,
                buffer: *mut u8,
                len: usize,
                flags: $crate::flags::RwFlags
            ) -> usize, errors [EOF, PARAM, BUFFER, PERMISSION, BUSY, INTERRUPTED, FAILED];
            7 => Pwrite fn pwrite(
                fd: $crate::wire::Fd,
                offset: u64,
                buffer: *const u8,
                len: usize,
                flags: $crate::flags::RwFlags
            ) -> usize, errors [PARAM, BUFFER, PERMISSION, BUSY, INTERRUPTED, FAILED];
            8 => Lseek fn lseek(
                fd: $crate::wire::Fd,
                offset: i64,
                whence: $crate::wire::Whence
            ) -> u64, errors [PARAM, FAILED];
            9 => Select fn select(
                read_set: *mut $crate::wire::FdSet,
                write_set: *mut $crate::wire::FdSet,
                error_set: *mut $crate::wire::FdSet,
                timeout_us: u64,
                flags: $crate::flags::SelectFlags
            ) -> usize, errors [PARAM, TIMEOUT, INTERRUPTED, BUSY];

            // Naming
            12 => ListDir fn list_dir(
                fd: $crate::wire::Fd,
                cursor: *mut $crate::wire::DirCursor,
                buffer: *mut u8,
                len: usize
            ) -> usize, errors [PARAM, BUFFER, NOT_FOUND];
            13 => Rename fn rename(src: *const u8, dst: *const u8) -> (),
                errors [PARAM, NOT_FOUND, PERMISSION, FAILED];
            14 => Symlink fn symlink(src: *const u8, target: *const u8, flags: u64) -> (),
                errors [PARAM, NOT_FOUND, PERMISSION, FAILED];
            15 => Create fn create(path: *const u8) -> (),
                errors [PARAM, NOT_FOUND, PERMISSION, FAILED];
            16 => Access fn access(path: *const u8, mode: $crate::flags::AccessMode) -> (),
                errors [PARAM, NOT_FOUND, PERMISSION];
            17 => Mkdir fn mkdir(path: *const u8) -> (),
                errors [PARAM, NOT_FOUND, PERMISSION, FAILED];
            18 => Rmdir fn rmdir(path: *const u8) -> (),
                errors [PARAM, NOT_FOUND, PERMISSION, BUSY, FAILED];
            19 => Chdir fn chdir(path: *const u8) -> (), errors [PARAM, NOT_FOUND];
            20 => CurrentDir fn current_dir(buffer: *mut u8, len: usize) -> usize,
                errors [PARAM, BUFFER];
            21 => Chroot fn chroot(path: *const u8) -> (), errors [PARAM, NOT_FOUND, PERMISSION];
            22 => Link fn link(src: *const u8, target: *const u8) -> (),
                errors [PARAM, NOT_FOUND, PERMISSION, FAILED];
            23 => Unlink fn unlink(path: *const u8) -> (),
                errors [PARAM, NOT_FOUND, PERMISSION, BUSY, FAILED];
            24 => Mount fn mount(
                device: *const u8,
                target: *const u8,
                fs_type: *const u8,
                flags: u64,
                data: *const u8,
                data_len: usize
            ) -> (), errors [PARAM, NOT_FOUND, PERMISSION, BUSY, FAILED];
            25 => Umount fn umount(target: *const u8) -> (),
                errors [PARAM, NOT_FOUND, BUSY, FAILED];

            // Process and thread lifecycle
            28 => CreateProcess fn create_process(
                path: *const u8,
                argv: *const *const u8,
                envp: *const *const u8,
                flags: $crate::flags::ProcessFlags
            ) -> $crate::wire::Pid, errors [PARAM, NOT_FOUND, PERMISSION, FAILED];
            29 => CreateThread fn create_thread(
                entry: *const u8,
                arg: u64,
                flags: $crate::flags::ThreadFlags
            ) -> $crate::wire::Tid, errors [PARAM, FAILED];
            30 => Detach fn detach(tid: $crate::wire::Tid) -> (), errors [PARAM, NOT_FOUND];
            31 => Join fn join(tid: $crate::wire::Tid, ret: *mut i64) -> (),
                errors [PARAM, NOT_FOUND, INTERRUPTED];
            32 => WaitProcess fn wait_process(pid: $crate::wire::Pid, ret: *mut i64) -> (),
                errors [PARAM, NOT_FOUND, INTERRUPTED];
            33 => Exit fn exit(code: i64) -> (), errors [];
            34 => ExitThread fn exit_thread(code: i64) -> (), errors [];
            35 => Sleep fn sleep(milliseconds: u64) -> (), errors [INTERRUPTED];

            // Signals
            37 => Raise fn raise(
                signal: $crate::signal::Signal,
                info: *const $crate::signal::SigInfo
            ) -> (), errors [PARAM];
            38 => Sigsend fn sigsend(
                target: u64,
                signal: $crate::signal::Signal,
                info: *const $crate::signal::SigInfo,
                kind: $crate::signal::SigTarget
            ) -> (), errors [PARAM, NOT_FOUND, PERMISSION];
            39 => Sigwait fn sigwait(
                signal: *mut u64,
                info: *mut $crate::signal::SigInfo
            ) -> (), errors [PARAM, INTERRUPTED];
            40 => Sigmask fn sigmask(
                op: $crate::signal::SigmaskOp,
                valid: *mut $crate::signal::SigSet,
                block: *mut $crate::signal::SigSet,
                ignore: *mut $crate::signal::SigSet
            ) -> (), errors [PARAM];

            // CPU affinity
            42 => GetCpumask fn get_cpumask(low: *mut u64, high: *mut u64) -> (), errors [PARAM];
            43 => SetCpumask fn set_cpumask(low: u64, high: u64) -> (), errors [PARAM];

            // Address space
            48 => Brk fn brk(address: u64) -> (), errors [PARAM, FAILED];
            49 => Sbrk fn sbrk(offset: i64) -> *mut u8, errors [PARAM, FAILED];
            50 => Mmap fn mmap(
                address: u64,
                fd: $crate::wire::Fd,
                offset: u64,
                len: usize,
                flags: $crate::flags::MmapFlags
            ) -> *mut u8, errors [PARAM, NOT_FOUND, FAILED];
            51 => Munmap fn munmap(address: u64, len: usize) -> (), errors [PARAM, FAILED];

            // Message queues
            54 => CreateMsgQueue fn create_msg_queue(slots: u64, max_bytes: u64)
                -> $crate::wire::MsgKey, errors [PARAM];
            55 => WriteMsgQueue fn write_msg_queue(
                key: $crate::wire::MsgKey,
                msg_type: u64,
                buffer: *const u8,
                len: usize,
                flags: $crate::flags::MsgFlags
            ) -> (), errors [PARAM, BUFFER, SIZE, BUSY, EOF, INTERRUPTED];
            56 => ReadMsgQueue fn read_msg_queue(
                key: $crate::wire::MsgKey,
                msg_type: u64,
                buffer: *mut u8,
                len: usize,
                flags: $crate::flags::MsgFlags
            ) -> usize, errors [PARAM, BUFFER, BUSY, EOF, CONTINUE, INTERRUPTED];
            57 => CloseMsgQueue fn close_msg_queue(key: $crate::wire::MsgKey) -> (),
                errors [PARAM, BUSY];
        }
    };
}
