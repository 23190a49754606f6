//! Syscall error codes.
//!
//! One flat, closed set of small negative integers is shared by every call.
//! Zero is success; non-negative returns carry the call's documented payload
//! (byte count, handle, address). Which subset of codes a call can produce
//! is recorded in its descriptor's [`ErrorSet`].

use core::fmt;

/// System call error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum Error {
    /// End of stream.
    Eof = -1,
    /// The operation timed out.
    Timeout = -2,
    /// A pending signal interrupted a blocking call.
    Interrupted = -3,
    /// Bad parameter.
    Param = -4,
    /// Buffer too small or not addressable.
    Buffer = -5,
    /// Size mismatch.
    Size = -6,
    /// Permission denied.
    Permission = -7,
    /// Resource busy, or the call would block.
    Busy = -8,
    /// Not found.
    NotFound = -9,
    /// Internal kernel error.
    Internal = -10,
    /// Operation failed.
    Failed = -11,
    /// More data follows; call again.
    Continue = -12,
}

/// Result type for system calls.
pub type SysResult<T> = Result<T, Error>;

impl Error {
    /// Every error, in code order.
    pub const ALL: [Error; 12] = [
        Error::Eof,
        Error::Timeout,
        Error::Interrupted,
        Error::Param,
        Error::Buffer,
        Error::Size,
        Error::Permission,
        Error::Busy,
        Error::NotFound,
        Error::Internal,
        Error::Failed,
        Error::Continue,
    ];

    /// Wire value of this error.
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Convert a raw negative code. Codes outside the closed set yield
    /// `None`.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(Error::Eof),
            -2 => Some(Error::Timeout),
            -3 => Some(Error::Interrupted),
            -4 => Some(Error::Param),
            -5 => Some(Error::Buffer),
            -6 => Some(Error::Size),
            -7 => Some(Error::Permission),
            -8 => Some(Error::Busy),
            -9 => Some(Error::NotFound),
            -10 => Some(Error::Internal),
            -11 => Some(Error::Failed),
            -12 => Some(Error::Continue),
            _ => None,
        }
    }

    /// The [`ErrorSet`] flag for this error.
    pub const fn bit(self) -> ErrorSet {
        ErrorSet::from_bits_retain(1u32 << ((-self.code() - 1) as u32))
    }

    /// Short description.
    pub const fn as_str(self) -> &'static str {
        match self {
            Error::Eof => "end of stream",
            Error::Timeout => "timed out",
            Error::Interrupted => "interrupted",
            Error::Param => "bad parameter",
            Error::Buffer => "buffer too small",
            Error::Size => "size mismatch",
            Error::Permission => "permission denied",
            Error::Busy => "resource busy",
            Error::NotFound => "not found",
            Error::Internal => "internal error",
            Error::Failed => "operation failed",
            Error::Continue => "continue",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}

bitflags::bitflags! {
    /// A subset of [`Error`] codes, one bit per code.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ErrorSet: u32 {
        const EOF = 1 << 0;
        const TIMEOUT = 1 << 1;
        const INTERRUPTED = 1 << 2;
        const PARAM = 1 << 3;
        const BUFFER = 1 << 4;
        const SIZE = 1 << 5;
        const PERMISSION = 1 << 6;
        const BUSY = 1 << 7;
        const NOT_FOUND = 1 << 8;
        const INTERNAL = 1 << 9;
        const FAILED = 1 << 10;
        const CONTINUE = 1 << 11;
    }
}

impl ErrorSet {
    /// Whether `error` is in this set.
    pub const fn contains_error(self, error: Error) -> bool {
        self.bits() & error.bit().bits() != 0
    }
}

/// Split a raw return register into payload or error.
///
/// A negative value outside the closed set means the kernel broke the ABI;
/// it is reported as [`Error::Internal`].
#[inline]
pub fn decode(raw: i64) -> SysResult<u64> {
    if raw >= 0 {
        Ok(raw as u64)
    } else {
        Err(Error::from_code(raw).unwrap_or(Error::Internal))
    }
}

/// Fold a handler result into the raw return register.
#[inline]
pub fn encode(result: SysResult<u64>) -> i64 {
    match result {
        Ok(value) => {
            debug_assert!(value <= i64::MAX as u64, "payload collides with error space");
            value as i64
        }
        Err(err) => err.code(),
    }
}
