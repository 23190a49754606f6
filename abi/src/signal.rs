//! Signal numbers and mask operations.

use crate::{ArgKind, SyscallArg};

/// Reserved signal numbers. 1–19 plus 30 and 31; everything else is
/// unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Signal {
    Hangup = 1,
    Interrupt = 2,
    Quit = 3,
    Illegal = 4,
    Trap = 5,
    Abort = 6,
    Bus = 7,
    FloatingPoint = 8,
    Kill = 9,
    User1 = 10,
    SegmentationFault = 11,
    User2 = 12,
    Pipe = 13,
    Alarm = 14,
    Terminate = 15,
    StackFault = 16,
    Child = 17,
    Continue = 18,
    Stop = 19,
    Power = 30,
    Limit = 31,
}

impl Signal {
    /// Decode a raw signal number.
    pub const fn from_raw(raw: u64) -> Option<Self> {
        Some(match raw {
            1 => Signal::Hangup,
            2 => Signal::Interrupt,
            3 => Signal::Quit,
            4 => Signal::Illegal,
            5 => Signal::Trap,
            6 => Signal::Abort,
            7 => Signal::Bus,
            8 => Signal::FloatingPoint,
            9 => Signal::Kill,
            10 => Signal::User1,
            11 => Signal::SegmentationFault,
            12 => Signal::User2,
            13 => Signal::Pipe,
            14 => Signal::Alarm,
            15 => Signal::Terminate,
            16 => Signal::StackFault,
            17 => Signal::Child,
            18 => Signal::Continue,
            19 => Signal::Stop,
            30 => Signal::Power,
            31 => Signal::Limit,
            _ => return None,
        })
    }

    pub const fn raw(self) -> u64 {
        self as u64
    }
}

impl SyscallArg for Signal {
    const KIND: ArgKind = ArgKind::Word;

    fn into_word(self) -> u64 {
        self.raw()
    }

    fn from_word(word: u64) -> Option<Self> {
        Signal::from_raw(word)
    }
}

/// Operation applied by `sigmask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum SigmaskOp {
    /// Read the current masks into the pointed-to sets.
    Get = 0,
    /// Replace.
    Set = 1,
    Or = 2,
    And = 3,
    Xor = 4,
    /// Flip every bit; the operand is ignored.
    InvertAll = 5,
}

impl SigmaskOp {
    pub const fn from_raw(raw: u64) -> Option<Self> {
        Some(match raw {
            0 => SigmaskOp::Get,
            1 => SigmaskOp::Set,
            2 => SigmaskOp::Or,
            3 => SigmaskOp::And,
            4 => SigmaskOp::Xor,
            5 => SigmaskOp::InvertAll,
            _ => return None,
        })
    }
}

impl SyscallArg for SigmaskOp {
    const KIND: ArgKind = ArgKind::Word;

    fn into_word(self) -> u64 {
        self as u64
    }

    fn from_word(word: u64) -> Option<Self> {
        SigmaskOp::from_raw(word)
    }
}

/// Whom `sigsend` addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum SigTarget {
    Process = 0,
    Group = 1,
}

impl SyscallArg for SigTarget {
    const KIND: ArgKind = ArgKind::Word;

    fn into_word(self) -> u64 {
        self as u64
    }

    fn from_word(word: u64) -> Option<Self> {
        match word {
            0 => Some(SigTarget::Process),
            1 => Some(SigTarget::Group),
            _ => None,
        }
    }
}

/// Payload attached to a sent signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct SigInfo {
    pub value: u64,
}

/// 64-bit signal set, bit `n` for signal number `n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct SigSet(pub u64);

impl SigSet {
    pub const EMPTY: SigSet = SigSet(0);

    pub const fn with(self, signal: Signal) -> Self {
        SigSet(self.0 | (1 << signal.raw()))
    }

    pub fn insert(&mut self, signal: Signal) {
        self.0 |= 1 << signal.raw();
    }

    pub fn remove(&mut self, signal: Signal) {
        self.0 &= !(1 << signal.raw());
    }

    pub const fn contains(self, signal: Signal) -> bool {
        self.0 & (1 << signal.raw()) != 0
    }

    /// Result of applying `op` with `operand` to this set.
    pub const fn apply(self, op: SigmaskOp, operand: SigSet) -> SigSet {
        match op {
            SigmaskOp::Get => self,
            SigmaskOp::Set => operand,
            SigmaskOp::Or => SigSet(self.0 | operand.0),
            SigmaskOp::And => SigSet(self.0 & operand.0),
            SigmaskOp::Xor => SigSet(self.0 ^ operand.0),
            SigmaskOp::InvertAll => SigSet(!self.0),
        }
    }
}

/// The three sub-masks `sigmask` operates on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct SigMask {
    /// Signals the task accepts at all.
    pub valid: SigSet,
    /// Signals held pending.
    pub block: SigSet,
    /// Signals discarded on delivery.
    pub ignore: SigSet,
}

impl SigMask {
    /// Apply `op` to each sub-mask whose operand is present.
    pub fn apply(
        &mut self,
        op: SigmaskOp,
        valid: Option<SigSet>,
        block: Option<SigSet>,
        ignore: Option<SigSet>,
    ) {
        if let Some(operand) = valid {
            self.valid = self.valid.apply(op, operand);
        }
        if let Some(operand) = block {
            self.block = self.block.apply(op, operand);
        }
        if let Some(operand) = ignore {
            self.ignore = self.ignore.apply(op, operand);
        }
    }
}
