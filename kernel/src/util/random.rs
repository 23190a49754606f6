//! Pseudo-random numbers.
//!
//! Marsaglia's xorshift generator with a 96-bit state (period 2^96 - 1).
//! Not cryptographic: used for jitter, hash seeds and test data.

/// xorshift96 generator.
#[derive(Debug, Clone)]
pub struct XorShift96 {
    x: u64,
    y: u64,
    z: u64,
}

impl XorShift96 {
    /// Generator seeded with the fixed default state.
    pub const fn new() -> Self {
        Self {
            x: 123_456_789,
            y: 362_436_069,
            z: 521_288_629,
        }
    }

    /// Generator with a caller-chosen state. An all-zero state is replaced
    /// by the default, since zero is a fixed point.
    pub const fn with_seed(x: u64, y: u64, z: u64) -> Self {
        if x == 0 && y == 0 && z == 0 {
            Self::new()
        } else {
            Self { x, y, z }
        }
    }

    /// Next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.x ^= self.x << 16;
        self.x ^= self.x >> 5;
        self.x ^= self.x << 1;

        let t = self.x;
        self.x = self.y;
        self.y = self.z;
        self.z = t ^ self.x ^ self.y;
        self.z
    }

    /// Next value in `0..max`. Returns 0 when `max` is 0.
    pub fn next_below(&mut self, max: u64) -> u64 {
        self.next_u64().checked_rem(max).unwrap_or(0)
    }
}

impl Default for XorShift96 {
    fn default() -> Self {
        Self::new()
    }
}
