//! Pseudo-random source for game modes.
//!
//! Modes draw randomness through [`RandomSource`] so tests can inject a
//! fixed seed (or a scripted source) and assert exact sequences.

/// Anything that can hand out 16-bit pseudo-random words.
pub trait RandomSource {
    fn next_u16(&mut self) -> u16;

    /// Uniform-ish value in `0..bound`.  Returns 0 for `bound == 0`.
    fn below(&mut self, bound: u16) -> u16 {
        if bound == 0 {
            return 0;
        }
        self.next_u16() % bound
    }
}

/// 16-bit linear congruential generator (`x' = x * 49381 + 8643`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lcg {
    state: u16,
}

impl Lcg {
    const MULTIPLIER: u16 = 49381;
    const INCREMENT: u16 = 8643;

    pub const fn with_seed(seed: u16) -> Self {
        Self { state: seed }
    }

    pub const fn state(&self) -> u16 {
        self.state
    }
}

impl RandomSource for Lcg {
    fn next_u16(&mut self) -> u16 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }
}
