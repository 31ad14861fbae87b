//! Standard library implementations of platform traits.

use super::{RandomProvider, TimeProvider};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Time provider using `std::time::Instant`.
pub struct StdTimeProvider {
    /// Reference instant all readings are relative to
    epoch: Instant,
}

impl StdTimeProvider {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for StdTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for StdTimeProvider {
    fn monotonic(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Random provider using a xorshift64 PRNG seeded from the wall clock.
pub struct StdRandomProvider {
    state: u64,
}

impl StdRandomProvider {
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x12345678_9abcdef0);
        Self::with_seed(seed)
    }

    /// Create with a specific seed (for testing).
    pub fn with_seed(seed: u64) -> Self {
        // xorshift is stuck at zero
        let seed = if seed == 0 { 0x12345678_9abcdef0 } else { seed };
        Self { state: seed }
    }
}

impl Default for StdRandomProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomProvider for StdRandomProvider {
    fn random(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        // upper 53 bits
        let mantissa = x >> 11;
        (mantissa as f64) / ((1u64 << 53) as f64)
    }
}
