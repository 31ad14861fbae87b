//! Platform abstraction traits.
//!
//! The engine never reads the clock or an entropy source directly; the host hands
//! these in through `HostConfig` so a realm can run under a virtual clock in tests.

mod std_impl;

use std::cell::Cell;
use std::time::Duration;

pub use std_impl::{StdRandomProvider, StdTimeProvider};

/// Trait for providing time-related functionality.
pub trait TimeProvider {
    /// Monotonic time since an arbitrary, fixed origin.
    /// Used for timeout accounting; never goes backwards.
    fn monotonic(&self) -> Duration;
}

/// Trait for providing random number generation.
pub trait RandomProvider {
    /// Generate a random f64 in the range [0, 1).
    /// Used for `Math.random()`.
    fn random(&mut self) -> f64;
}

/// A clock that never advances; timeouts cannot fire under it.
pub struct NoOpTimeProvider;

impl TimeProvider for NoOpTimeProvider {
    fn monotonic(&self) -> Duration {
        Duration::ZERO
    }
}

/// A clock that only moves when told to
///
/// ```
/// use std::time::Duration;
/// use jsrealm::platform::{ManualTimeProvider, TimeProvider};
///
/// let clock = ManualTimeProvider::new();
/// clock.advance(Duration::from_millis(5));
/// assert_eq!(clock.monotonic(), Duration::from_millis(5));
/// ```
#[derive(Debug, Default)]
pub struct ManualTimeProvider {
    now: Cell<Duration>,
}

impl ManualTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl TimeProvider for ManualTimeProvider {
    fn monotonic(&self) -> Duration {
        self.now.get()
    }
}

/// Constant random source, for deterministic hosts
pub struct NoOpRandomProvider;

impl RandomProvider for NoOpRandomProvider {
    fn random(&mut self) -> f64 {
        0.5
    }
}
