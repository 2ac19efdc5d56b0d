//! Expiration policy for cached books.
//!
//! Every cache write draws its TTL uniformly from `[base, base + jitter)` in
//! whole seconds so entries written together do not expire together.

use std::time::Duration;

use rand::Rng;

/// Base TTL applied to cached books (two hours).
pub const DEFAULT_TTL_BASE: Duration = Duration::from_secs(7200);

/// Upper bound (exclusive) of the random extension added to the base TTL.
pub const DEFAULT_TTL_JITTER: Duration = Duration::from_secs(600);

/// Longest base or jitter window a policy accepts from configuration (one year).
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Jittered TTL policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    base: Duration,
    jitter: Duration,
}

impl TtlPolicy {
    pub const fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    pub const fn from_secs(base_secs: u64, jitter_secs: u64) -> Self {
        Self::new(
            Duration::from_secs(base_secs),
            Duration::from_secs(jitter_secs),
        )
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn jitter(&self) -> Duration {
        self.jitter
    }

    /// Draws a TTL in `[base, base + jitter)`.
    ///
    /// A jitter window shorter than one second yields the base TTL.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let window = self.jitter.as_secs();
        if window == 0 {
            return self.base;
        }
        self.base
            .saturating_add(Duration::from_secs(rng.random_range(0..window)))
    }

    /// Returns true if `ttl` is a value this policy can produce.
    pub fn contains(&self, ttl: Duration) -> bool {
        if self.jitter.as_secs() == 0 {
            return ttl == self.base;
        }
        ttl >= self.base && ttl < self.base.saturating_add(self.jitter)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_BASE, DEFAULT_TTL_JITTER)
    }
}
