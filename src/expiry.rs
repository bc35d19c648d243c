use core::time::Duration;
use std::time::Instant;

/// Lifetime of a cache entry.
///
/// [`Expiry::Never`] stands for "manual invalidation only". It is kept as a sentinel instead of a
/// far-future timestamp so no backend has to represent a duration of several hundred years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    At(Instant),
}

impl Expiry {
    /// Expiry `ttl` from now. Falls back to [`Expiry::Never`] if the instant isn't representable.
    #[inline]
    #[must_use]
    pub fn after(ttl: Duration) -> Self {
        Instant::now().checked_add(ttl).map_or(Self::Never, Self::At)
    }

    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self {
            Self::Never => false,
            Self::At(deadline) => *deadline <= now,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Returns `true` if an entry with this expiry is still alive `horizon` from now.
    #[inline]
    #[must_use]
    pub fn outlives(&self, horizon: Duration) -> bool {
        match self {
            Self::Never => true,
            Self::At(deadline) => Instant::now().checked_add(horizon).is_some_and(|limit| *deadline > limit),
        }
    }
}

impl Default for Expiry {
    #[inline]
    fn default() -> Self {
        Self::Never
    }
}
