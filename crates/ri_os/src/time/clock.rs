use core::fmt;
use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::sync::Arc;
use crate::sync::atomic::{AtomicU64, Ordering};

// -----------------------------------------------------------------------------
// Timestamp

/// A wall-clock point in time, stored as the offset from the Unix epoch.
///
/// `Display` renders the UTC time of day as `HH:MM:SS`, which is all a
/// session-scoped log needs.
///
/// # Examples
///
/// ```
/// use ri_os::time::{Duration, Timestamp};
///
/// let ts = Timestamp::from_unix(Duration::from_secs(3 * 3600 + 25 * 60 + 7));
/// assert_eq!(ts.to_string(), "03:25:07");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// The Unix epoch itself.
    pub const EPOCH: Self = Self(Duration::ZERO);

    /// Creates a timestamp from an offset since the Unix epoch.
    #[inline]
    pub const fn from_unix(since_epoch: Duration) -> Self {
        Self(since_epoch)
    }

    /// Returns the offset since the Unix epoch.
    #[inline]
    pub const fn since_epoch(self) -> Duration {
        self.0
    }

    /// Returns the current system time.
    ///
    /// A system clock set before 1970 yields [`Timestamp::EPOCH`].
    pub fn now() -> Self {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(Self)
            .unwrap_or(Self::EPOCH)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs() % 86_400;
        write!(f, "{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    }
}

// -----------------------------------------------------------------------------
// Clock

/// A source of [`Timestamp`]s.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// A [`Clock`] backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A [`Clock`] that only moves when told to.
///
/// Cloned handles share the same time.
///
/// # Examples
///
/// ```
/// use ri_os::time::{Clock, Duration, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(Duration::from_secs(2));
/// assert_eq!(clock.now().since_epoch(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock standing at the Unix epoch.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(by, Ordering::Relaxed);
    }

    /// Sets the clock to an absolute time.
    pub fn set(&self, to: Timestamp) {
        let nanos = u64::try_from(to.since_epoch().as_nanos()).unwrap_or(u64::MAX);
        self.nanos.store(nanos, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp(Duration::from_nanos(self.nanos.load(Ordering::Relaxed)))
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::{Clock, ManualClock, Timestamp};

    #[test]
    fn display_wraps_days() {
        let ts = Timestamp::from_unix(Duration::from_secs(86_400 * 3 + 59));
        assert_eq!(ts.to_string(), "00:00:59");
    }

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::new();
        clock.set(Timestamp::from_unix(Duration::from_secs(10)));
        clock.advance(Duration::from_millis(1500));
        assert_eq!(clock.now().since_epoch(), Duration::from_millis(11_500));
    }
}
