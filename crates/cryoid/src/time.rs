use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default epoch: Tuesday, September 10, 2024 15:17:00 UTC
///
/// Used by [`WallClock::default`] and selected by a zero `epoch` in
/// [`SnowflakeOptions`].
///
/// [`SnowflakeOptions`]: crate::SnowflakeOptions
pub const DEFAULT_EPOCH: i64 = 1_725_981_420_000;

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: i64 = 1_288_834_974_657;

/// A trait for time sources that return a millisecond timestamp.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests. The unit is **milliseconds** relative to a
/// configurable origin, signed so that a clock can report an instant before
/// its own epoch.
///
/// # Example
///
/// ```
/// use cryoid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> i64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> i64;
}

/// A wall-clock time source anchored at a configurable epoch.
///
/// The epoch is stored as an absolute [`SystemTime`], so reading the clock is
/// a single "duration since this instant" call regardless of how the host
/// represents time. Because this samples the system wall clock directly,
/// external adjustments (NTP steps, manual changes) are observable as
/// backward jumps; the generator detects and compensates for those rather
/// than assuming monotonicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    epoch: SystemTime,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock using a custom epoch as the origin (t = 0),
    /// specified in milliseconds since 1970-01-01 00:00:00 UTC.
    ///
    /// Negative values select an origin before 1970. An origin in the future
    /// makes [`current_millis`] return negative values until the instant
    /// passes.
    ///
    /// # Panics
    ///
    /// Panics if the epoch lies outside the range representable by
    /// [`SystemTime`] on the host platform.
    ///
    /// [`current_millis`]: TimeSource::current_millis
    pub fn with_epoch(epoch_ms: i64) -> Self {
        let epoch = if epoch_ms >= 0 {
            UNIX_EPOCH + Duration::from_millis(epoch_ms as u64)
        } else {
            UNIX_EPOCH - Duration::from_millis(epoch_ms.unsigned_abs())
        };
        Self { epoch }
    }
}

impl TimeSource for WallClock {
    /// Returns the number of milliseconds between the configured epoch and
    /// the current system time, negative if the epoch has not been reached.
    fn current_millis(&self) -> i64 {
        match SystemTime::now().duration_since(self.epoch) {
            Ok(elapsed) => elapsed.as_millis() as i64,
            Err(behind) => -(behind.duration().as_millis() as i64),
        }
    }
}
