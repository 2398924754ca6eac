use core::time::Duration;
use std::thread;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{DEFAULT_EPOCH, Error, Result, SnowflakeId, TimeSource, WallClock};

/// Maximum clock regression, in milliseconds, absorbed by waiting rather
/// than failing.
///
/// An empirical bound, not a derived one: small regressions from NTP slews
/// or VM migrations are waited out, anything larger fails with
/// [`Error::ClockDriftExceeded`].
pub const MAX_CLOCK_DRIFT_MS: i64 = 5;

/// Multiplier applied to an observed clock regression to size the
/// compensating sleep.
///
/// Sleeping for twice the observed offset gives the OS clock slack to
/// catch up before the single recheck.
pub const DRIFT_WAIT_FACTOR: i64 = 2;

/// Configuration for a [`SnowflakeGenerator`].
///
/// # Example
///
/// ```
/// use cryoid::{SnowflakeGenerator, SnowflakeOptions};
///
/// let generator = SnowflakeGenerator::new(SnowflakeOptions {
///     node_id: 7,
///     ..SnowflakeOptions::default()
/// })?;
/// assert_eq!(generator.next_id()?.node_id(), 7);
/// # Ok::<(), cryoid::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnowflakeOptions {
    /// Milliseconds since the Unix epoch marking time zero for the
    /// timestamp field. `0` selects [`DEFAULT_EPOCH`]. Choose an instant
    /// in the past: timestamps count up from here, and an epoch in the
    /// future reads as negative time until it passes.
    pub epoch: i64,
    /// Node (machine) ID, in `0..=`[`SnowflakeId::max_node_id`].
    pub node_id: i64,
}

impl Default for SnowflakeOptions {
    fn default() -> Self {
        Self {
            epoch: DEFAULT_EPOCH,
            node_id: 0,
        }
    }
}

/// Mutable generator state guarded by the lock.
#[derive(Debug)]
struct State {
    sequence: i64,
    last_timestamp: i64,
}

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// All mutable state lives behind a single [`parking_lot::Mutex`], so
/// concurrent callers are fully serialized: no two IDs from one generator
/// can share a `(timestamp, sequence)` pair.
///
/// ## Features
///
/// - ✅ Thread-safe: share `&SnowflakeGenerator` across threads as-is
/// - ✅ Strictly increasing within a generator
/// - ✅ Pluggable clock via [`TimeSource`]
///
/// The default clock is [`WallClock`]; [`with_clock`](Self::with_clock)
/// injects any other [`TimeSource`].
#[derive(Debug)]
pub struct SnowflakeGenerator<C = WallClock> {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<State>,
    node_id: i64,
    clock: C,
}

impl SnowflakeGenerator {
    /// Creates a generator backed by the system clock.
    ///
    /// The epoch in `options` is resolved to an absolute instant once,
    /// here; later clock reads are plain "elapsed since that instant"
    /// measurements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `options.node_id` lies outside
    /// `0..=`[`SnowflakeId::max_node_id`].
    ///
    /// # Example
    ///
    /// ```
    /// use cryoid::{SnowflakeGenerator, SnowflakeOptions};
    ///
    /// let generator = SnowflakeGenerator::new(SnowflakeOptions::default())?;
    /// let id = generator.next_id()?;
    /// assert_eq!(id.node_id(), 0);
    /// # Ok::<(), cryoid::Error>(())
    /// ```
    pub fn new(options: SnowflakeOptions) -> Result<Self> {
        let epoch = if options.epoch == 0 {
            DEFAULT_EPOCH
        } else {
            options.epoch
        };
        Self::with_clock(options.node_id, WallClock::with_epoch(epoch))
    }
}

impl<C> SnowflakeGenerator<C>
where
    C: TimeSource,
{
    /// Creates a generator reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `node_id` lies outside
    /// `0..=`[`SnowflakeId::max_node_id`].
    ///
    /// # Example
    ///
    /// ```
    /// use cryoid::{SnowflakeGenerator, TimeSource};
    ///
    /// struct FixedTime;
    ///
    /// impl TimeSource for FixedTime {
    ///     fn current_millis(&self) -> i64 {
    ///         42
    ///     }
    /// }
    ///
    /// let generator = SnowflakeGenerator::with_clock(1, FixedTime)?;
    /// let id = generator.next_id()?;
    /// assert_eq!(id.timestamp(), 42);
    /// assert_eq!(id.node_id(), 1);
    /// assert_eq!(id.sequence(), 0);
    /// # Ok::<(), cryoid::Error>(())
    /// ```
    pub fn with_clock(node_id: i64, clock: C) -> Result<Self> {
        if node_id < 0 || node_id > SnowflakeId::max_node_id() {
            return Err(Error::InvalidNodeId {
                node_id,
                max: SnowflakeId::max_node_id(),
            });
        }
        let state = State {
            sequence: 0,
            last_timestamp: -1,
        };
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(state)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(state),
            node_id,
            clock,
        })
    }

    /// Returns the next ID.
    ///
    /// Sequence numbers increment within a clock millisecond and reset on
    /// tick rollover; when a tick's 4096 sequence values are exhausted the
    /// call busy-waits for the next tick, so a single generator never
    /// produces more than 4096 IDs per millisecond. Both that wait and the
    /// drift-compensation sleep happen while holding the lock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockDriftExceeded`] if the clock reads more than
    /// [`MAX_CLOCK_DRIFT_MS`] ms behind the last issued timestamp, or if a
    /// regression within that bound persists after one compensating sleep
    /// of [`DRIFT_WAIT_FACTOR`] times the observed offset.
    ///
    /// # Example
    ///
    /// ```
    /// use cryoid::{SnowflakeGenerator, SnowflakeOptions};
    ///
    /// let generator = SnowflakeGenerator::new(SnowflakeOptions::default())?;
    /// let a = generator.next_id()?;
    /// let b = generator.next_id()?;
    /// assert!(a < b);
    /// # Ok::<(), cryoid::Error>(())
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        let mut state = self.state.lock();
        let mut now = self.clock.current_millis();

        if now < state.last_timestamp {
            now = self.cold_clock_behind(state.last_timestamp, now)?;
        }

        if now == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SnowflakeId::SEQUENCE_MASK;
            if state.sequence == 0 {
                // Tick exhausted: hold the lock until the clock advances.
                while now <= state.last_timestamp {
                    core::hint::spin_loop();
                    now = self.clock.current_millis();
                }
            }
        } else {
            state.sequence = 0;
        }

        state.last_timestamp = now;
        Ok(SnowflakeId::from_components(now, self.node_id, state.sequence))
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, last_timestamp: i64, now: i64) -> Result<i64> {
        let offset = last_timestamp - now;
        debug_assert!(offset > 0);
        if offset > MAX_CLOCK_DRIFT_MS {
            return Err(Error::ClockDriftExceeded { offset_ms: offset });
        }
        thread::sleep(Duration::from_millis((offset * DRIFT_WAIT_FACTOR) as u64));
        let resampled = self.clock.current_millis();
        if resampled < last_timestamp {
            return Err(Error::ClockDriftExceeded {
                offset_ms: last_timestamp - resampled,
            });
        }
        Ok(resampled)
    }
}
