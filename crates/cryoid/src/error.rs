use crate::ParseIdError;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All possible errors that `cryoid` can produce.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The node identifier supplied at construction falls outside the range
    /// encodable in the node field.
    ///
    /// Fatal to construction: no generator is returned until a corrected
    /// value is supplied.
    #[error("node id must be between 0 and {max}, got {node_id}")]
    InvalidNodeId { node_id: i64, max: i64 },

    /// The clock was observed behind the last issued timestamp by more than
    /// the tolerated drift, or stayed behind after the one compensation
    /// wait.
    ///
    /// No identifier is produced for the failing call. Callers may retry at
    /// their discretion once the clock has caught up; the generator does not
    /// retry internally. See [`MAX_CLOCK_DRIFT_MS`] for the tolerance.
    ///
    /// [`MAX_CLOCK_DRIFT_MS`]: crate::MAX_CLOCK_DRIFT_MS
    #[error("clock moved backwards: {offset_ms}ms behind the last issued timestamp")]
    ClockDriftExceeded { offset_ms: i64 },

    /// A textual or byte encoding of an ID failed to decode.
    #[error(transparent)]
    Parse(#[from] ParseIdError),
}
