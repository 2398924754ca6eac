use core::{fmt, str::FromStr};

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// A 64-bit Snowflake ID
///
/// - 1 bit reserved (the sign bit, always zero for generated IDs)
/// - 41 bits timestamp (ms since the generator's epoch)
/// - 10 bits node ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21           12 11             0
///              +--------------+----------------+---------------+---------------+
///  Field:      | reserved (1) | timestamp (41) |  node ID (10) | sequence (12) |
///              +--------------+----------------+---------------+---------------+
///              |<---------- MSB ---------- 64 bits ----------- LSB ----------->|
/// ```
///
/// Packing is a pure shift/mask/OR composition: decoding the three fields of
/// a validly produced ID and reconstructing yields the identical bit
/// pattern. IDs compare as plain integers, so IDs from one generator sort by
/// generation order.
///
/// # Example
///
/// ```
/// use cryoid::SnowflakeId;
///
/// let id = SnowflakeId::from(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.node_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: i64,
}

impl SnowflakeId {
    /// Width of the timestamp field in bits.
    pub const TIMESTAMP_BITS: u32 = 41;

    /// Width of the node ID field in bits.
    pub const NODE_ID_BITS: u32 = 10;

    /// Width of the sequence field in bits.
    pub const SEQUENCE_BITS: u32 = 12;

    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: i64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for extracting the 10-bit node ID field. Occupies bits 12
    /// through 21.
    pub const NODE_ID_MASK: i64 = (1 << Self::NODE_ID_BITS) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: i64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Number of bits to shift the timestamp to its correct position
    /// (bit 22).
    pub const TIMESTAMP_SHIFT: u32 = Self::NODE_ID_BITS + Self::SEQUENCE_BITS;

    /// Number of bits to shift the node ID to its correct position (bit 12).
    pub const NODE_ID_SHIFT: u32 = Self::SEQUENCE_BITS;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u32 = 0;

    pub const fn from(timestamp: i64, node_id: i64, sequence: i64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let node_id = (node_id & Self::NODE_ID_MASK) << Self::NODE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | node_id | sequence,
        }
    }

    /// Constructs an ID from its components, checking every field against
    /// its bit width in debug builds. Out-of-range fields are truncated by
    /// [`from`](Self::from) in release builds.
    pub fn from_components(timestamp: i64, node_id: i64, sequence: i64) -> Self {
        debug_assert!(
            0 <= timestamp && timestamp <= Self::TIMESTAMP_MASK,
            "timestamp overflow"
        );
        debug_assert!(
            0 <= node_id && node_id <= Self::NODE_ID_MASK,
            "node_id overflow"
        );
        debug_assert!(
            0 <= sequence && sequence <= Self::SEQUENCE_MASK,
            "sequence overflow"
        );
        Self::from(timestamp, node_id, sequence)
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> i64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the node ID from the packed ID.
    pub const fn node_id(&self) -> i64 {
        (self.id >> Self::NODE_ID_SHIFT) & Self::NODE_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> i64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns the maximum possible value for the timestamp field.
    pub const fn max_timestamp() -> i64 {
        Self::TIMESTAMP_MASK
    }

    /// Returns the maximum possible value for the node ID field.
    pub const fn max_node_id() -> i64 {
        Self::NODE_ID_MASK
    }

    /// Returns the maximum possible value for the sequence field.
    pub const fn max_sequence() -> i64 {
        Self::SEQUENCE_MASK
    }

    /// Converts this ID into its raw integer representation.
    pub const fn to_raw(&self) -> i64 {
        self.id
    }

    /// Converts a raw integer into this type.
    ///
    /// No validation is performed: every `i64` bit pattern round-trips
    /// through [`to_raw`](Self::to_raw) unchanged.
    pub const fn from_raw(raw: i64) -> Self {
        Self { id: raw }
    }

    /// Returns the ID as the ASCII bytes of its decimal representation.
    ///
    /// This is the byte form consumed by [`to_base64`](Self::to_base64). It
    /// is not a fixed-width binary encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Parses an ID from the ASCII bytes of its decimal representation.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseIdError`] if the bytes are not valid UTF-8 or do
    /// not spell a signed 64-bit decimal integer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseIdError> {
        core::str::from_utf8(bytes)?.parse()
    }

    /// Returns the ID as base64 text (standard alphabet, padded) over the
    /// bytes of [`to_bytes`](Self::to_bytes).
    ///
    /// # Example
    ///
    /// ```
    /// use cryoid::SnowflakeId;
    ///
    /// let id = SnowflakeId::from_raw(7267097612291928070);
    /// assert_eq!(id.to_base64(), "NzI2NzA5NzYxMjI5MTkyODA3MA==");
    /// assert_eq!(SnowflakeId::from_base64(&id.to_base64())?, id);
    /// # Ok::<(), cryoid::ParseIdError>(())
    /// ```
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parses an ID from its base64 text representation.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseIdError`] if the input is not valid base64 or the
    /// decoded bytes are not a decimal integer.
    pub fn from_base64(encoded: &str) -> Result<Self, ParseIdError> {
        Self::from_bytes(&STANDARD.decode(encoded)?)
    }
}

// The reserved sign bit plus the three fields must cover the word exactly.
const _: () = assert!(
    1 + SnowflakeId::TIMESTAMP_BITS + SnowflakeId::NODE_ID_BITS + SnowflakeId::SEQUENCE_BITS
        == i64::BITS
);

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("node_id", &self.node_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl FromStr for SnowflakeId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_raw(s.parse()?))
    }
}

/// Errors produced when decoding an ID from text or bytes.
///
/// Returned directly by the conversion helpers; convertible into the
/// crate-level [`Error`] for callers mixing conversion and generation
/// failures.
///
/// [`Error`]: crate::Error
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseIdError {
    /// The byte form did not contain valid UTF-8 text.
    #[error("id bytes are not valid utf-8: {0}")]
    InvalidUtf8(#[from] core::str::Utf8Error),

    /// The text was not a valid signed 64-bit decimal integer.
    #[error("invalid decimal id: {0}")]
    InvalidDecimal(#[from] core::num::ParseIntError),

    /// The text was not valid standard-alphabet base64.
    #[error("invalid base64 id: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_and_bounds() {
        let ts = SnowflakeId::max_timestamp();
        let node = SnowflakeId::max_node_id();
        let seq = SnowflakeId::max_sequence();

        let id = SnowflakeId::from(ts, node, seq);
        println!("ID: {id:?}");
        assert_eq!(id.timestamp(), ts);
        assert_eq!(id.node_id(), node);
        assert_eq!(id.sequence(), seq);
        assert_eq!(SnowflakeId::from_components(ts, node, seq), id);
    }

    #[test]
    fn zero_id_has_zero_fields() {
        let id = SnowflakeId::from(0, 0, 0);
        assert_eq!(id.to_raw(), 0);
        assert_eq!(id.timestamp(), 0);
        assert_eq!(id.node_id(), 0);
        assert_eq!(id.sequence(), 0);
    }

    #[test]
    fn packing_matches_shift_composition() {
        let id = SnowflakeId::from_components(1_726_000_000, 512, 6);
        let raw = (1_726_000_000_i64 << SnowflakeId::TIMESTAMP_SHIFT)
            | (512 << SnowflakeId::NODE_ID_SHIFT)
            | 6;
        assert_eq!(id.to_raw(), raw);
        assert!(id.to_raw() > 0);
    }

    #[test]
    fn unchecked_from_masks_out_of_range_fields() {
        let id = SnowflakeId::from(SnowflakeId::max_timestamp() + 1, 0, 0);
        assert_eq!(id.timestamp(), 0);
    }

    #[test]
    fn ordering_follows_timestamp_then_sequence() {
        let a = SnowflakeId::from(41, 3, 4095);
        let b = SnowflakeId::from(42, 3, 0);
        let c = SnowflakeId::from(42, 3, 1);
        assert!(a < b && b < c);
    }

    #[test]
    #[should_panic(expected = "timestamp overflow")]
    fn timestamp_overflow_panics() {
        SnowflakeId::from_components(SnowflakeId::max_timestamp() + 1, 0, 0);
    }

    #[test]
    #[should_panic(expected = "node_id overflow")]
    fn node_id_overflow_panics() {
        SnowflakeId::from_components(0, SnowflakeId::max_node_id() + 1, 0);
    }

    #[test]
    #[should_panic(expected = "sequence overflow")]
    fn sequence_overflow_panics() {
        SnowflakeId::from_components(0, 0, SnowflakeId::max_sequence() + 1);
    }

    #[test]
    #[should_panic(expected = "node_id overflow")]
    fn negative_node_id_panics() {
        SnowflakeId::from_components(0, -1, 0);
    }

    #[test]
    fn display_is_decimal() {
        let id = SnowflakeId::from_raw(7_267_097_612_291_928_070);
        assert_eq!(id.to_string(), "7267097612291928070");
        assert_eq!(SnowflakeId::from_raw(-1).to_string(), "-1");
    }

    #[test]
    fn decimal_roundtrip() {
        let id = SnowflakeId::from_components(1_726_000_000, 512, 6);
        let parsed: SnowflakeId = id.to_string().parse().expect("parse");
        assert_eq!(parsed, id);

        // Signed values round-trip even though generators never emit them.
        let negative: SnowflakeId = "-1".parse().expect("parse");
        assert_eq!(negative, SnowflakeId::from_raw(-1));
    }

    #[test]
    fn parse_rejects_malformed_decimal() {
        assert!(matches!(
            "".parse::<SnowflakeId>(),
            Err(ParseIdError::InvalidDecimal(_))
        ));
        assert!(matches!(
            "not-a-number".parse::<SnowflakeId>(),
            Err(ParseIdError::InvalidDecimal(_))
        ));
        // One past i64::MAX.
        assert!(matches!(
            "9223372036854775808".parse::<SnowflakeId>(),
            Err(ParseIdError::InvalidDecimal(_))
        ));
    }

    #[test]
    fn bytes_roundtrip() {
        let id = SnowflakeId::from_raw(7_267_097_612_291_928_070);
        let bytes = id.to_bytes();
        assert_eq!(bytes, b"7267097612291928070");
        assert_eq!(SnowflakeId::from_bytes(&bytes).expect("parse"), id);
    }

    #[test]
    fn bytes_reject_invalid_utf8() {
        assert!(matches!(
            SnowflakeId::from_bytes(&[0xff, 0xfe]),
            Err(ParseIdError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn base64_roundtrip() {
        let id = SnowflakeId::from_raw(42);
        assert_eq!(id.to_base64(), "NDI=");
        assert_eq!(SnowflakeId::from_base64("NDI=").expect("decode"), id);

        let id = SnowflakeId::from_raw(7_267_097_612_291_928_070);
        assert_eq!(SnowflakeId::from_base64(&id.to_base64()).expect("decode"), id);
    }

    #[test]
    fn base64_rejects_malformed_input() {
        assert!(matches!(
            SnowflakeId::from_base64("!!!"),
            Err(ParseIdError::InvalidBase64(_))
        ));
        // "aGVsbG8=" decodes cleanly to "hello", which is not a decimal
        // integer.
        assert!(matches!(
            SnowflakeId::from_base64("aGVsbG8="),
            Err(ParseIdError::InvalidDecimal(_))
        ));
    }
}
