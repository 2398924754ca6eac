use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::SnowflakeId;

impl Serialize for SnowflakeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.to_raw())
    }
}

impl<'de> Deserialize<'de> for SnowflakeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        i64::deserialize(deserializer).map(Self::from_raw)
    }
}

pub mod as_str {
    use super::{Deserializer, Serializer};
    use crate::SnowflakeId;

    /// Serialize an ID as its decimal string representation.
    ///
    /// JSON numbers lose precision past 2^53, so 64-bit IDs commonly
    /// travel as strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// Deserialize an ID from its decimal string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a valid signed 64-bit decimal integer
    pub fn deserialize<'de, D>(d: D) -> Result<SnowflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl serde::de::Visitor<'_> for DecimalVisitor {
            type Value = SnowflakeId;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a decimal string encoding a 64-bit id")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(serde::de::Error::custom)
            }
        }

        d.deserialize_str(DecimalVisitor)
    }
}

pub mod as_base64 {
    use super::{Deserializer, Serializer};
    use crate::SnowflakeId;

    /// Serialize an ID as base64 text over its decimal byte form.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(id.to_base64().as_str())
    }

    /// Deserialize an ID from base64 text over its decimal byte form.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not valid standard-alphabet base64
    /// - The decoded bytes are not a decimal integer
    pub fn deserialize<'de, D>(d: D) -> Result<SnowflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Base64Visitor;

        impl serde::de::Visitor<'_> for Base64Visitor {
            type Value = SnowflakeId;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a base64 encoded string")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                SnowflakeId::from_base64(v).map_err(serde::de::Error::custom)
            }
        }

        d.deserialize_str(Base64Visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SnowflakeId;

    #[test]
    fn id_roundtrips_as_number() {
        let id = SnowflakeId::from_raw(7_267_097_612_291_928_070);

        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "7267097612291928070");
        let back: SnowflakeId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn str_roundtrip() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Row {
            #[serde(with = "as_str")]
            event_id: SnowflakeId,
        }
        let row = Row {
            event_id: SnowflakeId::from_raw(42),
        };

        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(json, r#"{"event_id":"42"}"#);
        let back: Row = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, row);
    }

    #[test]
    fn str_rejects_non_decimal() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Row {
            #[serde(with = "as_str")]
            event_id: SnowflakeId,
        }
        let err = serde_json::from_str::<Row>(r#"{"event_id":"zap"}"#).expect_err("should fail");
        assert!(err.to_string().contains("invalid decimal id"));
    }

    #[test]
    fn base64_roundtrip() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Row {
            #[serde(with = "as_base64")]
            event_id: SnowflakeId,
        }
        let row = Row {
            event_id: SnowflakeId::from_raw(42),
        };

        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(json, r#"{"event_id":"NDI="}"#);
        let back: Row = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, row);
    }

    #[test]
    fn base64_rejects_invalid_input() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Row {
            #[serde(with = "as_base64")]
            event_id: SnowflakeId,
        }
        let err = serde_json::from_str::<Row>(r#"{"event_id":"!!!"}"#).expect_err("should fail");
        assert!(err.to_string().contains("invalid base64 id"));
    }
}
