//! Serde helpers for the store's wire format.
//!
//! - `flexible_timestamp`: the store writes naive UTC timestamps
//!   (`2024-05-01T12:30:00.123456`) as well as RFC 3339 ones.
//! - `ordered_counts`: count maps decoded into `Vec<(K, u64)>` so the
//!   store's key order survives.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an RFC 3339 or naive (assumed UTC) timestamp
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub mod flexible_timestamp {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp {:?}", raw)))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => super::serialize(ts, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => parse_timestamp(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp {:?}", raw))),
                None => Ok(None),
            }
        }
    }
}

pub mod ordered_counts {
    use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use serde::ser::{SerializeMap, Serializer};
    use serde::Serialize;
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<S, K>(counts: &[(K, u64)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        K: Serialize,
    {
        let mut map = serializer.serialize_map(Some(counts.len()))?;
        for (key, count) in counts {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, K>(deserializer: D) -> Result<Vec<(K, u64)>, D::Error>
    where
        D: Deserializer<'de>,
        K: Deserialize<'de>,
    {
        deserializer.deserialize_any(CountsVisitor(PhantomData))
    }

    struct CountsVisitor<K>(PhantomData<K>);

    impl<'de, K: Deserialize<'de>> Visitor<'de> for CountsVisitor<K> {
        type Value = Vec<(K, u64)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of counts")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut counts = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, count)) = map.next_entry::<K, u64>()? {
                counts.push((key, count));
            }
            Ok(counts)
        }
    }
}
