//! Identifiers of the records stored in collections

use std::cmp::max;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Implements [`Record`](crate::traits::Record) for a struct that has an `id: RecordId` field
macro_rules! impl_record {
    ($type:ty, $storage_key:expr) => {
        impl crate::traits::Record for $type {
            const STORAGE_KEY: &'static str = $storage_key;

            fn id(&self) -> &crate::record::RecordId {
                &self.id
            }

            fn set_id(&mut self, id: crate::record::RecordId) {
                self.id = id;
            }
        }
    }
}

/// The format of the `createdAt`/`updatedAt` timestamps of records
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
/// The format of the calendar dates of records (event dates, due dates...)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The current local time, formatted with [`TIMESTAMP_FORMAT`]
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// The last value handed out by [`RecordId::generate`]
static LAST_GENERATED: AtomicI64 = AtomicI64::new(0);

/// The identifier of a record, unique within its collection.
///
/// This is always handled as a string. Older data may contain ids stored as JSON numbers, these are read as their decimal string form.
/// An empty id means "no id yet".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    content: String,
}

impl RecordId {
    /// Generate a new id, made of the current timestamp in milliseconds.
    ///
    /// Two calls in the same process never return the same id: if the clock did not move forward, the previous id plus one is used.
    pub fn generate() -> Self {
        let now = Utc::now().timestamp_millis();
        let previous = match LAST_GENERATED.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(max(now, last + 1))) {
            Ok(prev) | Err(prev) => prev,
        };
        Self { content: max(now, previous + 1).to_string() }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl From<String> for RecordId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for RecordId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}
impl From<u64> for RecordId {
    fn from(number: u64) -> Self {
        Self { content: number.to_string() }
    }
}
impl From<&RecordId> for RecordId {
    fn from(id: &RecordId) -> Self {
        id.clone()
    }
}
impl FromStr for RecordId {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}

/// Used to support serde
impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.content)
    }
}

/// Used to support serde
impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<RecordId, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RecordIdVisitor)
    }
}

struct RecordIdVisitor;

impl<'de> Visitor<'de> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "a string or an integer id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RecordId, E> {
        Ok(RecordId::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RecordId, E> {
        Ok(RecordId::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RecordId, E> {
        Ok(RecordId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RecordId, E> {
        Ok(RecordId::from(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RecordId, E> {
        // JSON numbers such as `1.7e12` are still integral timestamps
        if v.fract() == 0.0 && v.abs() < 9.0e15 {
            Ok(RecordId::from((v as i64).to_string()))
        } else {
            Ok(RecordId::from(v.to_string()))
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<RecordId, E> {
        Ok(RecordId::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<RecordId, E> {
        Ok(RecordId::default())
    }
}


/// Deserialize a record field, falling back to its default value when the stored value has an unexpected type.
///
/// Use it with `#[serde(deserialize_with = "crate::record::lenient")]`, so that one odd field does not make the whole record unreadable.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            log::warn!("Unexpected value {} ({}). Using a default value instead", value, err);
            Ok(T::default())
        },
    }
}
