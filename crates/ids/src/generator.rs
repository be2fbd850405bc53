//! Internal implementation of record identifiers and their generation.

use crate::{IdError, IdResult};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const STAMP_DIGITS: usize = 17;

/// The entity types that receive generated identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdPrefix {
    Patient,
    Prescription,
    Treatment,
    Admission,
    History,
    Alert,
}

impl IdPrefix {
    /// Every prefix, in declaration order.
    pub const ALL: [IdPrefix; 6] = [
        IdPrefix::Patient,
        IdPrefix::Prescription,
        IdPrefix::Treatment,
        IdPrefix::Admission,
        IdPrefix::History,
        IdPrefix::Alert,
    ];

    /// The literal text placed in front of the timestamp.
    pub const fn as_str(self) -> &'static str {
        match self {
            IdPrefix::Patient => "PAT",
            IdPrefix::Prescription => "RX",
            IdPrefix::Treatment => "TRT",
            IdPrefix::Admission => "ADM",
            IdPrefix::History => "HIST",
            IdPrefix::Alert => "ALT",
        }
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated `<PREFIX><YYYYMMDDHHMMSSmmm>` identifier.
///
/// Once constructed the identifier is guaranteed to be well formed. Identifiers order by
/// prefix and then by timestamp, which for one prefix is also the order of issue.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    prefix: IdPrefix,
    timestamp: DateTime<Utc>,
}

impl RecordId {
    /// Returns the entity prefix of this identifier.
    pub fn prefix(&self) -> IdPrefix {
        self.prefix
    }

    /// Returns the moment encoded in this identifier (millisecond precision).
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Generate an identifier for `prefix` as if the clock read `now`.
    ///
    /// `now` is truncated to whole milliseconds. If `last` is provided and `now` is not
    /// strictly after it, the timestamp becomes `last + 1ms`.
    pub fn generate_at(prefix: IdPrefix, now: DateTime<Utc>, last: Option<&RecordId>) -> Self {
        let now = DateTime::<Utc>::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

        let timestamp = match last {
            Some(prev) if now <= prev.timestamp => prev.timestamp + Duration::milliseconds(1),
            _ => now,
        };

        Self { prefix, timestamp }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.prefix,
            self.timestamp.format("%Y%m%d%H%M%S%3f")
        )
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> IdResult<Self> {
        let (prefix, digits) = IdPrefix::ALL
            .iter()
            .find_map(|p| s.strip_prefix(p.as_str()).map(|rest| (*p, rest)))
            .ok_or_else(|| IdError::InvalidInput(format!("Unknown identifier prefix: '{}'", s)))?;

        if digits.len() != STAMP_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::InvalidInput(format!(
                "Identifier must be the prefix followed by {} digits: '{}'",
                STAMP_DIGITS, s
            )));
        }

        let (seconds, millis) = digits.split_at(14);
        let naive = NaiveDateTime::parse_from_str(seconds, STAMP_FORMAT).map_err(|e| {
            IdError::InvalidInput(format!("Invalid timestamp in '{}': {}", s, e))
        })?;
        let millis: i64 = millis
            .parse()
            .map_err(|e| IdError::InvalidInput(format!("Invalid milliseconds in '{}': {}", s, e)))?;

        let timestamp = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)
            + Duration::milliseconds(millis);

        Ok(Self { prefix, timestamp })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Tracks the last identifier issued per prefix so that new ones are strictly increasing.
#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
    last: BTreeMap<IdPrefix, RecordId>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identifier that already exists (for example one loaded from storage).
    pub fn observe(&mut self, id: &RecordId) {
        match self.last.get(&id.prefix) {
            Some(current) if current >= id => {}
            _ => {
                self.last.insert(id.prefix, id.clone());
            }
        }
    }

    /// The most recent identifier issued or observed for `prefix`.
    pub fn last(&self, prefix: IdPrefix) -> Option<&RecordId> {
        self.last.get(&prefix)
    }

    /// Issue the next identifier for `prefix` using the current clock.
    pub fn next(&mut self, prefix: IdPrefix) -> RecordId {
        self.next_at(prefix, Utc::now())
    }

    /// Issue the next identifier for `prefix` as if the clock read `now`.
    pub fn next_at(&mut self, prefix: IdPrefix, now: DateTime<Utc>) -> RecordId {
        let id = RecordId::generate_at(prefix, now, self.last.get(&prefix));
        self.last.insert(prefix, id.clone());
        id
    }
}
