use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DATE_TIME_SERVER_FULL: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

// Tried in order; first match wins. %3f (unlike %.3f) refuses a missing
// fraction, matching the backend's fixed-width patterns.
const DECODE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S.%3fZ",
    "%Y-%m-%d %H:%M:%S.%3f",
    "%Y-%m-%d %H:%M:%S.%6f",
];

const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

const TIME_ONLY_FORMAT: &str = "%H:%M:%S";

// Date-only strings decode to midnight; time-only strings attach to the
// fixed reference date of 2000-01-01.
pub fn parse_server_date_time(text: &str) -> Option<NaiveDateTime> {
    for format in DECODE_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
            return Some(value);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_ONLY_FORMAT) {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(time) = NaiveTime::parse_from_str(text, TIME_ONLY_FORMAT) {
        return Some(reference_date().and_time(time));
    }
    None
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

// Naive on purpose: the wire formats carry no zone and the backend
// treats every timestamp as UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerDateTime(NaiveDateTime);

impl ServerDateTime {
    pub const fn new(inner: NaiveDateTime) -> Self {
        Self(inner)
    }

    pub fn parse(text: &str) -> Option<Self> {
        parse_server_date_time(text).map(Self)
    }

    pub const fn into_inner(self) -> NaiveDateTime {
        self.0
    }
}

impl From<NaiveDateTime> for ServerDateTime {
    fn from(inner: NaiveDateTime) -> Self {
        Self(inner)
    }
}

impl std::fmt::Display for ServerDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_TIME_SERVER_FULL))
    }
}

impl Serialize for ServerDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format(DATE_TIME_SERVER_FULL))
    }
}

impl<'de> Deserialize<'de> for ServerDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).ok_or_else(|| {
            D::Error::invalid_value(Unexpected::Str(&text), &"a server date-time string")
        })
    }
}

// `#[serde(with = "routex::server_date_format")]` for plain
// NaiveDateTime fields that follow the server's date conventions.
pub mod server_date_format {
    use chrono::NaiveDateTime;
    use serde::de::{Error as _, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{DATE_TIME_SERVER_FULL, parse_server_date_time};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(DATE_TIME_SERVER_FULL))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_server_date_time(&text).ok_or_else(|| {
            D::Error::invalid_value(Unexpected::Str(&text), &"a server date-time string")
        })
    }
}
