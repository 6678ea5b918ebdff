use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::ValidationError;

/// Wall-clock market timestamp without a zone.
///
/// The zone (if any) lives on the owning [`DatedSeries`](crate::DatedSeries)
/// so that every key of a series shares one convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarketDate(PrimitiveDateTime);

impl MarketDate {
    pub const fn new(value: PrimitiveDateTime) -> Self {
        Self(value)
    }

    pub const fn from_date(date: Date) -> Self {
        Self(PrimitiveDateTime::new(date, Time::MIDNIGHT))
    }

    /// Parses `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if let Ok(value) = PrimitiveDateTime::parse(
            trimmed,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        ) {
            return Ok(Self(value));
        }

        Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
            .map(Self::from_date)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    /// Converts a unix timestamp to the wall clock observed at `offset`.
    pub fn from_unix_at_offset(seconds: i64, offset: UtcOffset) -> Result<Self, ValidationError> {
        let instant = OffsetDateTime::from_unix_timestamp(seconds).map_err(|_| {
            ValidationError::InvalidDate {
                value: seconds.to_string(),
            }
        })?;
        let local = instant.to_offset(offset);
        Ok(Self(PrimitiveDateTime::new(local.date(), local.time())))
    }

    pub const fn date(self) -> Date {
        self.0.date()
    }

    /// Same calendar day at midnight.
    pub const fn at_midnight(self) -> Self {
        Self::from_date(self.0.date())
    }

    pub const fn into_inner(self) -> PrimitiveDateTime {
        self.0
    }
}

impl Display for MarketDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let date = self.0.date();
        write!(
            f,
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        )?;

        let time = self.0.time();
        if time != Time::MIDNIGHT {
            write!(
                f,
                "T{:02}:{:02}:{:02}",
                time.hour(),
                time.minute(),
                time.second()
            )?;
        }
        Ok(())
    }
}

impl Serialize for MarketDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MarketDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// RFC3339 timestamp guaranteed to be UTC, used for envelope metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        OffsetDateTime::parse(input, &Rfc3339)
            .ok()
            .filter(|value| value.offset() == UtcOffset::UTC)
            .map(Self)
            .ok_or_else(|| ValidationError::TimestampNotUtc {
                value: input.to_owned(),
            })
    }

    pub const fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
