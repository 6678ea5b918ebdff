use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::UtcOffset;

use crate::{MarketDate, ValidationError};

/// One keyed observation of a [`DatedSeries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedValue<T> {
    pub date: MarketDate,
    pub value: T,
}

impl<T> DatedValue<T> {
    pub const fn new(date: MarketDate, value: T) -> Self {
        Self { date, value }
    }
}

/// Date-keyed series with strictly increasing keys.
///
/// `zone` is `None` for timezone-naive data. Keys are wall-clock values in
/// that zone; stripping the zone keeps them unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedSeries<T> {
    #[serde(rename = "zone_offset_seconds", serialize_with = "serialize_zone")]
    zone: Option<UtcOffset>,
    entries: Vec<DatedValue<T>>,
}

impl<T> DatedSeries<T> {
    /// Builds a series, ordering entries by date and rejecting duplicate keys.
    pub fn new(
        zone: Option<UtcOffset>,
        mut entries: Vec<DatedValue<T>>,
    ) -> Result<Self, ValidationError> {
        entries.sort_by_key(|entry| entry.date);
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(ValidationError::DuplicateDate {
                date: pair[0].date.to_string(),
            });
        }

        Ok(Self { zone, entries })
    }

    pub fn naive(entries: Vec<DatedValue<T>>) -> Result<Self, ValidationError> {
        Self::new(None, entries)
    }

    pub fn from_pairs(
        zone: Option<UtcOffset>,
        pairs: impl IntoIterator<Item = (MarketDate, T)>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            zone,
            pairs
                .into_iter()
                .map(|(date, value)| DatedValue::new(date, value))
                .collect(),
        )
    }

    pub const fn empty(zone: Option<UtcOffset>) -> Self {
        Self {
            zone,
            entries: Vec::new(),
        }
    }

    pub const fn zone(&self) -> Option<UtcOffset> {
        self.zone
    }

    pub const fn is_naive(&self) -> bool {
        self.zone.is_none()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DatedValue<T>] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DatedValue<T>> {
        self.entries
    }

    pub fn dates(&self) -> impl Iterator<Item = MarketDate> + '_ {
        self.entries.iter().map(|entry| entry.date)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|entry| &entry.value)
    }

    pub fn get(&self, date: MarketDate) -> Option<&T> {
        self.entries
            .binary_search_by_key(&date, |entry| entry.date)
            .ok()
            .map(|index| &self.entries[index].value)
    }

    pub fn first(&self) -> Option<&DatedValue<T>> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&DatedValue<T>> {
        self.entries.last()
    }

    /// Drops the zone annotation without converting the wall-clock keys.
    pub fn strip_timezone(self) -> Self {
        Self {
            zone: None,
            entries: self.entries,
        }
    }

    /// Applies `f` to every value, keeping keys and zone.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> DatedSeries<U> {
        DatedSeries {
            zone: self.zone,
            entries: self
                .entries
                .iter()
                .map(|entry| DatedValue::new(entry.date, f(&entry.value)))
                .collect(),
        }
    }

    /// Pairs the existing keys with `values`, which must have one item per entry.
    pub(crate) fn with_values<U>(&self, values: Vec<U>) -> DatedSeries<U> {
        debug_assert_eq!(values.len(), self.entries.len());
        DatedSeries {
            zone: self.zone,
            entries: self
                .entries
                .iter()
                .zip(values)
                .map(|(entry, value)| DatedValue::new(entry.date, value))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct RawDatedSeries<T> {
    #[serde(default)]
    zone_offset_seconds: Option<i32>,
    entries: Vec<DatedValue<T>>,
}

impl<'de, T> Deserialize<'de> for DatedSeries<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawDatedSeries::<T>::deserialize(deserializer)?;
        let zone = raw
            .zone_offset_seconds
            .map(UtcOffset::from_whole_seconds)
            .transpose()
            .map_err(D::Error::custom)?;
        Self::new(zone, raw.entries).map_err(D::Error::custom)
    }
}

fn serialize_zone<S>(zone: &Option<UtcOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match zone {
        Some(offset) => serializer.serialize_some(&offset.whole_seconds()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, offset};

    use super::*;

    fn day(value: time::Date) -> MarketDate {
        MarketDate::from_date(value)
    }

    #[test]
    fn orders_entries_by_date() {
        let series = DatedSeries::from_pairs(
            None,
            [(day(date!(2024-01-03)), 3.0), (day(date!(2024-01-01)), 1.0)],
        )
        .expect("valid series");

        let dates = series.dates().map(|d| d.to_string()).collect::<Vec<_>>();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-03"]);
        assert_eq!(series.get(day(date!(2024-01-03))), Some(&3.0));
        assert_eq!(series.get(day(date!(2024-01-02))), None);
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = DatedSeries::from_pairs(
            None,
            [(day(date!(2024-01-01)), 1.0), (day(date!(2024-01-01)), 2.0)],
        )
        .expect_err("duplicate must fail");
        assert!(matches!(err, ValidationError::DuplicateDate { .. }));
    }

    #[test]
    fn strip_timezone_keeps_wall_clock() {
        let series = DatedSeries::from_pairs(Some(offset!(-5)), [(day(date!(2024-01-02)), 10.0)])
            .expect("valid series");
        assert!(!series.is_naive());

        let naive = series.strip_timezone();
        assert!(naive.is_naive());
        assert_eq!(naive.first().map(|e| e.date), Some(day(date!(2024-01-02))));
    }

    #[test]
    fn serde_preserves_zone() {
        let series = DatedSeries::from_pairs(Some(offset!(+1)), [(day(date!(2024-03-01)), 2.5)])
            .expect("valid series");
        let json = serde_json::to_string(&series).expect("serialize");
        assert!(json.contains("\"zone_offset_seconds\":3600"));

        let back: DatedSeries<f64> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, series);
    }
}
