//! Forward-fill alignment of a sparse series onto a denser index.

use tracing::warn;

use crate::DatedSeries;

/// Reindexes `source` onto the keys of `target`.
///
/// Each target date receives the value of the latest source entry dated at
/// or before it; target dates preceding the first source entry are `None`.
/// Both series must share the same zone convention. A mismatch is reported
/// with a warning and produces an all-`None` column.
pub fn forward_fill<T, U>(
    target: &DatedSeries<U>,
    source: &DatedSeries<T>,
) -> DatedSeries<Option<T>>
where
    T: Clone,
{
    if target.zone() != source.zone() {
        warn!(
            target_zone = ?target.zone(),
            source_zone = ?source.zone(),
            "cannot align series with different zone conventions; strip zones first"
        );
        return target.map(|_| None);
    }

    let source_entries = source.entries();
    let mut cursor = 0usize;
    let mut current: Option<&T> = None;
    let mut values = Vec::with_capacity(target.len());

    for date in target.dates() {
        while cursor < source_entries.len() && source_entries[cursor].date <= date {
            current = Some(&source_entries[cursor].value);
            cursor += 1;
        }
        values.push(current.cloned());
    }

    target.with_values(values)
}
