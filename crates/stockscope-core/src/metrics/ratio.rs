//! Elementwise division with an explicit missing-value policy.

use crate::ValidationError;

/// Divides two optional values.
///
/// Missing or NaN operands give `None`. Division by zero is not guarded:
/// `x / 0.0` keeps its IEEE infinity, while `0.0 / 0.0` is NaN and therefore
/// reported as missing.
pub fn ratio_of(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) => Some(n / d).filter(|value| !value.is_nan()),
        _ => None,
    }
}

/// Applies [`ratio_of`] position by position. Both columns must be the same length.
pub fn ratio(
    numerator: &[Option<f64>],
    denominator: &[Option<f64>],
) -> Result<Vec<Option<f64>>, ValidationError> {
    if numerator.len() != denominator.len() {
        return Err(ValidationError::ColumnLengthMismatch {
            numerator: numerator.len(),
            denominator: denominator.len(),
        });
    }

    Ok(numerator
        .iter()
        .zip(denominator)
        .map(|(n, d)| ratio_of(*n, *d))
        .collect())
}
