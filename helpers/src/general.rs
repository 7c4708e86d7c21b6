use std::cmp::Ordering;
use thiserror::Error;

/// InputValueError is used if some simulation option or tuning constant does not fulfill the
/// posed requirements, e.g., a non-positive realtime factor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputValueError {
    #[error("Invalid input value: {name} must be positive (got {value})")]
    NotPositive { name: &'static str, value: f64 },
    #[error("Invalid input value: {name} must lie in [{min}, {max}] (got {value})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// check_positive returns an error if value is not strictly positive (NaN is rejected as well).
pub fn check_positive(name: &'static str, value: f64) -> Result<(), InputValueError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(InputValueError::NotPositive { name, value })
    }
}

/// check_range returns an error if value lies outside the closed interval [min, max].
pub fn check_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), InputValueError> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(InputValueError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that would sort an array. The sort is stable, i.e. equal values
/// keep their original order. Incomparable values (NaN) are treated as equal.
pub fn argsort<T: PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let cmp = |a: &T, b: &T| a.partial_cmp(b).unwrap_or(Ordering::Equal);
    let mut indices: Vec<usize> = (0..x.len()).collect();
    match order {
        SortOrder::Ascending => indices.sort_by(|&a, &b| cmp(&x[a], &x[b])),
        SortOrder::Descending => indices.sort_by(|&a, &b| cmp(&x[b], &x[a])),
    }
    indices
}
