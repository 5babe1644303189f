//! Error taxonomy for simulation setup.
//!
//! Every check runs before the daily loop starts; once a run is underway the
//! recurrence is total and numeric edge cases are handled by documented
//! clamping rules instead of errors.

/// Errors raised while validating configuration, inputs and reference tables.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A configuration value is missing, inconsistent or out of range.
    #[error("invalid configuration `{key}`: {reason}")]
    Configuration { key: String, reason: String },

    /// An input series or table does not line up with the simulation horizon.
    #[error("series `{series}` has {actual} entries, expected {expected}")]
    DataAlignment {
        series: String,
        expected: usize,
        actual: usize,
    },

    /// A value lies outside the domain covered by a lookup table.
    #[error("{what} = {value} is outside [{min}, {max}]")]
    NumericDomain {
        what: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A selectable policy has no defined behaviour and cannot be run.
    #[error("policy `{policy}` is not implemented")]
    UnimplementedPolicy { policy: String },

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::Configuration {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn alignment(series: impl Into<String>, expected: usize, actual: usize) -> Self {
        SimError::DataAlignment {
            series: series.into(),
            expected,
            actual,
        }
    }

    pub(crate) fn domain(what: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        SimError::NumericDomain {
            what: what.into(),
            value,
            min,
            max,
        }
    }
}

/// Check that a series has exactly `expected` entries.
pub(crate) fn check_len<T>(series: &str, values: &[T], expected: usize) -> SimResult<()> {
    if values.len() != expected {
        return Err(SimError::alignment(series, expected, values.len()));
    }
    Ok(())
}

/// Check that a numeric series contains no NaN or infinite values.
pub(crate) fn check_finite(series: &str, values: &[f64]) -> SimResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(row) => Err(SimError::config(
            series,
            format!("non-finite value at row {row}"),
        )),
        None => Ok(()),
    }
}
