//! Error taxonomy for the engine, split into the four categories named in
//! the specification: configuration, runtime-dimensional, persistence, and
//! invariant violations. Recoverable conditions return `Result`; conditions
//! the engine treats as internal invariants (e.g. an empty match set that
//! covering should have prevented) panic instead rather than surfacing as
//! an error variant here.

use thiserror::Error;

/// Errors raised while building or validating a [`crate::params::Parameters`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must lie in [0, 1], got {value}")]
    NotAProbability { field: &'static str, value: f64 },

    #[error("{field} must be >= {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        value: f64,
        min: f64,
    },

    #[error("x_dim, y_dim and n_actions must all be positive (got x_dim={x_dim}, y_dim={y_dim}, n_actions={n_actions})")]
    ZeroDimension {
        x_dim: usize,
        y_dim: usize,
        n_actions: usize,
    },

    #[error("builder field not set: {0}")]
    UninitializedField(&'static str),
}

impl From<derive_builder::UninitializedFieldError> for ConfigError {
    fn from(e: derive_builder::UninitializedFieldError) -> Self {
        ConfigError::UninitializedField(e.field_name())
    }
}

/// Errors raised when an input's shape doesn't match the configured
/// dimensionality (`x_dim`, `y_dim`, `n_actions`).
#[derive(Debug, Error, PartialEq)]
pub enum DimensionError {
    #[error("expected input of length {expected}, got {actual}")]
    InputShape { expected: usize, actual: usize },

    #[error("expected target of length {expected}, got {actual}")]
    TargetShape { expected: usize, actual: usize },

    #[error("action {action} out of range, n_actions = {n_actions}")]
    ActionOutOfRange { action: usize, n_actions: usize },

    #[error("prediction array has no viable action (all entries NaN or unset)")]
    EmptyPredictionArray,
}

/// Errors raised while reading or writing a binary snapshot.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad magic bytes: expected {expected:?}, found {found:?}")]
    BadMagic { expected: [u8; 4], found: [u8; 4] },

    #[error("unsupported snapshot version {found}, this build supports {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("unknown variant tag {0} while decoding {1}")]
    UnknownTag(u8, &'static str),

    #[error("snapshot is internally inconsistent: {0}")]
    Corrupt(String),
}

/// Top-level error type returned from the public engine surface.
#[derive(Debug, Error)]
pub enum XcsfError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dimension(#[from] DimensionError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

pub type XcsfResult<T> = Result<T, XcsfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_from_conversion() {
        let e: XcsfError = ConfigError::NotPositive {
            field: "alpha",
            value: -1.0,
        }
        .into();
        assert!(matches!(e, XcsfError::Config(_)));
    }

    #[test]
    fn dimension_error_message() {
        let e = DimensionError::InputShape {
            expected: 4,
            actual: 3,
        };
        assert_eq!(e.to_string(), "expected input of length 4, got 3");
    }
}
