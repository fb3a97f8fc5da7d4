//! Error types for germinal-center operations.
//!
//! Every failure in the decision layer is fatal to the run that raised it:
//! bad configuration, an upstream computation handing us nonsense, or a
//! germline threshold that the candidate distribution can never meet.

use thiserror::Error;

/// Result type for germinal-center operations.
pub type Result<T> = std::result::Result<T, GcError>;

/// Errors that can occur while building or evaluating decision models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcError {
    /// Configuration errors, raised at construction time.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A negative antigen-capture ratio reached the division formula.
    #[error("Negative antigen capture ratio: {0}")]
    NegativeCaptureRatio(f64),

    /// Germline activation ran out of attempts before filling the repertoire.
    #[error(
        "Germline activation exhausted {attempts} attempts with {accepted}/{target} \
         germlines above affinity threshold {threshold}"
    )]
    GermlineExhausted {
        target: usize,
        threshold: f64,
        attempts: u64,
        accepted: usize,
    },

    /// Germline activation was asked to test candidates against no epitopes.
    #[error("Antigen pool is empty")]
    EmptyAntigenPool,

    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration text could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<std::io::Error> for GcError {
    fn from(e: std::io::Error) -> Self {
        GcError::Io(e.to_string())
    }
}

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid value.
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Out of range.
    #[error("{field} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Unknown enumerated type.
    #[error("Unknown {field}: {value} (expected one of: {expected})")]
    UnknownVariant {
        field: String,
        value: String,
        expected: String,
    },
}

// Convenience constructors
impl GcError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        GcError::Config(ConfigError::MissingField(field.into()))
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        GcError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GcError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }

    pub fn unknown_variant(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: &[&str],
    ) -> Self {
        GcError::Config(ConfigError::UnknownVariant {
            field: field.into(),
            value: value.into(),
            expected: expected.join(", "),
        })
    }

    /// Whether this error came from configuration validation.
    pub fn is_config(&self) -> bool {
        matches!(self, GcError::Config(_))
    }
}
