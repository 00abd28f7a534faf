use thiserror::Error;

/// Failures of the index arithmetic.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    #[error("series has no finite observation")]
    NoFiniteValue,
    #[error("insufficient history: {available} finite observations, {required} required")]
    InsufficientHistory { available: usize, required: usize },
    #[error("12-month window average is zero or not finite")]
    DegenerateWindow,
}

/// Configuration values that fail validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown source '{value}'")]
    InvalidSource { value: String },
    #[error("source list must name at least one provider")]
    EmptySourceList,
}

/// Failure to render a response payload.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
