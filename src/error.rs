use thiserror::Error;

/// Errors raised while looking up or extrapolating dataset variables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WindError {
    /// No wind speed variable to extrapolate from
    #[error("Missing data: {0}")]
    MissingData(String),

    /// A named variable is absent from the dataset
    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    /// Dimension names or lengths that do not line up
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A dimension registered with two different lengths
    #[error("Dimension '{name}' has length {found}, expected {expected}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}
