use thiserror::Error;

/// Validation and contract errors exposed by `tradepilot-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("asset symbol cannot be empty")]
    EmptyAssetSymbol,
    #[error("asset symbol length {len} exceeds max {max}")]
    AssetSymbolTooLong { len: usize, max: usize },
    #[error("asset symbol must start with an ASCII letter: '{ch}'")]
    AssetSymbolInvalidStart { ch: char },
    #[error("asset symbol contains invalid character '{ch}' at index {index}")]
    AssetSymbolInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("quote currency must be 3-5 lowercase ASCII letters: '{value}'")]
    InvalidQuoteCurrency { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be strictly positive")]
    NonPositiveValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("network must contain at least one layer")]
    EmptyNetwork,
    #[error("layer {layer} expects {expected} inputs but row {row} has {actual} weights")]
    LayerWidthMismatch {
        layer: usize,
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("layer {layer} has {neurons} neurons but {biases} biases")]
    BiasCountMismatch {
        layer: usize,
        neurons: usize,
        biases: usize,
    },
    #[error("network output layer must have exactly one neuron, found {neurons}")]
    OutputWidth { neurons: usize },
    #[error("prediction window must be at least 2 prices, got {window}")]
    WindowTooSmall { window: usize },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
