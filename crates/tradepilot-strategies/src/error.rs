use thiserror::Error;

use tradepilot_core::{AssetSymbol, OracleError, PredictorError, ValidationError};

/// Failure kinds surfaced by strategy operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyErrorKind {
    OracleUnavailable,
    InvalidPrice,
    PredictorUnavailable,
    InvalidConfiguration,
    AssetMismatch,
}

impl StrategyErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OracleUnavailable => "OracleUnavailable",
            Self::InvalidPrice => "InvalidPrice",
            Self::PredictorUnavailable => "PredictorUnavailable",
            Self::InvalidConfiguration => "InvalidConfiguration",
            Self::AssetMismatch => "AssetMismatch",
        }
    }
}

/// Strategy error. Operations that return it leave no observable state change.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyError {
    #[error("price oracle unavailable: {0}")]
    OracleUnavailable(#[from] OracleError),

    #[error("unusable price {price} for '{asset}'")]
    InvalidPrice { asset: AssetSymbol, price: f64 },

    #[error("price predictor unavailable: {0}")]
    PredictorUnavailable(#[from] PredictorError),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ValidationError),

    #[error("asset '{requested}' does not match configured asset '{configured}'")]
    AssetMismatch {
        configured: AssetSymbol,
        requested: AssetSymbol,
    },
}

impl StrategyError {
    pub const fn kind(&self) -> StrategyErrorKind {
        match self {
            Self::OracleUnavailable(_) => StrategyErrorKind::OracleUnavailable,
            Self::InvalidPrice { .. } => StrategyErrorKind::InvalidPrice,
            Self::PredictorUnavailable(_) => StrategyErrorKind::PredictorUnavailable,
            Self::InvalidConfiguration(_) => StrategyErrorKind::InvalidConfiguration,
            Self::AssetMismatch { .. } => StrategyErrorKind::AssetMismatch,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            StrategyErrorKind::OracleUnavailable => "strategy.oracle_unavailable",
            StrategyErrorKind::InvalidPrice => "strategy.invalid_price",
            StrategyErrorKind::PredictorUnavailable => "strategy.predictor_unavailable",
            StrategyErrorKind::InvalidConfiguration => "strategy.invalid_configuration",
            StrategyErrorKind::AssetMismatch => "strategy.asset_mismatch",
        }
    }

    /// Whether the caller, not an upstream collaborator, is at fault.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            StrategyErrorKind::InvalidConfiguration | StrategyErrorKind::AssetMismatch
        )
    }
}
