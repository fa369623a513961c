//! Price forecasting contract and the windowed dense-network predictor.
//!
//! Strategies only see [`PricePredictor`]: a point forecast at a horizon the
//! predictor decides. [`WindowedNetworkPredictor`] is the bundled
//! implementation; it scales the last `window` daily closes to `[0, 1]`, runs
//! a forward pass through a [`DenseNetwork`], and maps the output back to
//! price space. Weights are supplied (JSON file or
//! [`DenseNetwork::moving_average`]); no training happens here.

mod network;
mod windowed;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

pub use network::{Activation, DenseLayer, DenseNetwork};
pub use windowed::{WindowedNetworkPredictor, DEFAULT_WINDOW};

use crate::oracle::OracleError;
use crate::AssetSymbol;

pub type PredictorFuture<'a> = Pin<Box<dyn Future<Output = Result<f64, PredictorError>> + Send + 'a>>;

/// Predictor-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorErrorKind {
    InsufficientHistory,
    Upstream,
    Model,
}

/// Structured predictor error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictorError {
    kind: PredictorErrorKind,
    message: String,
}

impl PredictorError {
    pub fn insufficient_history(asset: &AssetSymbol, needed: usize, got: usize) -> Self {
        Self {
            kind: PredictorErrorKind::InsufficientHistory,
            message: format!("forecast for '{asset}' needs {needed} daily closes, got {got}"),
        }
    }

    pub fn upstream(error: &OracleError) -> Self {
        Self {
            kind: PredictorErrorKind::Upstream,
            message: format!("price history unavailable: {error}"),
        }
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self {
            kind: PredictorErrorKind::Model,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> PredictorErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            PredictorErrorKind::InsufficientHistory => "predictor.insufficient_history",
            PredictorErrorKind::Upstream => "predictor.upstream",
            PredictorErrorKind::Model => "predictor.model",
        }
    }
}

impl Display for PredictorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for PredictorError {}

/// Point forecast source.
pub trait PricePredictor: Send + Sync {
    /// Forecast price of `asset` at the predictor's own horizon.
    fn forecast<'a>(&'a self, asset: &'a AssetSymbol) -> PredictorFuture<'a>;
}
