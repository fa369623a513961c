//! Price oracle contracts.
//!
//! A [`PriceOracle`] answers "what is this asset worth right now" in a fixed
//! quote currency. A [`PriceHistory`] returns recent daily closes, which the
//! windowed predictor consumes. Both traits return boxed futures so they can
//! be used as `Arc<dyn …>` collaborators shared across strategy instances.
//!
//! # Example
//!
//! ```rust,ignore
//! use tradepilot_core::{AssetSymbol, PriceOracle, StaticPriceOracle};
//!
//! async fn show(oracle: &dyn PriceOracle) -> Result<(), Box<dyn std::error::Error>> {
//!     let asset = AssetSymbol::parse("bitcoin")?;
//!     let price = oracle.spot_price(&asset).await?;
//!     println!("{asset}: {price:.2}");
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::AssetSymbol;

/// Boxed future returned by collaborator traits.
pub type OracleFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, OracleError>> + Send + 'a>>;

/// Oracle-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleErrorKind {
    UnknownAsset,
    Unavailable,
    RateLimited,
    MalformedResponse,
}

/// Structured oracle error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleError {
    kind: OracleErrorKind,
    message: String,
    retryable: bool,
}

impl OracleError {
    pub fn unknown_asset(asset: &AssetSymbol) -> Self {
        Self {
            kind: OracleErrorKind::UnknownAsset,
            message: format!("asset '{asset}' is not known to the price oracle"),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: OracleErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: OracleErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: OracleErrorKind::MalformedResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> OracleErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            OracleErrorKind::UnknownAsset => "oracle.unknown_asset",
            OracleErrorKind::Unavailable => "oracle.unavailable",
            OracleErrorKind::RateLimited => "oracle.rate_limited",
            OracleErrorKind::MalformedResponse => "oracle.malformed_response",
        }
    }
}

impl Display for OracleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for OracleError {}

/// Spot price source.
///
/// Implementations must be `Send + Sync`; a single oracle is shared by every
/// strategy instance the orchestration layer creates.
pub trait PriceOracle: Send + Sync {
    /// Returns the current price of `asset` in the oracle's quote currency.
    ///
    /// The returned value is whatever the upstream reported. Callers decide
    /// whether a non-positive or non-finite price is usable.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] when the asset is unknown, the upstream is
    /// unreachable or rate limited, or its response cannot be parsed.
    fn spot_price<'a>(&'a self, asset: &'a AssetSymbol) -> OracleFuture<'a, f64>;
}

/// Daily close history source.
pub trait PriceHistory: Send + Sync {
    /// Returns up to `days` daily closes for `asset`, oldest first.
    fn daily_closes<'a>(&'a self, asset: &'a AssetSymbol, days: usize)
        -> OracleFuture<'a, Vec<f64>>;
}
