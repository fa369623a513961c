//! # Tradepilot Core
//!
//! Domain types and collaborator contracts shared by the tradepilot
//! strategy and orchestration crates.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Price sources (CoinGecko-compatible REST, static table) |
//! | [`cache`] | TTL cache for upstream responses |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`domain`] | `AssetSymbol`, `QuoteCurrency`, `UtcDateTime` |
//! | [`error`] | Validation and core errors |
//! | [`http_client`] | HTTP transport seam |
//! | [`oracle`] | `PriceOracle` / `PriceHistory` contracts and `OracleError` |
//! | [`predictor`] | `PricePredictor` contract and windowed dense-network predictor |
//! | [`retry`] | Retry policy with exponential backoff |
//! | [`throttling`] | Client-side request budget |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │ Investment Ledger    │      │ Signal Generator     │
//! └──────────┬───────────┘      └───────┬───────┬──────┘
//!            │ spot_price               │       │ forecast
//!            ▼                          ▼       ▼
//! ┌──────────────────────────────────────┐ ┌──────────────────────┐
//! │ PriceOracle (CoinGecko / Static)     │◀│ WindowedNetwork      │
//! │  circuit breaker · retry · cache     │ │ Predictor (history)  │
//! └──────────────────┬───────────────────┘ └──────────────────────┘
//!                    ▼
//!             HttpClient (reqwest)
//! ```

pub mod adapters;
pub mod cache;
pub mod circuit_breaker;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod oracle;
pub mod predictor;
pub mod retry;
pub mod throttling;

pub use adapters::{CoinGeckoConfig, CoinGeckoOracle, StaticPriceOracle};
pub use cache::ResponseCache;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use domain::{AssetSymbol, QuoteCurrency, UtcDateTime};
pub use error::{CoreError, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use oracle::{OracleError, OracleErrorKind, OracleFuture, PriceHistory, PriceOracle};
pub use predictor::{
    Activation, DenseLayer, DenseNetwork, PredictorError, PredictorErrorKind, PredictorFuture,
    PricePredictor, WindowedNetworkPredictor,
};
pub use retry::{Backoff, RetryPolicy};
pub use throttling::RequestBudget;
