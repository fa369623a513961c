//! # Tradepilot Strategies
//!
//! The two pieces of business logic behind the trading agents:
//!
//! - [`ledger::InvestmentLedger`]: dollar-cost-averaging purchase log and
//!   performance summary (total invested, units held, weighted average
//!   cost, unrealized P/L).
//! - [`signal::SignalGenerator`]: classifies a predicted price move into
//!   BUY / SELL / HOLD using independent buy and sell thresholds.
//!
//! Both take their [`tradepilot_core::PriceOracle`] (and, for signals, the
//! [`tradepilot_core::PricePredictor`]) as injected `Arc<dyn …>`
//! collaborators. Every operation either fully succeeds or leaves the
//! instance unchanged.

pub mod config;
pub mod error;
pub mod ledger;
mod pricing;
pub mod signal;

pub use config::{DcaConfig, SignalConfig};
pub use error::{StrategyError, StrategyErrorKind};
pub use ledger::{InvestmentLedger, PerformanceStatus, PerformanceSummary, PurchaseRecord};
pub use signal::{change_ratio, Signal, SignalAction, SignalGenerator, SignalThresholds};
