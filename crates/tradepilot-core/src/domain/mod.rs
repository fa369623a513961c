//! # Domain Models
//!
//! Canonical value types shared by the oracle, predictor and strategy crates.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AssetSymbol`] | Validated, lower-cased asset identifier (`bitcoin`, `usd-coin`) |
//! | [`QuoteCurrency`] | Fiat currency prices are denominated in (`usd`) |
//! | [`UtcDateTime`] | RFC3339 timestamp guaranteed to be UTC |
//!
//! All types validate their invariants at construction time and serialize
//! as plain strings.

mod asset;
mod timestamp;

pub use asset::{AssetSymbol, QuoteCurrency};
pub use timestamp::UtcDateTime;
