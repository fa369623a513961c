//! Concrete price sources.
//!
//! | Adapter | Backing | Use |
//! |---------|---------|-----|
//! | [`CoinGeckoOracle`] | CoinGecko-compatible public REST API | production |
//! | [`StaticPriceOracle`] | in-memory price table | offline mode, demos, tests |

mod coingecko;
mod static_oracle;

pub use coingecko::{CoinGeckoConfig, CoinGeckoOracle};
pub use static_oracle::StaticPriceOracle;
