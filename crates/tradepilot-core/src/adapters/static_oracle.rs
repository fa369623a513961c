use std::collections::HashMap;

use crate::oracle::{OracleError, OracleFuture, PriceHistory, PriceOracle};
use crate::AssetSymbol;

/// Fixed price table used for offline mode.
///
/// History is synthetic: a deterministic walk seeded from the asset id that
/// ends exactly at the configured spot price.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceOracle {
    prices: HashMap<AssetSymbol, f64>,
}

impl StaticPriceOracle {
    pub fn new(prices: impl IntoIterator<Item = (AssetSymbol, f64)>) -> Self {
        Self {
            prices: prices.into_iter().collect(),
        }
    }

    pub fn with_price(mut self, asset: AssetSymbol, price: f64) -> Self {
        self.prices.insert(asset, price);
        self
    }

    /// A small table of well-known coins for demos.
    pub fn demo() -> Self {
        [("bitcoin", 64_250.0), ("ethereum", 3_120.0), ("solana", 145.5)]
            .into_iter()
            .filter_map(|(id, price)| AssetSymbol::parse(id).ok().map(|asset| (asset, price)))
            .fold(Self::default(), |oracle, (asset, price)| {
                oracle.with_price(asset, price)
            })
    }

    pub fn assets(&self) -> impl Iterator<Item = &AssetSymbol> {
        self.prices.keys()
    }

    fn lookup(&self, asset: &AssetSymbol) -> Result<f64, OracleError> {
        self.prices
            .get(asset)
            .copied()
            .ok_or_else(|| OracleError::unknown_asset(asset))
    }
}

impl PriceOracle for StaticPriceOracle {
    fn spot_price<'a>(&'a self, asset: &'a AssetSymbol) -> OracleFuture<'a, f64> {
        let result = self.lookup(asset);
        Box::pin(async move { result })
    }
}

impl PriceHistory for StaticPriceOracle {
    fn daily_closes<'a>(
        &'a self,
        asset: &'a AssetSymbol,
        days: usize,
    ) -> OracleFuture<'a, Vec<f64>> {
        let result = self
            .lookup(asset)
            .map(|price| synthetic_closes(asset, price, days));
        Box::pin(async move { result })
    }
}

fn asset_seed(asset: &AssetSymbol) -> u64 {
    asset
        .as_str()
        .bytes()
        .fold(13_u64, |acc, byte| acc.wrapping_mul(29).wrapping_add(u64::from(byte)))
}

/// Closes within +/- 5% of `price`, oldest first, last one equal to `price`.
fn synthetic_closes(asset: &AssetSymbol, price: f64, days: usize) -> Vec<f64> {
    let seed = asset_seed(asset);
    (0..days)
        .map(|index| {
            let remaining = (days - index - 1) as u64;
            if remaining == 0 {
                return price;
            }
            let wobble = (seed.wrapping_add(remaining * 7) % 101) as f64 - 50.0;
            price * (1.0 + wobble / 1_000.0)
        })
        .collect()
}
