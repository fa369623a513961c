use tracing::warn;

use tradepilot_core::{AssetSymbol, PriceOracle};

use crate::StrategyError;

/// Fetches a spot price and rejects anything not strictly positive and finite.
pub(crate) async fn usable_spot_price(
    oracle: &dyn PriceOracle,
    asset: &AssetSymbol,
) -> Result<f64, StrategyError> {
    let price = oracle.spot_price(asset).await.map_err(|error| {
        warn!(%asset, code = error.code(), "price oracle call failed");
        StrategyError::OracleUnavailable(error)
    })?;

    if !price.is_finite() || price <= 0.0 {
        warn!(%asset, price, "price oracle returned an unusable price");
        return Err(StrategyError::InvalidPrice {
            asset: asset.clone(),
            price,
        });
    }
    Ok(price)
}
