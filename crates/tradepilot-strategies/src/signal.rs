//! Threshold-based BUY / SELL / HOLD classification of a predicted price move.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use tradepilot_core::{AssetSymbol, PricePredictor, PriceOracle, PredictorError, UtcDateTime};

use crate::config::SignalConfig;
use crate::pricing::usable_spot_price;
use crate::StrategyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

/// Recommendation produced by one [`SignalGenerator::evaluate`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub action: SignalAction,
    pub asset_symbol: AssetSymbol,
    pub current_price: f64,
    pub predicted_price: f64,
    pub predicted_change_ratio: f64,
    /// Percentage points; zero for HOLD.
    pub confidence: f64,
    pub generated_at: UtcDateTime,
}

/// Buy/sell trigger levels, as ratios of the current price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    pub buy_ratio: f64,
    pub sell_ratio: f64,
}

impl SignalThresholds {
    pub fn from_config(config: &SignalConfig) -> Self {
        Self {
            buy_ratio: config.buy_threshold_ratio(),
            sell_ratio: config.sell_threshold_ratio(),
        }
    }

    /// Maps a change ratio to an action and confidence.
    ///
    /// Rules are checked in order and both bounds are inclusive: SELL when
    /// `ratio >= sell_ratio`, then BUY when `ratio <= -buy_ratio`, else HOLD.
    /// With both thresholds at zero a ratio of exactly zero is a SELL.
    pub fn classify(&self, change_ratio: f64) -> (SignalAction, f64) {
        if change_ratio >= self.sell_ratio {
            (SignalAction::Sell, change_ratio.abs() * 100.0)
        } else if change_ratio <= -self.buy_ratio {
            (SignalAction::Buy, change_ratio.abs() * 100.0)
        } else {
            (SignalAction::Hold, 0.0)
        }
    }
}

/// Signed relative move from `current_price` to `predicted_price`.
///
/// `None` unless `current_price` is strictly positive and the result is finite.
pub fn change_ratio(current_price: f64, predicted_price: f64) -> Option<f64> {
    if !current_price.is_finite() || current_price <= 0.0 {
        return None;
    }
    let ratio = (predicted_price - current_price) / current_price;
    ratio.is_finite().then_some(ratio)
}

/// Single-asset signal generator.
pub struct SignalGenerator {
    config: SignalConfig,
    oracle: Arc<dyn PriceOracle>,
    predictor: Arc<dyn PricePredictor>,
    last_prediction: Mutex<Option<f64>>,
}

impl SignalGenerator {
    pub fn new(
        config: SignalConfig,
        oracle: Arc<dyn PriceOracle>,
        predictor: Arc<dyn PricePredictor>,
    ) -> Self {
        Self {
            config,
            oracle,
            predictor,
            last_prediction: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Most recent forecast seen by [`Self::evaluate`]. Informational only.
    pub fn last_prediction(&self) -> Option<f64> {
        *self
            .last_prediction
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches the spot price and a forecast, then classifies the move.
    ///
    /// # Errors
    ///
    /// - [`StrategyError::AssetMismatch`] if `asset` is not the configured asset
    /// - [`StrategyError::OracleUnavailable`] / [`StrategyError::InvalidPrice`]
    ///   for spot price failures, including a zero price
    /// - [`StrategyError::PredictorUnavailable`] if no usable forecast is produced
    pub async fn evaluate(&self, asset: &AssetSymbol) -> Result<Signal, StrategyError> {
        let configured = self.config.asset_symbol();
        if asset != configured {
            return Err(StrategyError::AssetMismatch {
                configured: configured.clone(),
                requested: asset.clone(),
            });
        }

        let current_price = usable_spot_price(self.oracle.as_ref(), asset).await?;
        let predicted_price = self.predictor.forecast(asset).await.map_err(|error| {
            warn!(%asset, code = error.code(), "price predictor call failed");
            StrategyError::PredictorUnavailable(error)
        })?;
        if !predicted_price.is_finite() || predicted_price < 0.0 {
            return Err(StrategyError::PredictorUnavailable(PredictorError::model(
                format!("forecast {predicted_price} for '{asset}' is not a usable price"),
            )));
        }

        let ratio = change_ratio(current_price, predicted_price).ok_or_else(|| {
            StrategyError::InvalidPrice {
                asset: asset.clone(),
                price: current_price,
            }
        })?;
        let (action, confidence) = SignalThresholds::from_config(&self.config).classify(ratio);

        *self
            .last_prediction
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(predicted_price);

        debug!(
            %asset,
            ?action,
            current_price,
            predicted_price,
            change_ratio = ratio,
            confidence,
            "signal evaluated"
        );

        Ok(Signal {
            action,
            asset_symbol: asset.clone(),
            current_price,
            predicted_price,
            predicted_change_ratio: ratio,
            confidence,
            generated_at: UtcDateTime::now(),
        })
    }
}
