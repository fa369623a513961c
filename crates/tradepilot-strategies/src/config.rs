//! Immutable strategy configuration, validated at construction.

use serde::Serialize;

use tradepilot_core::{AssetSymbol, ValidationError};

use crate::StrategyError;

/// Configuration of one DCA strategy instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcaConfig {
    asset_symbol: AssetSymbol,
    fiat_amount_per_purchase: f64,
    frequency_label: String,
}

impl DcaConfig {
    /// `frequency_label` is stored verbatim and never interpreted here.
    pub fn new(
        asset_symbol: AssetSymbol,
        fiat_amount_per_purchase: f64,
        frequency_label: impl Into<String>,
    ) -> Result<Self, StrategyError> {
        const FIELD: &str = "fiat_amount_per_purchase";
        if !fiat_amount_per_purchase.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: FIELD }.into());
        }
        if fiat_amount_per_purchase <= 0.0 {
            return Err(ValidationError::NonPositiveValue { field: FIELD }.into());
        }

        Ok(Self {
            asset_symbol,
            fiat_amount_per_purchase,
            frequency_label: frequency_label.into(),
        })
    }

    pub fn asset_symbol(&self) -> &AssetSymbol {
        &self.asset_symbol
    }

    pub fn fiat_amount_per_purchase(&self) -> f64 {
        self.fiat_amount_per_purchase
    }

    pub fn frequency_label(&self) -> &str {
        &self.frequency_label
    }
}

/// Configuration of one signal generator instance.
///
/// Zero thresholds are accepted; see [`crate::signal::SignalThresholds::classify`]
/// for how ties resolve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalConfig {
    asset_symbol: AssetSymbol,
    buy_threshold_ratio: f64,
    sell_threshold_ratio: f64,
}

impl SignalConfig {
    pub fn new(
        asset_symbol: AssetSymbol,
        buy_threshold_ratio: f64,
        sell_threshold_ratio: f64,
    ) -> Result<Self, StrategyError> {
        validate_threshold("buy_threshold_ratio", buy_threshold_ratio)?;
        validate_threshold("sell_threshold_ratio", sell_threshold_ratio)?;

        Ok(Self {
            asset_symbol,
            buy_threshold_ratio,
            sell_threshold_ratio,
        })
    }

    pub fn asset_symbol(&self) -> &AssetSymbol {
        &self.asset_symbol
    }

    pub fn buy_threshold_ratio(&self) -> f64 {
        self.buy_threshold_ratio
    }

    pub fn sell_threshold_ratio(&self) -> f64 {
        self.sell_threshold_ratio
    }
}

fn validate_threshold(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
