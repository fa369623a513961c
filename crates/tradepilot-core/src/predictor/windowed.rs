use std::sync::Arc;

use tracing::debug;

use super::{DenseNetwork, PredictorError, PredictorFuture, PricePredictor};
use crate::oracle::PriceHistory;
use crate::{AssetSymbol, ValidationError};

/// Default look-back: two weeks of daily closes.
pub const DEFAULT_WINDOW: usize = 14;

/// Forecasts the next close from the last `window` daily closes.
pub struct WindowedNetworkPredictor {
    history: Arc<dyn PriceHistory>,
    network: DenseNetwork,
}

impl WindowedNetworkPredictor {
    pub fn new(history: Arc<dyn PriceHistory>, network: DenseNetwork) -> Self {
        Self { history, network }
    }

    /// Predictor using [`DenseNetwork::moving_average`] over `window` closes.
    pub fn moving_average(
        history: Arc<dyn PriceHistory>,
        window: usize,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(history, DenseNetwork::moving_average(window)?))
    }

    pub fn window(&self) -> usize {
        self.network.input_width()
    }

    /// Scales `closes` to `[0, 1]`, runs the network, and rescales the output.
    pub fn predict_from_closes(&self, closes: &[f64]) -> Result<f64, PredictorError> {
        if closes.iter().any(|close| !close.is_finite()) {
            return Err(PredictorError::model("price window contains non-finite closes"));
        }

        let (min, max) = closes
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &close| {
                (lo.min(close), hi.max(close))
            });
        let last = closes
            .last()
            .copied()
            .ok_or_else(|| PredictorError::model("price window is empty"))?;

        let range = max - min;
        if range <= f64::EPSILON * max.abs().max(1.0) {
            return Ok(last);
        }

        let scaled: Vec<f64> = closes.iter().map(|close| (close - min) / range).collect();
        let output = self.network.forward(&scaled).ok_or_else(|| {
            PredictorError::model(format!(
                "network expects {} inputs, window has {}",
                self.network.input_width(),
                scaled.len()
            ))
        })?;

        let predicted = min + output * range;
        if !predicted.is_finite() {
            return Err(PredictorError::model("network produced a non-finite forecast"));
        }
        Ok(predicted)
    }
}

impl PricePredictor for WindowedNetworkPredictor {
    fn forecast<'a>(&'a self, asset: &'a AssetSymbol) -> PredictorFuture<'a> {
        Box::pin(async move {
            let window = self.window();
            let closes = self
                .history
                .daily_closes(asset, window)
                .await
                .map_err(|error| PredictorError::upstream(&error))?;

            if closes.len() < window {
                return Err(PredictorError::insufficient_history(
                    asset,
                    window,
                    closes.len(),
                ));
            }

            let recent = &closes[closes.len() - window..];
            let predicted = self.predict_from_closes(recent)?;
            debug!(%asset, window, predicted, "price forecast produced");
            Ok(predicted)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{OracleError, OracleFuture};
    use crate::predictor::PredictorErrorKind;

    struct FixedHistory(Result<Vec<f64>, OracleError>);

    impl PriceHistory for FixedHistory {
        fn daily_closes<'a>(
            &'a self,
            _asset: &'a AssetSymbol,
            _days: usize,
        ) -> OracleFuture<'a, Vec<f64>> {
            let result = self.0.clone();
            Box::pin(async move { result })
        }
    }

    fn asset() -> AssetSymbol {
        AssetSymbol::parse("bitcoin").expect("asset")
    }

    fn predictor(closes: Result<Vec<f64>, OracleError>, window: usize) -> WindowedNetworkPredictor {
        WindowedNetworkPredictor::moving_average(Arc::new(FixedHistory(closes)), window)
            .expect("valid window")
    }

    #[tokio::test]
    async fn moving_average_forecasts_window_mean() {
        let predictor = predictor(Ok(vec![10.0, 20.0, 30.0, 40.0]), 4);
        let forecast = predictor.forecast(&asset()).await.expect("forecast");
        assert!((forecast - 25.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn uses_only_most_recent_window() {
        let predictor = predictor(Ok(vec![1_000.0, 10.0, 20.0]), 2);
        let forecast = predictor.forecast(&asset()).await.expect("forecast");
        assert!((forecast - 15.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn flat_window_returns_last_price() {
        let predictor = predictor(Ok(vec![50.0; 14]), DEFAULT_WINDOW);
        assert_eq!(predictor.forecast(&asset()).await.expect("forecast"), 50.0);
    }

    #[tokio::test]
    async fn short_history_is_rejected() {
        let predictor = predictor(Ok(vec![1.0, 2.0]), 5);
        let error = predictor.forecast(&asset()).await.expect_err("must fail");
        assert_eq!(error.kind(), PredictorErrorKind::InsufficientHistory);
        assert!(error.message().contains("needs 5"));
    }

    #[tokio::test]
    async fn history_failures_surface_as_upstream() {
        let predictor = predictor(Err(OracleError::unavailable("down")), 3);
        let error = predictor.forecast(&asset()).await.expect_err("must fail");
        assert_eq!(error.kind(), PredictorErrorKind::Upstream);
        assert_eq!(error.code(), "predictor.upstream");
    }
}
