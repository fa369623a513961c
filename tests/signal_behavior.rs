//! Behaviour tests for the trade-signal generator.

use tradepilot_core::{OracleError, PredictorError};
use tradepilot_strategies::{
    SignalAction, SignalConfig, SignalGenerator, StrategyError, StrategyErrorKind,
};
use tradepilot_tests::{asset, Arc, FixedPredictor, ScriptedOracle};

fn generator(
    current: f64,
    predicted: f64,
    buy: f64,
    sell: f64,
) -> (SignalGenerator, Arc<ScriptedOracle>, Arc<FixedPredictor>) {
    let oracle = Arc::new(ScriptedOracle::prices(&[current]));
    let predictor = Arc::new(FixedPredictor::new(predicted));
    let config = SignalConfig::new(asset("bitcoin"), buy, sell).expect("valid thresholds");
    let generator = SignalGenerator::new(config, oracle.clone(), predictor.clone());
    (generator, oracle, predictor)
}

// =============================================================================
// Classification
// =============================================================================

#[tokio::test]
async fn predicted_rise_above_sell_threshold_is_a_sell() {
    // Given: spot 100, forecast 105, thresholds buy 2% / sell 3%
    let (generator, _, _) = generator(100.0, 105.0, 0.02, 0.03);

    // When: the signal is evaluated
    let signal = generator.evaluate(&asset("bitcoin")).await.expect("signal");

    // Then: a 5% rise is a SELL with confidence 5
    assert_eq!(signal.action, SignalAction::Sell);
    assert!((signal.predicted_change_ratio - 0.05).abs() < 1e-12);
    assert!((signal.confidence - 5.0).abs() < 1e-9);
    assert_eq!(signal.current_price, 100.0);
    assert_eq!(signal.predicted_price, 105.0);
}

#[tokio::test]
async fn drop_exactly_at_buy_threshold_is_a_buy() {
    let (generator, _, _) = generator(100.0, 98.0, 0.02, 0.03);

    let signal = generator.evaluate(&asset("bitcoin")).await.expect("signal");

    assert_eq!(signal.action, SignalAction::Buy);
    assert!((signal.confidence - 2.0).abs() < 1e-9);
}

#[tokio::test]
async fn small_moves_hold_with_zero_confidence() {
    let (generator, _, _) = generator(100.0, 100.5, 0.02, 0.03);

    let signal = generator.evaluate(&asset("bitcoin")).await.expect("signal");

    assert_eq!(signal.action, SignalAction::Hold);
    assert_eq!(signal.confidence, 0.0);
}

#[tokio::test]
async fn identical_inputs_give_identical_signals() {
    let (first, _, _) = generator(250.0, 240.0, 0.01, 0.01);
    let (second, _, _) = generator(250.0, 240.0, 0.01, 0.01);

    let a = first.evaluate(&asset("bitcoin")).await.expect("signal");
    let b = second.evaluate(&asset("bitcoin")).await.expect("signal");

    assert_eq!(a.action, b.action);
    assert_eq!(a.confidence, b.confidence);
    assert_eq!(a.predicted_change_ratio, b.predicted_change_ratio);
}

#[tokio::test]
async fn zero_thresholds_resolve_a_flat_forecast_to_sell() {
    let (generator, _, _) = generator(100.0, 100.0, 0.0, 0.0);

    let signal = generator.evaluate(&asset("bitcoin")).await.expect("signal");

    assert_eq!(signal.action, SignalAction::Sell);
    assert_eq!(signal.confidence, 0.0);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn zero_spot_price_never_divides() {
    // Given: an oracle reporting a zero price
    let (generator, _, predictor) = generator(0.0, 10.0, 0.02, 0.03);

    // When: the signal is evaluated
    let error = generator.evaluate(&asset("bitcoin")).await.expect_err("must fail");

    // Then: evaluation stops before the predictor is consulted
    assert_eq!(error.kind(), StrategyErrorKind::InvalidPrice);
    assert_eq!(predictor.calls(), 0);
    assert_eq!(generator.last_prediction(), None);
}

#[tokio::test]
async fn oracle_failure_is_oracle_unavailable() {
    let oracle = Arc::new(ScriptedOracle::failing(OracleError::rate_limited("429")));
    let predictor = Arc::new(FixedPredictor::new(1.0));
    let config = SignalConfig::new(asset("bitcoin"), 0.02, 0.03).expect("config");
    let generator = SignalGenerator::new(config, oracle, predictor);

    let error = generator.evaluate(&asset("bitcoin")).await.expect_err("must fail");

    assert!(matches!(error, StrategyError::OracleUnavailable(_)));
    assert_eq!(error.code(), "strategy.oracle_unavailable");
}

#[tokio::test]
async fn predictor_failure_is_predictor_unavailable() {
    let oracle = Arc::new(ScriptedOracle::prices(&[100.0]));
    let predictor = Arc::new(FixedPredictor::failing(PredictorError::model("diverged")));
    let config = SignalConfig::new(asset("bitcoin"), 0.02, 0.03).expect("config");
    let generator = SignalGenerator::new(config, oracle, predictor);

    let error = generator.evaluate(&asset("bitcoin")).await.expect_err("must fail");

    assert_eq!(error.kind(), StrategyErrorKind::PredictorUnavailable);
    assert_eq!(generator.last_prediction(), None);
}

#[tokio::test]
async fn last_prediction_tracks_the_latest_successful_forecast() {
    let (generator, oracle, _) = generator(100.0, 104.0, 0.02, 0.03);

    generator.evaluate(&asset("bitcoin")).await.expect("signal");

    assert_eq!(generator.last_prediction(), Some(104.0));
    assert_eq!(oracle.calls(), 1);
}

#[tokio::test]
async fn other_assets_are_rejected_before_any_call() {
    let (generator, oracle, predictor) = generator(100.0, 104.0, 0.02, 0.03);

    let error = generator.evaluate(&asset("ethereum")).await.expect_err("must fail");

    assert_eq!(error.kind(), StrategyErrorKind::AssetMismatch);
    assert!(error.is_client_error());
    assert_eq!(oracle.calls(), 0);
    assert_eq!(predictor.calls(), 0);
}

#[test]
fn negative_thresholds_are_invalid_configuration() {
    let error = SignalConfig::new(asset("bitcoin"), -0.01, 0.03).expect_err("must fail");
    assert_eq!(error.kind(), StrategyErrorKind::InvalidConfiguration);
}
