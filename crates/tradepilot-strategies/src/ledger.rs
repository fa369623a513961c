//! Dollar-cost-averaging ledger: an append-only log of simulated purchases
//! and the performance figures derived from it.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use tradepilot_core::{AssetSymbol, PriceOracle, UtcDateTime};

use crate::config::DcaConfig;
use crate::pricing::usable_spot_price;
use crate::StrategyError;

/// One simulated purchase. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRecord {
    pub occurred_at: UtcDateTime,
    pub asset_symbol: AssetSymbol,
    pub fiat_amount: f64,
    pub unit_price: f64,
    pub units_acquired: f64,
    pub recorded_at: UtcDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceStatus {
    NoInvestments,
    Profitable,
    AtLoss,
}

/// Aggregates over the full ledger, valued at the current spot price.
///
/// `average_unit_cost` is `total_invested / total_units`, the cost basis
/// weighted by amount invested, not the simple mean of purchase prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub asset_symbol: AssetSymbol,
    pub status: PerformanceStatus,
    pub number_of_investments: usize,
    pub total_invested: f64,
    pub total_units: f64,
    pub average_unit_cost: f64,
    pub current_price: f64,
    pub current_value: f64,
    pub unrealized_pl: f64,
    pub unrealized_pl_ratio: f64,
    pub first_investment_at: Option<UtcDateTime>,
    pub last_investment_at: Option<UtcDateTime>,
}

impl PerformanceSummary {
    fn empty(asset_symbol: AssetSymbol) -> Self {
        Self {
            asset_symbol,
            status: PerformanceStatus::NoInvestments,
            number_of_investments: 0,
            total_invested: 0.0,
            total_units: 0.0,
            average_unit_cost: 0.0,
            current_price: 0.0,
            current_value: 0.0,
            unrealized_pl: 0.0,
            unrealized_pl_ratio: 0.0,
            first_investment_at: None,
            last_investment_at: None,
        }
    }
}

struct Totals {
    count: usize,
    invested: f64,
    units: f64,
    first_at: UtcDateTime,
    last_at: UtcDateTime,
}

/// Ledger owned by exactly one DCA strategy instance.
pub struct InvestmentLedger {
    config: DcaConfig,
    oracle: Arc<dyn PriceOracle>,
    records: RwLock<Vec<PurchaseRecord>>,
}

impl InvestmentLedger {
    pub fn new(config: DcaConfig, oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            config,
            oracle,
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &DcaConfig {
        &self.config
    }

    /// Buys `fiat_amount_per_purchase` worth of the asset at the current spot price.
    ///
    /// `occurred_at` defaults to now. The record is appended only after the
    /// price has been validated, so a failure leaves the ledger untouched.
    ///
    /// # Errors
    ///
    /// [`StrategyError::OracleUnavailable`] when no price could be fetched,
    /// [`StrategyError::InvalidPrice`] when it is not strictly positive.
    pub async fn record_purchase(
        &self,
        occurred_at: Option<UtcDateTime>,
    ) -> Result<PurchaseRecord, StrategyError> {
        let asset = self.config.asset_symbol();
        let unit_price = usable_spot_price(self.oracle.as_ref(), asset).await?;

        let fiat_amount = self.config.fiat_amount_per_purchase();
        let units_acquired = fiat_amount / unit_price;
        if !units_acquired.is_finite() || units_acquired <= 0.0 {
            return Err(StrategyError::InvalidPrice {
                asset: asset.clone(),
                price: unit_price,
            });
        }

        let mut records = self.records.write().await;
        let now = UtcDateTime::now();
        let recorded_at = records
            .last()
            .map_or(now, |previous| now.max(previous.recorded_at));
        let record = PurchaseRecord {
            occurred_at: occurred_at.unwrap_or(now),
            asset_symbol: asset.clone(),
            fiat_amount,
            unit_price,
            units_acquired,
            recorded_at,
        };
        records.push(record.clone());

        info!(
            %asset,
            fiat_amount,
            unit_price,
            units_acquired,
            purchases = records.len(),
            "dca purchase recorded"
        );
        Ok(record)
    }

    /// Computes performance over every record.
    ///
    /// An empty ledger short-circuits to [`PerformanceStatus::NoInvestments`]
    /// without querying the oracle.
    pub async fn summarize(&self) -> Result<PerformanceSummary, StrategyError> {
        let asset = self.config.asset_symbol();
        let Some(totals) = self.totals().await else {
            debug!(%asset, "summary requested for empty ledger");
            return Ok(PerformanceSummary::empty(asset.clone()));
        };

        let current_price = usable_spot_price(self.oracle.as_ref(), asset).await?;
        let current_value = totals.units * current_price;
        let unrealized_pl = current_value - totals.invested;
        let status = if unrealized_pl >= 0.0 {
            PerformanceStatus::Profitable
        } else {
            PerformanceStatus::AtLoss
        };

        Ok(PerformanceSummary {
            asset_symbol: asset.clone(),
            status,
            number_of_investments: totals.count,
            total_invested: totals.invested,
            total_units: totals.units,
            average_unit_cost: totals.invested / totals.units,
            current_price,
            current_value,
            unrealized_pl,
            unrealized_pl_ratio: unrealized_pl / totals.invested,
            first_investment_at: Some(totals.first_at),
            last_investment_at: Some(totals.last_at),
        })
    }

    /// Snapshot of all records in append order.
    pub async fn records(&self) -> Vec<PurchaseRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn totals(&self) -> Option<Totals> {
        let records = self.records.read().await;
        let first = records.first()?;
        let last = records.last()?;
        let (invested, units) = records.iter().fold((0.0, 0.0), |(invested, units), record| {
            (invested + record.fiat_amount, units + record.units_acquired)
        });

        Some(Totals {
            count: records.len(),
            invested,
            units,
            first_at: first.occurred_at,
            last_at: last.occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tradepilot_core::{OracleError, OracleFuture};

    use crate::StrategyErrorKind;

    /// Replays a scripted sequence of prices and counts calls.
    struct ScriptedOracle {
        prices: Mutex<VecDeque<Result<f64, OracleError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedOracle {
        fn new(prices: Vec<Result<f64, OracleError>>) -> Arc<Self> {
            Arc::new(Self {
                prices: Mutex::new(prices.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PriceOracle for ScriptedOracle {
        fn spot_price<'a>(&'a self, _asset: &'a AssetSymbol) -> OracleFuture<'a, f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .prices
                .lock()
                .expect("prices lock")
                .pop_front()
                .unwrap_or_else(|| Err(OracleError::unavailable("script exhausted")));
            Box::pin(async move { next })
        }
    }

    fn ledger(amount: f64, oracle: Arc<ScriptedOracle>) -> InvestmentLedger {
        let config = DcaConfig::new(
            AssetSymbol::parse("bitcoin").expect("asset"),
            amount,
            "weekly",
        )
        .expect("config");
        InvestmentLedger::new(config, oracle)
    }

    #[tokio::test]
    async fn weighted_average_cost_is_invested_over_units() {
        let oracle = ScriptedOracle::new(vec![Ok(10.0), Ok(20.0), Ok(15.0)]);
        let ledger = ledger(100.0, oracle.clone());

        let first = ledger.record_purchase(None).await.expect("first buy");
        let second = ledger.record_purchase(None).await.expect("second buy");
        assert_eq!(first.units_acquired, 10.0);
        assert_eq!(second.units_acquired, 5.0);

        let summary = ledger.summarize().await.expect("summary");
        assert_eq!(summary.number_of_investments, 2);
        assert_eq!(summary.total_invested, 200.0);
        assert_eq!(summary.total_units, 15.0);
        assert!((summary.average_unit_cost - 200.0 / 15.0).abs() < 1e-12);
        assert_eq!(summary.current_price, 15.0);
        assert_eq!(summary.current_value, 225.0);
        assert_eq!(summary.unrealized_pl, 25.0);
        assert!((summary.unrealized_pl_ratio - 0.125).abs() < 1e-12);
        assert_eq!(summary.status, PerformanceStatus::Profitable);
        assert_eq!(oracle.calls(), 3);
    }

    #[tokio::test]
    async fn empty_ledger_does_not_query_oracle() {
        let oracle = ScriptedOracle::new(vec![]);
        let ledger = ledger(50.0, oracle.clone());

        let summary = ledger.summarize().await.expect("summary");
        assert_eq!(summary.status, PerformanceStatus::NoInvestments);
        assert_eq!(summary.number_of_investments, 0);
        assert_eq!(summary.total_invested, 0.0);
        assert_eq!(summary.current_value, 0.0);
        assert!(summary.first_investment_at.is_none());
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn rejected_prices_leave_ledger_unchanged() {
        let oracle = ScriptedOracle::new(vec![Ok(0.0), Ok(-3.0), Ok(f64::NAN)]);
        let ledger = ledger(50.0, oracle);

        for _ in 0..3 {
            let err = ledger.record_purchase(None).await.expect_err("must fail");
            assert_eq!(err.kind(), StrategyErrorKind::InvalidPrice);
        }
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn oracle_failure_is_surfaced_without_append() {
        let oracle = ScriptedOracle::new(vec![Ok(10.0), Err(OracleError::unavailable("down"))]);
        let ledger = ledger(50.0, oracle);

        ledger.record_purchase(None).await.expect("first buy");
        let err = ledger.record_purchase(None).await.expect_err("must fail");
        assert_eq!(err.kind(), StrategyErrorKind::OracleUnavailable);
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn loss_is_reported_when_price_drops() {
        let oracle = ScriptedOracle::new(vec![Ok(20.0), Ok(10.0)]);
        let ledger = ledger(100.0, oracle);

        ledger.record_purchase(None).await.expect("buy");
        let summary = ledger.summarize().await.expect("summary");
        assert_eq!(summary.status, PerformanceStatus::AtLoss);
        assert_eq!(summary.unrealized_pl, -50.0);
        assert_eq!(summary.unrealized_pl_ratio, -0.5);
    }

    #[tokio::test]
    async fn first_and_last_follow_append_order_not_timestamps() {
        let oracle = ScriptedOracle::new(vec![Ok(10.0), Ok(10.0), Ok(10.0)]);
        let ledger = ledger(10.0, oracle);
        let later = UtcDateTime::parse("2024-03-01T00:00:00Z").expect("ts");
        let earlier = UtcDateTime::parse("2024-01-01T00:00:00Z").expect("ts");

        ledger.record_purchase(Some(later)).await.expect("buy");
        ledger.record_purchase(Some(earlier)).await.expect("buy");

        let summary = ledger.summarize().await.expect("summary");
        assert_eq!(summary.first_investment_at, Some(later));
        assert_eq!(summary.last_investment_at, Some(earlier));
    }

    #[tokio::test]
    async fn recorded_at_never_decreases() {
        let oracle = ScriptedOracle::new(vec![Ok(1.0); 5]);
        let ledger = ledger(10.0, oracle);
        for _ in 0..5 {
            ledger.record_purchase(None).await.expect("buy");
        }

        let records = ledger.records().await;
        assert!(records
            .windows(2)
            .all(|pair| pair[0].recorded_at <= pair[1].recorded_at));
    }

    #[tokio::test]
    async fn summary_serializes_status_in_screaming_case() {
        let ledger = ledger(10.0, ScriptedOracle::new(vec![]));
        let summary = ledger.summarize().await.expect("summary");
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["status"], "NO_INVESTMENTS");
    }
}
