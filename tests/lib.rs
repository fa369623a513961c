//! Shared fakes for the behaviour suites.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::sync::Notify;

pub use std::sync::Arc;

pub use tradepilot_core::{
    AssetSymbol, HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, OracleError,
    OracleFuture, PredictorError, PredictorFuture, PriceHistory, PriceOracle, PricePredictor,
};

pub fn asset(symbol: &str) -> AssetSymbol {
    AssetSymbol::parse(symbol).expect("valid asset symbol")
}

/// Oracle that replays scripted answers and counts every call.
///
/// Once the script runs out the last answer repeats.
pub struct ScriptedOracle {
    answers: Mutex<VecDeque<Result<f64, OracleError>>>,
    last: Mutex<Option<Result<f64, OracleError>>>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new(answers: Vec<Result<f64, OracleError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn prices(prices: &[f64]) -> Self {
        Self::new(prices.iter().copied().map(Ok).collect())
    }

    pub fn failing(error: OracleError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PriceOracle for ScriptedOracle {
    fn spot_price<'a>(&'a self, _asset: &'a AssetSymbol) -> OracleFuture<'a, f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut last = self.last.lock().expect("last lock");
        let answer = match self.answers.lock().expect("answers lock").pop_front() {
            Some(answer) => {
                *last = Some(answer.clone());
                answer
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(OracleError::unavailable("script exhausted"))),
        };
        Box::pin(async move { answer })
    }
}

/// Oracle whose every call waits for [`GatedOracle::release`] before answering.
pub struct GatedOracle {
    price: f64,
    gate: Notify,
    calls: AtomicUsize,
}

impl GatedOracle {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Lets one pending (or the next) call through.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PriceOracle for GatedOracle {
    fn spot_price<'a>(&'a self, _asset: &'a AssetSymbol) -> OracleFuture<'a, f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            self.gate.notified().await;
            Ok(self.price)
        })
    }
}

/// Predictor that always answers the same way.
pub struct FixedPredictor {
    answer: Result<f64, PredictorError>,
    calls: AtomicUsize,
}

impl FixedPredictor {
    pub fn new(price: f64) -> Self {
        Self {
            answer: Ok(price),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: PredictorError) -> Self {
        Self {
            answer: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PricePredictor for FixedPredictor {
    fn forecast<'a>(&'a self, _asset: &'a AssetSymbol) -> PredictorFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self.answer.clone();
        Box::pin(async move { answer })
    }
}

/// History source returning a fixed close series.
pub struct FixedHistory(pub Vec<f64>);

impl PriceHistory for FixedHistory {
    fn daily_closes<'a>(
        &'a self,
        _asset: &'a AssetSymbol,
        days: usize,
    ) -> OracleFuture<'a, Vec<f64>> {
        let skip = self.0.len().saturating_sub(days);
        let closes = self.0[skip..].to_vec();
        Box::pin(async move { Ok(closes) })
    }
}

/// HTTP transport replaying scripted responses and recording requests.
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        self.requests.lock().expect("requests lock").push(request);
        let next = self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::non_retryable("script exhausted")));
        Box::pin(async move { next })
    }
}
