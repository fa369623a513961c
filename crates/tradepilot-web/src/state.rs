//! Agent registry shared by every request handler.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use tradepilot_core::{PriceOracle, PricePredictor, UtcDateTime};
use tradepilot_strategies::{DcaConfig, InvestmentLedger, SignalConfig, SignalGenerator};

use crate::config::Collaborators;
use crate::scheduler::{frequency_period, Scheduler};

/// A DCA strategy instance and its ledger.
pub struct DcaAgent {
    pub id: Uuid,
    pub created_at: UtcDateTime,
    pub auto_invest: bool,
    pub ledger: Arc<InvestmentLedger>,
}

/// A signal generator exposed as a market-making recommendation source.
pub struct MarketMakingAgent {
    pub id: Uuid,
    pub created_at: UtcDateTime,
    pub generator: SignalGenerator,
}

#[derive(Debug, Serialize)]
pub struct DcaAgentView<'a> {
    pub id: Uuid,
    pub created_at: UtcDateTime,
    pub auto_invest: bool,
    pub scheduled: bool,
    #[serde(flatten)]
    pub config: &'a DcaConfig,
}

#[derive(Debug, Serialize)]
pub struct MarketMakingAgentView<'a> {
    pub id: Uuid,
    pub created_at: UtcDateTime,
    #[serde(flatten)]
    pub config: &'a SignalConfig,
}

impl MarketMakingAgent {
    pub fn view(&self) -> MarketMakingAgentView<'_> {
        MarketMakingAgentView {
            id: self.id,
            created_at: self.created_at,
            config: self.generator.config(),
        }
    }
}

pub struct AppState {
    oracle: Arc<dyn PriceOracle>,
    predictor: Arc<dyn PricePredictor>,
    dca_agents: RwLock<HashMap<Uuid, Arc<DcaAgent>>>,
    market_makers: RwLock<HashMap<Uuid, Arc<MarketMakingAgent>>>,
    scheduler: Scheduler,
}

impl AppState {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            oracle: collaborators.oracle,
            predictor: collaborators.predictor,
            dca_agents: RwLock::new(HashMap::new()),
            market_makers: RwLock::new(HashMap::new()),
            scheduler: Scheduler::new(),
        }
    }

    pub fn oracle(&self) -> &dyn PriceOracle {
        self.oracle.as_ref()
    }

    pub fn predictor(&self) -> &dyn PricePredictor {
        self.predictor.as_ref()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Creates a DCA agent. With `auto_invest` and a recognised frequency a
    /// purchase is recorded on every period.
    pub async fn register_dca(&self, config: DcaConfig, auto_invest: bool) -> Arc<DcaAgent> {
        let period = frequency_period(config.frequency_label());
        let agent = Arc::new(DcaAgent {
            id: Uuid::new_v4(),
            created_at: UtcDateTime::now(),
            auto_invest,
            ledger: Arc::new(InvestmentLedger::new(config, self.oracle.clone())),
        });

        if auto_invest {
            match period {
                Some(period) => {
                    let ledger = agent.ledger.clone();
                    let id = agent.id;
                    self.scheduler.schedule(id.to_string(), period, move || {
                        let ledger = ledger.clone();
                        async move {
                            if let Err(error) = ledger.record_purchase(None).await {
                                warn!(agent = %id, code = error.code(), error = %error, "scheduled purchase failed");
                            }
                        }
                    });
                }
                None => warn!(
                    agent = %agent.id,
                    frequency = agent.ledger.config().frequency_label(),
                    "unrecognised frequency, auto-invest disabled"
                ),
            }
        }

        self.dca_agents.write().await.insert(agent.id, agent.clone());
        info!(
            agent = %agent.id,
            asset = %agent.ledger.config().asset_symbol(),
            amount = agent.ledger.config().fiat_amount_per_purchase(),
            "dca agent created"
        );
        agent
    }

    pub async fn dca_agent(&self, id: &Uuid) -> Option<Arc<DcaAgent>> {
        self.dca_agents.read().await.get(id).cloned()
    }

    /// Agents ordered by creation time.
    pub async fn dca_agents(&self) -> Vec<Arc<DcaAgent>> {
        let mut agents: Vec<_> = self.dca_agents.read().await.values().cloned().collect();
        agents.sort_by_key(|agent| (agent.created_at, agent.id));
        agents
    }

    pub fn dca_view<'a>(&self, agent: &'a DcaAgent) -> DcaAgentView<'a> {
        DcaAgentView {
            id: agent.id,
            created_at: agent.created_at,
            auto_invest: agent.auto_invest,
            scheduled: self.scheduler.is_scheduled(&agent.id.to_string()),
            config: agent.ledger.config(),
        }
    }

    pub async fn register_market_maker(&self, config: SignalConfig) -> Arc<MarketMakingAgent> {
        let generator = SignalGenerator::new(config, self.oracle.clone(), self.predictor.clone());
        let agent = Arc::new(MarketMakingAgent {
            id: Uuid::new_v4(),
            created_at: UtcDateTime::now(),
            generator,
        });

        self.market_makers
            .write()
            .await
            .insert(agent.id, agent.clone());
        info!(
            agent = %agent.id,
            asset = %agent.generator.config().asset_symbol(),
            "market-making agent created"
        );
        agent
    }

    pub async fn market_maker(&self, id: &Uuid) -> Option<Arc<MarketMakingAgent>> {
        self.market_makers.read().await.get(id).cloned()
    }
}
