//! HTTP orchestration for tradepilot agents.
//!
//! | Module | Role |
//! |---|---|
//! | [`config`] | `clap` server configuration and collaborator wiring |
//! | [`state`] | agent registry shared by handlers |
//! | [`routes`] | axum router and JSON handlers |
//! | [`scheduler`] | repeating auto-invest jobs |
//! | [`error`] | API error payloads and startup exit codes |

pub mod config;
pub mod error;
pub mod routes;
pub mod scheduler;
pub mod state;
pub mod telemetry;

pub use config::{Collaborators, ConfigError, OracleMode, ServerConfig};
pub use error::{ApiError, ServerError};
pub use routes::build_router;
pub use scheduler::{frequency_period, Scheduler};
pub use state::AppState;
