pub mod config;
pub mod gateway;
pub mod logging;
pub mod orchestrator;
pub mod recovery;
pub mod router;
pub mod sentinel;

pub use config::{ConfigError, PayCoreConfig};
pub use orchestrator::{ObservabilitySnapshot, Orchestrator, OrchestratorError, ProcessRequest, ProcessResponse};
