//! Runtime capability request orchestration over an asynchronous prompt
//! boundary: classify, prompt for what needs it, correlate the platform's
//! result back by request id, and dispatch one reduced outcome per request.

mod error;
mod orchestrator;
pub mod traits;

pub use error::OrchestratorError;
pub use orchestrator::RequestOrchestrator;

pub use capgate_types::{Capability, DenyKind, GrantKind, Outcome, OutcomeMap, RequestId};
