//! Shared capability/outcome vocabulary for runtime permission requests.

mod capability;
mod outcome;
mod request;

pub use capability::Capability;
pub use outcome::{DenyKind, GrantKind, Outcome, OutcomeMap};
pub use request::RequestId;
