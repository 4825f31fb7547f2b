use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Capability;

/// How a capability ended up granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    /// The environment does not gate this capability; no prompt is ever
    /// needed.
    NotRequired,
    /// The provider reported the capability granted at classification time;
    /// no prompt was issued.
    AlreadyGranted,
    /// A prompt was issued and the user accepted.
    AfterPrompt,
}

/// How a capability ended up denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyKind {
    /// The prompt was shown and declined; the user may be asked again.
    ThisTime,
    /// The user previously declined and suppressed future prompts; no prompt
    /// was issued this round.
    Permanent,
}

/// Reduced per-capability result delivered to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Granted(GrantKind),
    Denied(DenyKind),
}

impl Outcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Outcome::Granted(_))
    }
}

/// Aggregated batch result. Iteration order is the dispatch-order contract:
/// entries echo the order the caller requested the capabilities in.
pub type OutcomeMap = IndexMap<Capability, Outcome>;
