use std::cell::RefCell;
use std::collections::BTreeSet;

use capgate_core::traits::{CapabilityProvider, PromptChannel};
use capgate_types::{Capability, RequestId};

/// One prompt issued through the [`FakePlatform`]'s channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPrompt {
    pub capabilities: Vec<Capability>,
    pub request: RequestId,
}

/// Scripted platform standing in for both collaborator contracts: provider
/// queries are answered from fixed sets, and prompts are recorded rather
/// than shown. Capabilities that are neither granted nor previously denied
/// behave as permanently suppressed, matching a platform that refuses to
/// re-prompt.
pub struct FakePlatform {
    enforced: bool,
    granted: BTreeSet<Capability>,
    rationale: BTreeSet<Capability>,
    prompts: RefCell<Vec<RecordedPrompt>>,
}

impl FakePlatform {
    /// Platform that enforces runtime capability gating.
    pub fn enforced() -> Self {
        Self::new(true)
    }

    /// Platform below the enforcement threshold: every check short-circuits
    /// to granted.
    pub fn unenforced() -> Self {
        Self::new(false)
    }

    fn new(enforced: bool) -> Self {
        Self {
            enforced,
            granted: BTreeSet::new(),
            rationale: BTreeSet::new(),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Marks `capability` as currently granted.
    pub fn grant(mut self, capability: impl Into<Capability>) -> Self {
        self.granted.insert(capability.into());
        self
    }

    /// Marks `capability` as previously denied without permanent
    /// suppression; a rationale should be shown and a prompt issued.
    pub fn previously_denied(mut self, capability: impl Into<Capability>) -> Self {
        self.rationale.insert(capability.into());
        self
    }

    /// Prompts recorded so far, oldest first.
    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts.borrow().clone()
    }

    /// Drains and returns the recorded prompts.
    pub fn take_prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts.borrow_mut().drain(..).collect()
    }
}

impl CapabilityProvider for FakePlatform {
    fn gating_enforced(&self) -> bool {
        self.enforced
    }

    fn is_granted(&self, capability: &Capability) -> bool {
        self.granted.contains(capability)
    }

    fn should_show_rationale(&self, capability: &Capability) -> bool {
        self.rationale.contains(capability)
    }
}

impl PromptChannel for FakePlatform {
    fn request_capabilities(&self, capabilities: &[Capability], request: RequestId) {
        log::debug!(
            "recording prompt for {} capabilities (request {request})",
            capabilities.len()
        );
        self.prompts.borrow_mut().push(RecordedPrompt {
            capabilities: capabilities.to_vec(),
            request,
        });
    }
}
