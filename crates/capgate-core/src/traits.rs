use capgate_types::{Capability, RequestId};

/// Synchronous capability-state queries answered by the platform.
pub trait CapabilityProvider {
    /// Whether the environment enforces runtime capability checks at all.
    fn gating_enforced(&self) -> bool;

    /// Current-state query: is the capability granted right now?
    fn is_granted(&self, capability: &Capability) -> bool;

    /// True if the capability was denied before without the user permanently
    /// suppressing future prompts.
    fn should_show_rationale(&self, capability: &Capability) -> bool;
}

/// Fire-and-forget prompt issuance. The platform later delivers a result
/// batch tagged with the same request id, which the host forwards into the
/// orchestrator's ingest entry points verbatim.
pub trait PromptChannel {
    fn request_capabilities(&self, capabilities: &[Capability], request: RequestId);
}
