use std::collections::HashMap;

use capgate_types::{Capability, DenyKind, GrantKind, Outcome, OutcomeMap, RequestId};

use crate::error::OrchestratorError;
use crate::traits::{CapabilityProvider, PromptChannel};

/// Which entry point opened a pending request. A result forwarded to the
/// other path's ingest entry point is treated as foreign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Path {
    Single,
    Batch,
}

#[derive(Debug)]
struct PendingRequest {
    path: Path,
    /// Capabilities in caller order; the aggregated snapshot echoes it.
    ordered: Vec<Capability>,
    /// Filled synchronously during classification, then by ingest.
    results: OutcomeMap,
}

type SingleConsumer = Box<dyn FnMut(Outcome)>;
type BatchConsumer = Box<dyn FnMut(OutcomeMap)>;

/// Orchestrates runtime capability requests across the asynchronous prompt
/// boundary.
///
/// Each check classifies its capabilities into already-satisfied versus
/// needs-a-prompt, issues one prompt for the needy subset, and suspends the
/// logical request until the host forwards the platform's result
/// notification into the matching ingest entry point. Outcomes are reduced
/// into a single result per request and handed to the registered consumer
/// exactly once.
///
/// Requests pending a prompt are keyed by their [`RequestId`]; concurrently
/// outstanding requests with distinct ids resolve independently. Reissuing a
/// check under an id that is still in flight discards the older request, and
/// its eventual result is ignored as stale.
#[derive(Default)]
pub struct RequestOrchestrator {
    pending: HashMap<RequestId, PendingRequest>,
    single_consumer: Option<SingleConsumer>,
    batch_consumer: Option<BatchConsumer>,
}

impl RequestOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the consumer for single-capability outcomes, replacing any
    /// previously registered one.
    pub fn set_single_consumer(&mut self, consumer: impl FnMut(Outcome) + 'static) {
        self.single_consumer = Some(Box::new(consumer));
    }

    /// Registers the consumer for aggregated batch outcomes, replacing any
    /// previously registered one.
    pub fn set_batch_consumer(&mut self, consumer: impl FnMut(OutcomeMap) + 'static) {
        self.batch_consumer = Some(Box::new(consumer));
    }

    /// Whether a request is still waiting on a prompt result.
    pub fn is_pending(&self, request: RequestId) -> bool {
        self.pending.contains_key(&request)
    }

    /// Checks one capability, prompting only if the platform cannot satisfy
    /// it synchronously.
    ///
    /// Dispatches immediately when gating is unenforced, the capability is
    /// already granted, or the user has permanently suppressed prompts for
    /// it. Otherwise a prompt is issued and the outcome arrives through
    /// [`ingest_single_result`](Self::ingest_single_result).
    pub fn check_single<P>(
        &mut self,
        platform: &P,
        capability: Capability,
        request: RequestId,
    ) -> Result<(), OrchestratorError>
    where
        P: CapabilityProvider + PromptChannel,
    {
        if capability.as_str().is_empty() {
            return Err(OrchestratorError::EmptyCapability);
        }
        if !platform.gating_enforced() {
            self.dispatch_single(Outcome::Granted(GrantKind::NotRequired));
            return Ok(());
        }
        if platform.is_granted(&capability) {
            self.dispatch_single(Outcome::Granted(GrantKind::AlreadyGranted));
            return Ok(());
        }
        if platform.should_show_rationale(&capability) {
            self.track(
                request,
                PendingRequest {
                    path: Path::Single,
                    ordered: vec![capability.clone()],
                    results: OutcomeMap::new(),
                },
            );
            platform.request_capabilities(std::slice::from_ref(&capability), request);
            return Ok(());
        }
        // Denied earlier with future prompts suppressed; report without
        // prompting.
        self.dispatch_single(Outcome::Denied(DenyKind::Permanent));
        Ok(())
    }

    /// Checks a batch of capabilities, prompting once for the subset the
    /// platform cannot satisfy synchronously.
    ///
    /// An empty batch is legal and completes immediately with an empty
    /// mapping. When no capability needs a prompt the aggregated consumer
    /// fires before this call returns; otherwise it fires from the matching
    /// [`ingest_many_result`](Self::ingest_many_result).
    pub fn check_many<P>(
        &mut self,
        platform: &P,
        capabilities: &[Capability],
        request: RequestId,
    ) -> Result<(), OrchestratorError>
    where
        P: CapabilityProvider + PromptChannel,
    {
        if capabilities.iter().any(|cap| cap.as_str().is_empty()) {
            return Err(OrchestratorError::EmptyCapability);
        }

        let mut results = OutcomeMap::with_capacity(capabilities.len());

        if !platform.gating_enforced() {
            for capability in capabilities {
                results.insert(capability.clone(), Outcome::Granted(GrantKind::NotRequired));
            }
            self.dispatch_batch(results);
            return Ok(());
        }

        let mut needs_prompt = Vec::new();
        for capability in capabilities {
            if platform.is_granted(capability) {
                results.insert(
                    capability.clone(),
                    Outcome::Granted(GrantKind::AlreadyGranted),
                );
            } else if platform.should_show_rationale(capability) {
                needs_prompt.push(capability.clone());
            } else {
                results.insert(capability.clone(), Outcome::Denied(DenyKind::Permanent));
            }
        }

        if needs_prompt.is_empty() {
            // Classification inserted in caller order, so the map already
            // echoes it.
            self.dispatch_batch(results);
            return Ok(());
        }

        self.track(
            request,
            PendingRequest {
                path: Path::Batch,
                ordered: capabilities.to_vec(),
                results,
            },
        );
        platform.request_capabilities(&needs_prompt, request);
        Ok(())
    }

    /// Forwards the platform's result notification for a single-capability
    /// request. Notifications whose id matches no pending single request are
    /// ignored.
    pub fn ingest_single_result(
        &mut self,
        request: RequestId,
        capabilities: &[Capability],
        grant_flags: &[bool],
    ) -> Result<(), OrchestratorError> {
        check_batch_shape(capabilities, grant_flags)?;
        if self.take_pending(request, Path::Single).is_none() {
            return Ok(());
        }
        let outcome = if grant_flags.len() == 1 && grant_flags[0] {
            Outcome::Granted(GrantKind::AfterPrompt)
        } else {
            Outcome::Denied(DenyKind::ThisTime)
        };
        self.dispatch_single(outcome);
        Ok(())
    }

    /// Forwards the platform's result notification for a batch request.
    /// Notifications whose id matches no pending batch request are ignored;
    /// pending state of other requests is never touched.
    pub fn ingest_many_result(
        &mut self,
        request: RequestId,
        capabilities: &[Capability],
        grant_flags: &[bool],
    ) -> Result<(), OrchestratorError> {
        check_batch_shape(capabilities, grant_flags)?;
        let Some(mut entry) = self.take_pending(request, Path::Batch) else {
            return Ok(());
        };
        for (capability, granted) in capabilities.iter().zip(grant_flags) {
            let outcome = if *granted {
                Outcome::Granted(GrantKind::AfterPrompt)
            } else {
                Outcome::Denied(DenyKind::ThisTime)
            };
            entry.results.insert(capability.clone(), outcome);
        }
        // Prompted entries resolve after the synchronous ones; rebuild the
        // snapshot so it echoes the caller's capability order.
        let mut snapshot = OutcomeMap::with_capacity(entry.ordered.len());
        for capability in &entry.ordered {
            if let Some(outcome) = entry.results.get(capability) {
                snapshot.insert(capability.clone(), *outcome);
            }
        }
        self.dispatch_batch(snapshot);
        Ok(())
    }

    fn track(&mut self, request: RequestId, entry: PendingRequest) {
        if self.pending.insert(request, entry).is_some() {
            log::warn!("request {request} reissued while in flight; previous request discarded");
        }
    }

    fn take_pending(&mut self, request: RequestId, path: Path) -> Option<PendingRequest> {
        match self.pending.get(&request).map(|entry| entry.path) {
            Some(pending_path) if pending_path == path => self.pending.remove(&request),
            Some(_) => {
                log::debug!("result for request {request} ignored (pending on the other path)");
                None
            }
            None => {
                log::debug!("result for request {request} ignored (stale or foreign)");
                None
            }
        }
    }

    fn dispatch_single(&mut self, outcome: Outcome) {
        match self.single_consumer.as_mut() {
            Some(consumer) => consumer(outcome),
            None => log::debug!("no single-capability consumer registered, dropping {outcome:?}"),
        }
    }

    fn dispatch_batch(&mut self, results: OutcomeMap) {
        match self.batch_consumer.as_mut() {
            Some(consumer) => consumer(results),
            None => log::debug!(
                "no batch consumer registered, dropping {} outcomes",
                results.len()
            ),
        }
    }
}

fn check_batch_shape(
    capabilities: &[Capability],
    grant_flags: &[bool],
) -> Result<(), OrchestratorError> {
    if capabilities.len() != grant_flags.len() {
        return Err(OrchestratorError::MalformedResultBatch {
            capabilities: capabilities.len(),
            flags: grant_flags.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct StubPlatform {
        enforced: bool,
        granted: Vec<Capability>,
        rationale: Vec<Capability>,
        prompts: RefCell<Vec<(Vec<Capability>, RequestId)>>,
    }

    impl StubPlatform {
        fn enforced() -> Self {
            Self {
                enforced: true,
                granted: Vec::new(),
                rationale: Vec::new(),
                prompts: RefCell::new(Vec::new()),
            }
        }

        fn granted(mut self, capability: &str) -> Self {
            self.granted.push(capability.into());
            self
        }

        fn rationale(mut self, capability: &str) -> Self {
            self.rationale.push(capability.into());
            self
        }
    }

    impl CapabilityProvider for StubPlatform {
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

    impl PromptChannel for StubPlatform {
        fn request_capabilities(&self, capabilities: &[Capability], request: RequestId) {
            self.prompts
                .borrow_mut()
                .push((capabilities.to_vec(), request));
        }
    }

    fn collect_single(orchestrator: &mut RequestOrchestrator) -> Rc<RefCell<Vec<Outcome>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        orchestrator.set_single_consumer(move |outcome| sink.borrow_mut().push(outcome));
        seen
    }

    #[test]
    fn permanent_denial_dispatches_without_prompt() {
        let platform = StubPlatform::enforced();
        let mut orchestrator = RequestOrchestrator::new();
        let seen = collect_single(&mut orchestrator);

        orchestrator
            .check_single(&platform, "camera.capture".into(), RequestId::new(7))
            .unwrap();

        assert_eq!(*seen.borrow(), [Outcome::Denied(DenyKind::Permanent)]);
        assert!(platform.prompts.borrow().is_empty());
        assert!(!orchestrator.is_pending(RequestId::new(7)));
    }

    #[test]
    fn empty_capability_name_is_rejected() {
        let platform = StubPlatform::enforced();
        let mut orchestrator = RequestOrchestrator::new();
        let seen = collect_single(&mut orchestrator);

        let err = orchestrator
            .check_single(&platform, "".into(), RequestId::new(1))
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::EmptyCapability));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn reissued_request_id_replaces_in_flight_entry() {
        let platform = StubPlatform::enforced()
            .rationale("camera.capture")
            .rationale("audio.record");
        let mut orchestrator = RequestOrchestrator::new();
        let seen = collect_single(&mut orchestrator);

        let request = RequestId::new(9);
        orchestrator
            .check_single(&platform, "camera.capture".into(), request)
            .unwrap();
        orchestrator
            .check_single(&platform, "audio.record".into(), request)
            .unwrap();

        // One tracked entry; the second prompt's result resolves it.
        assert_eq!(platform.prompts.borrow().len(), 2);
        orchestrator
            .ingest_single_result(request, &["audio.record".into()], &[true])
            .unwrap();
        assert_eq!(*seen.borrow(), [Outcome::Granted(GrantKind::AfterPrompt)]);
        assert!(!orchestrator.is_pending(request));
    }

    #[test]
    fn batch_result_on_single_path_is_foreign() {
        let platform = StubPlatform::enforced().rationale("camera.capture");
        let mut orchestrator = RequestOrchestrator::new();
        let seen = collect_single(&mut orchestrator);

        let request = RequestId::new(3);
        orchestrator
            .check_single(&platform, "camera.capture".into(), request)
            .unwrap();
        orchestrator
            .ingest_many_result(request, &["camera.capture".into()], &[true])
            .unwrap();

        assert!(seen.borrow().is_empty());
        assert!(orchestrator.is_pending(request));
    }

    #[test]
    fn malformed_batch_fails_fast_and_keeps_pending_state() {
        let platform = StubPlatform::enforced().rationale("camera.capture");
        let mut orchestrator = RequestOrchestrator::new();

        let request = RequestId::new(4);
        orchestrator
            .check_many(
                &platform,
                &["camera.capture".into(), "storage.read".into()],
                request,
            )
            .unwrap();

        let err = orchestrator
            .ingest_many_result(request, &["camera.capture".into()], &[true, false])
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::MalformedResultBatch {
                capabilities: 1,
                flags: 2
            }
        ));
        assert!(orchestrator.is_pending(request));
    }

    #[test]
    fn missing_consumer_drops_outcome_without_panic() {
        let platform = StubPlatform::enforced().granted("camera.capture");
        let mut orchestrator = RequestOrchestrator::new();

        orchestrator
            .check_single(&platform, "camera.capture".into(), RequestId::new(2))
            .unwrap();
        orchestrator
            .check_many(&platform, &["camera.capture".into()], RequestId::new(5))
            .unwrap();
    }
}
