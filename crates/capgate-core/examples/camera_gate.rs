//! Gates a simulated camera launch behind a runtime capability grant.
//!
//! Mirrors a typical host wiring: register the consumer once, issue the
//! check, forward the platform's result notification back in, and run the
//! post-grant action only for granted outcomes.

use capgate_core::{Capability, Outcome, RequestId, RequestOrchestrator};
use capgate_testkit::FakePlatform;

fn main() {
    let camera = Capability::new("camera.capture");
    let request = RequestId::new(254);

    // The user declined once before without suppressing future prompts, so
    // this check goes through the prompt channel.
    let platform = FakePlatform::enforced().previously_denied(camera.clone());

    let mut orchestrator = RequestOrchestrator::new();
    orchestrator.set_single_consumer(|outcome| match outcome {
        Outcome::Granted(kind) => println!("granted ({kind:?}); launching camera capture"),
        Outcome::Denied(kind) => println!("denied ({kind:?}); camera stays off"),
    });

    orchestrator
        .check_single(&platform, camera, request)
        .expect("capability name is valid");

    // A real platform shows its dialog here and notifies the host later; the
    // fake recorded the prompt instead. Feed the user's acceptance back in.
    let prompt = platform
        .take_prompts()
        .pop()
        .expect("one prompt was issued");
    orchestrator
        .ingest_single_result(prompt.request, &prompt.capabilities, &[true])
        .expect("result batch is well-formed");
}
