//! Deterministic fakes for exercising capability request flows in tests:
//! a scripted platform that records prompts instead of showing them, and
//! sinks that capture dispatched outcomes for assertions.

mod platform;
mod sink;

pub use platform::{FakePlatform, RecordedPrompt};
pub use sink::{BatchSink, SingleSink};
