use std::cell::RefCell;
use std::rc::Rc;

use capgate_types::{Outcome, OutcomeMap};

/// Captures single-capability outcomes dispatched by an orchestrator.
///
/// Clones share the same buffer; register [`consumer`](Self::consumer) and
/// keep a handle for assertions.
#[derive(Clone, Default)]
pub struct SingleSink {
    outcomes: Rc<RefCell<Vec<Outcome>>>,
}

impl SingleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler to register as the orchestrator's single consumer.
    pub fn consumer(&self) -> impl FnMut(Outcome) + 'static {
        let outcomes = Rc::clone(&self.outcomes);
        move |outcome| outcomes.borrow_mut().push(outcome)
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.borrow().clone()
    }

    pub fn last(&self) -> Option<Outcome> {
        self.outcomes.borrow().last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.borrow().is_empty()
    }
}

/// Captures aggregated batch outcomes dispatched by an orchestrator.
#[derive(Clone, Default)]
pub struct BatchSink {
    batches: Rc<RefCell<Vec<OutcomeMap>>>,
}

impl BatchSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler to register as the orchestrator's batch consumer.
    pub fn consumer(&self) -> impl FnMut(OutcomeMap) + 'static {
        let batches = Rc::clone(&self.batches);
        move |results| batches.borrow_mut().push(results)
    }

    pub fn batches(&self) -> Vec<OutcomeMap> {
        self.batches.borrow().clone()
    }

    pub fn last(&self) -> Option<OutcomeMap> {
        self.batches.borrow().last().cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.borrow().is_empty()
    }
}
