//! Call history and stub rules for one mocked target.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::record::{Invocation, InvocationMatcher, InvocationRef};

/// A configured answer, produced fresh on every stubbed call.
pub type Answer = Rc<dyn Fn() -> Box<dyn Any>>;

/// Shared handle to a [`StubRule`].
///
/// The stub builder holds the rule directly rather than an index into the
/// container, so a builder kept alive across `reset` appends to a detached
/// rule the container no longer consults instead of panicking or configuring
/// whatever rule was created afterwards.
pub type StubRuleHandle = Rc<RefCell<StubRule>>;

/// One stub rule: the matcher of the captured call and its answer sequence.
pub struct StubRule {
    matcher: InvocationMatcher,
    answers: VecDeque<Answer>,
}

impl StubRule {
    /// Append an answer to the rule's sequence.
    pub fn push_answer(&mut self, answer: Answer) {
        self.answers.push_back(answer);
    }

    fn next_answer(&mut self) -> Option<Answer> {
        if self.answers.len() > 1 {
            self.answers.pop_front()
        } else {
            self.answers.front().map(Rc::clone)
        }
    }
}

/// Shared handle to an [`InvocationContainer`].
///
/// The container is thread-confined by contract; sharing goes through
/// `Rc<RefCell<_>>` and every access is a short, exclusive borrow.
pub type ContainerHandle = Rc<RefCell<InvocationContainer>>;

/// Recorder and stub store for one mocked target type.
#[derive(Default)]
pub struct InvocationContainer {
    invocations: Vec<InvocationRef>,
    rules: Vec<StubRuleHandle>,
}

impl InvocationContainer {
    /// Create an empty container behind a shared handle.
    #[must_use]
    pub fn handle() -> ContainerHandle {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Record an intercepted call and return its shared record.
    pub fn record(&mut self, method: impl Into<String>, args: Vec<String>) -> InvocationRef {
        let invocation = Invocation::new(method, args);
        self.invocations.push(Rc::clone(&invocation));
        invocation
    }

    /// Convert the capturing invocation into an open stub rule.
    ///
    /// The invocation is removed from the history (declaring a stub is not an
    /// interaction) and an answerless rule keyed by its matcher is opened.
    pub fn convert_to_stub(&mut self, record: &InvocationRef) -> StubRuleHandle {
        self.invocations.retain(|inv| !Rc::ptr_eq(inv, record));
        let rule = Rc::new(RefCell::new(StubRule {
            matcher: InvocationMatcher::from_invocation(record),
            answers: VecDeque::new(),
        }));
        self.rules.push(Rc::clone(&rule));
        rule
    }

    /// Produce the next answer for a call, if any rule matches.
    ///
    /// The most recently declared matching rule wins. Answers are consumed
    /// in declaration order; the final answer repeats for all later calls.
    pub fn answer_for(&mut self, invocation: &Invocation) -> Option<Box<dyn Any>> {
        let rule = self
            .rules
            .iter()
            .rev()
            .find(|rule| rule.borrow().matcher.matches(invocation))?;
        let answer = rule.borrow_mut().next_answer()?;
        Some(answer())
    }

    /// Point-in-time copy of the call history.
    #[must_use]
    pub fn snapshot(&self) -> Vec<InvocationRef> {
        self.invocations.clone()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    /// Whether no calls are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    /// Discard the call history, preserving stub rules.
    pub fn clear_invocations(&mut self) {
        self.invocations.clear();
    }

    /// Discard the call history and all stub rules.
    pub fn clear_all(&mut self) {
        self.invocations.clear();
        self.rules.clear();
    }
}
