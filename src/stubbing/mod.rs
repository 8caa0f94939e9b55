//! The stub builder returned by a successful `when`.

use std::any::Any;
use std::marker::PhantomData;
use std::panic::panic_any;
use std::rc::Rc;

use crate::invocation::StubRuleHandle;
use crate::progress::StubCapture;

/// Declares what a captured call should do when it is invoked again.
///
/// Each `then_*` call appends one answer to the rule's sequence and hands
/// the builder back, so consecutive answers chain naturally:
///
/// ```rust
/// use staticmock::mock::MockedStatic;
/// use staticmock::progress::MockingProgress;
///
/// struct Counter;
///
/// let progress = MockingProgress::handle();
/// let (mock, calls) = MockedStatic::<Counter>::activate(&progress);
///
/// mock.when(|| calls.invoke::<i32>("next", vec![]))
///     .unwrap()
///     .then_return(1)
///     .then_return(2);
///
/// assert_eq!(calls.invoke::<i32>("next", vec![]), Some(1));
/// assert_eq!(calls.invoke::<i32>("next", vec![]), Some(2));
/// // The final answer repeats.
/// assert_eq!(calls.invoke::<i32>("next", vec![]), Some(2));
/// ```
pub struct OngoingStub<S> {
    rule: StubRuleHandle,
    _return: PhantomData<S>,
}

impl<S: 'static> OngoingStub<S> {
    /// Bind a builder to the call captured in `capture`.
    ///
    /// Converts the capturing invocation into an open stub rule; from here
    /// on, declaring the stub is no longer an interaction. The builder holds
    /// the rule itself, not a position in the container, so it stays safe to
    /// use (and simply inert) if the mock is reset underneath it.
    #[must_use]
    pub(crate) fn from_capture(capture: &StubCapture) -> Self {
        let rule = capture
            .container()
            .borrow_mut()
            .convert_to_stub(capture.record());
        Self {
            rule,
            _return: PhantomData,
        }
    }

    /// Answer the next matching call with a clone of `value`.
    #[must_use]
    pub fn then_return(self, value: S) -> Self
    where
        S: Clone,
    {
        self.push(move || Box::new(value.clone()));
        self
    }

    /// Answer the next matching call by running `answer`.
    #[must_use]
    pub fn then_answer(self, answer: impl Fn() -> S + 'static) -> Self {
        self.push(move || Box::new(answer()));
        self
    }

    /// Make the next matching call panic with `message`.
    ///
    /// The panic surfaces from the mocked function itself, the way a thrown
    /// error would from a configured stub.
    #[must_use]
    pub fn then_panic(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.rule
            .borrow_mut()
            .push_answer(Rc::new(move || panic_any(message.clone())));
        self
    }

    fn push(&self, answer: impl Fn() -> Box<dyn Any> + 'static) {
        self.rule.borrow_mut().push_answer(Rc::new(answer));
    }
}
