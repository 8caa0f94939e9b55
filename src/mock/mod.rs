//! The scoped mock handle for one type's class-level functions.
//!
//! A [`MockedStatic`] represents one active static-mocking session for one
//! type, confined to the thread that created it. Stubbing and verification
//! both run a caller-supplied trigger closure whose only job is to make one
//! call reach the mocked surface; the handle then reads what that call
//! produced out of the shared progress tracker and either returns a stub
//! builder or reports the verification outcome.
//!
//! The session ends with [`close`](MockedStatic::close) (or when the handle
//! is dropped); afterwards the interception is disabled and the handle is
//! permanently inert.
//!
//! # Example
//!
//! ```rust
//! use staticmock::mock::MockedStatic;
//! use staticmock::progress::MockingProgress;
//!
//! struct Utility;
//!
//! fn sample(calls: &staticmock::intercept::StaticSurface<Utility>) -> String {
//!     calls.invoke("sample", vec![]).unwrap_or_default()
//! }
//!
//! let progress = MockingProgress::handle();
//! let (mock, calls) = MockedStatic::<Utility>::activate(&progress);
//!
//! mock.when(|| sample(&calls)).unwrap().then_return("stubbed".to_string());
//! assert_eq!(sample(&calls), "stubbed");
//!
//! mock.verify(|| sample(&calls)).unwrap();
//! mock.close().unwrap();
//! ```

use std::any::Any;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe, Location};
use std::rc::Rc;

use crate::error::{short_type_name, Error, Result};
use crate::intercept::{MockIntrospection, MockSettings, StaticMockControl, StaticSurface};
use crate::progress::ProgressHandle;
use crate::stubbing::OngoingStub;
use crate::verification::{times, VerificationContext, VerificationData, VerificationMode};
use crate::verification::{no_interactions, no_more_interactions};

/// An active mock of one type's class-level functions.
///
/// Usable only from the thread that created it; the handle is `!Send` by
/// construction, so this contract is enforced at compile time. The handle is
/// deliberately not `Clone`: it exclusively owns the interception switch and
/// duplicating an armed teardown is never permitted.
pub struct MockedStatic<T: 'static> {
    control: StaticMockControl<T>,
    progress: ProgressHandle,
    closed: Cell<bool>,
    created_at: &'static Location<'static>,
}

impl<T: 'static> MockedStatic<T> {
    /// Activate static mocking for `T` with default settings.
    ///
    /// Returns the scoped handle and the dispatch surface the test's
    /// stand-in for `T` routes its calls through.
    #[track_caller]
    #[must_use]
    pub fn activate(progress: &ProgressHandle) -> (Self, StaticSurface<T>) {
        Self::activate_with(MockSettings::default(), progress)
    }

    /// Activate static mocking for `T` with explicit settings.
    #[track_caller]
    #[must_use]
    pub fn activate_with(
        settings: MockSettings,
        progress: &ProgressHandle,
    ) -> (Self, StaticSurface<T>) {
        let (control, surface) = StaticMockControl::new(Rc::clone(progress), settings);
        let mock = Self {
            control,
            progress: Rc::clone(progress),
            closed: Cell::new(false),
            created_at: Location::caller(),
        };
        (mock, surface)
    }

    /// Declare what the call made by `trigger` should return.
    ///
    /// The trigger runs exactly once, synchronously. Its return value and
    /// any panic are discarded on purpose: stub declaration happens on a
    /// placeholder return path, and only the side effect of reaching the
    /// mocked surface matters.
    ///
    /// # Errors
    ///
    /// [`Error::Usage`] when the handle is closed;
    /// [`Error::MissingInvocation`] when the trigger reached no mocked
    /// function of `T` (the progress tracker is reset before returning).
    pub fn when<S: 'static, R>(&self, trigger: impl FnOnce() -> R) -> Result<OngoingStub<S>> {
        self.ensure_active()?;

        // Discard any stale capture from earlier ordinary interactions so it
        // cannot satisfy a trigger that reached nothing.
        self.progress.borrow_mut().reset_ongoing_stubbing();

        let _ = catch_unwind(AssertUnwindSafe(trigger));

        let mut progress = self.progress.borrow_mut();
        progress.stubbing_started();
        match progress.pull_ongoing_stub() {
            Some(capture) => {
                progress.stubbing_completed();
                drop(progress);
                Ok(OngoingStub::from_capture(&capture))
            }
            None => {
                progress.reset();
                drop(progress);
                Err(Error::missing_invocation(format!(
                    "the closure passed to when() invoked no mocked function of `{}`. \
                     Pass a closure that calls exactly one mocked function, \
                     e.g. mock.when(|| {}::sample(&surface))",
                    self.target_name(),
                    short_type_name(self.target_name()),
                )))
            }
        }
    }

    /// Verify that the call made by `trigger` happened exactly once.
    ///
    /// # Errors
    ///
    /// See [`verify_with`](Self::verify_with).
    pub fn verify<R>(&self, trigger: impl FnOnce() -> R) -> Result<()> {
        self.verify_with(times(1), trigger)
    }

    /// Verify the call made by `trigger` against an explicit mode.
    ///
    /// Verification-started listeners are notified first, then the effective
    /// mode is resolved and armed on the progress tracker, and finally the
    /// trigger runs exactly once. The pass/fail decision is made by the mode
    /// when the intercepted call consumes the armed context; this method
    /// only classifies what comes back.
    ///
    /// # Errors
    ///
    /// [`Error::Usage`] when the handle is closed or the tracker is
    /// mid-protocol; [`Error::Verification`] from the mode, unchanged;
    /// [`Error::MissingInvocation`] when the trigger reached no mocked
    /// function; [`Error::UnexpectedTrigger`] for any unrelated panic
    /// escaping the trigger.
    pub fn verify_with<M, R>(&self, mode: M, trigger: impl FnOnce() -> R) -> Result<()>
    where
        M: VerificationMode + 'static,
    {
        self.ensure_active()?;

        let introspection = self.introspection();
        for listener in self.control.settings().verification_started_listeners() {
            listener.on_verification_started(&introspection);
        }

        let mode = self.progress.borrow().resolve_lazy_mode(Box::new(mode));
        let listeners = self.progress.borrow().verification_listeners();
        let context = VerificationContext::new(self.target_name(), mode, listeners);
        self.progress.borrow_mut().verification_started(context)?;

        let outcome = catch_unwind(AssertUnwindSafe(trigger));

        let leftover = self.progress.borrow_mut().take_verification_context();
        if leftover.is_some() {
            self.progress.borrow_mut().reset();
        }

        match outcome {
            Ok(_) => {
                if leftover.is_some() {
                    return Err(Error::missing_invocation(format!(
                        "the closure passed to verify() invoked no mocked function of `{}`",
                        self.target_name()
                    )));
                }
                Ok(())
            }
            Err(payload) => Err(classify_trigger_panic(payload, self.target_name())),
        }
    }

    /// Discard all recorded history and all configured stub behavior.
    ///
    /// # Errors
    ///
    /// [`Error::Usage`] when the handle is closed or the tracker is
    /// mid-protocol (resetting then would corrupt the shared channel).
    pub fn reset(&self) -> Result<()> {
        self.ensure_active()?;
        self.clean_progress()?;
        self.control.container().borrow_mut().clear_all();
        Ok(())
    }

    /// Discard recorded history, preserving configured stub behavior.
    ///
    /// # Errors
    ///
    /// Same conditions as [`reset`](Self::reset).
    pub fn clear_invocations(&self) -> Result<()> {
        self.ensure_active()?;
        self.clean_progress()?;
        self.control.container().borrow_mut().clear_invocations();
        Ok(())
    }

    /// Fail if any recorded call has not been verified.
    ///
    /// # Errors
    ///
    /// [`Error::Usage`] on a closed handle or dirty tracker;
    /// [`Error::Verification`] naming the first unverified call.
    pub fn verify_no_more_interactions(&self) -> Result<()> {
        self.ensure_active()?;
        self.progress.borrow().validate_state()?;
        let data = VerificationData::new(self.control.container().borrow().snapshot(), None);
        no_more_interactions().verify(&data)
    }

    /// Fail if any call was recorded at all.
    ///
    /// # Errors
    ///
    /// [`Error::Usage`] on a closed handle or dirty tracker;
    /// [`Error::Verification`] naming the first recorded call.
    pub fn verify_no_interactions(&self) -> Result<()> {
        self.ensure_active()?;
        self.progress.borrow().validate_state()?;
        let data = VerificationData::new(self.control.container().borrow().snapshot(), None);
        no_interactions().verify(&data)
    }

    /// Release the static mock and disable interception.
    ///
    /// # Errors
    ///
    /// [`Error::Usage`] citing the creation site when the handle was already
    /// released, so the first, legitimate close call can be found.
    pub fn close(&self) -> Result<()> {
        self.ensure_active()?;
        self.closed.set(true);
        self.control.disable();
        Ok(())
    }

    /// Release the static mock; non-operational if already released.
    ///
    /// For lifecycle hooks that cannot know whether [`close`](Self::close)
    /// already ran.
    ///
    /// # Errors
    ///
    /// None in practice; the signature matches [`close`](Self::close) so
    /// callers can treat both uniformly.
    pub fn close_on_demand(&self) -> Result<()> {
        if self.closed.get() {
            return Ok(());
        }
        self.close()
    }

    /// Whether the session has been released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Full name of the mocked type.
    #[must_use]
    pub fn target_name(&self) -> &'static str {
        self.control.target_name()
    }

    /// Resolve the read-only introspection view of this mock.
    #[must_use]
    pub fn introspection(&self) -> MockIntrospection {
        self.control.introspection()
    }

    fn ensure_active(&self) -> Result<()> {
        if self.closed.get() {
            return Err(Error::usage(format!(
                "the static mock for `{}` created at {} is already released \
                 and can no longer be used",
                self.target_name(),
                self.created_at
            )));
        }
        Ok(())
    }

    fn clean_progress(&self) -> Result<()> {
        let mut progress = self.progress.borrow_mut();
        progress.validate_state()?;
        progress.reset();
        progress.reset_ongoing_stubbing();
        Ok(())
    }
}

impl<T: 'static> Drop for MockedStatic<T> {
    fn drop(&mut self) {
        // Same checked no-op as close_on_demand: a handle falling out of
        // scope releases the interception at most once.
        if !self.closed.get() {
            self.closed.set(true);
            self.control.disable();
        }
    }
}

/// Sort an escaped trigger panic into the error taxonomy.
///
/// Payloads that already are crate errors pass through unchanged; anything
/// else is ambiguous between API misuse and an unrelated bug, and gets
/// wrapped with guidance naming the target.
fn classify_trigger_panic(payload: Box<dyn Any + Send>, target: &str) -> Error {
    match payload.downcast::<Error>() {
        Ok(err) => *err,
        Err(payload) => Error::unexpected_trigger(target, panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "a non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MockingProgress;
    use crate::verification::{at_least, lazily, never};

    struct Utility;

    fn sample(calls: &StaticSurface<Utility>) -> String {
        calls.invoke("sample", vec![]).unwrap_or_default()
    }

    fn setup() -> (MockedStatic<Utility>, StaticSurface<Utility>, ProgressHandle) {
        let progress = MockingProgress::handle();
        let (mock, calls) = MockedStatic::<Utility>::activate(&progress);
        (mock, calls, progress)
    }

    // Every operation but close_on_demand fails on a closed handle.
    #[test]
    fn test_operations_fail_after_close() {
        let (mock, calls, _progress) = setup();
        mock.close().unwrap();
        assert!(mock.is_closed());

        assert!(matches!(
            mock.when::<String, _>(|| sample(&calls)),
            Err(Error::Usage(_))
        ));
        assert!(matches!(mock.verify(|| sample(&calls)), Err(Error::Usage(_))));
        assert!(matches!(mock.reset(), Err(Error::Usage(_))));
        assert!(matches!(mock.clear_invocations(), Err(Error::Usage(_))));
        assert!(matches!(mock.verify_no_interactions(), Err(Error::Usage(_))));
        assert!(matches!(
            mock.verify_no_more_interactions(),
            Err(Error::Usage(_))
        ));
        assert!(matches!(mock.close(), Err(Error::Usage(_))));

        // The flag never reverts.
        assert!(mock.is_closed());
    }

    #[test]
    fn test_double_close_cites_creation_site() {
        let (mock, _calls, _progress) = setup();
        mock.close().unwrap();

        let message = mock.close().unwrap_err().to_string();
        assert!(message.contains("Utility"));
        assert!(message.contains(file!()));
    }

    // close_on_demand is idempotent; one disable signal total.
    #[test]
    fn test_close_on_demand_is_idempotent() {
        let (mock, calls, _progress) = setup();

        mock.close_on_demand().unwrap();
        mock.close_on_demand().unwrap();

        assert!(!calls.is_intercepting());
        assert_eq!(mock.control.disable_calls(), 1);
    }

    #[test]
    fn test_close_on_demand_after_close_sends_no_second_disable() {
        let (mock, _calls, _progress) = setup();
        mock.close().unwrap();
        mock.close_on_demand().unwrap();
        assert_eq!(mock.control.disable_calls(), 1);
    }

    #[test]
    fn test_drop_releases_interception_once() {
        let progress = MockingProgress::handle();
        let (mock, calls) = MockedStatic::<Utility>::activate(&progress);
        drop(mock);
        assert!(!calls.is_intercepting());
    }

    // A trigger that reaches nothing fails and leaves the tracker clean.
    #[test]
    fn test_when_without_invocation_fails_cleanly() {
        let (mock, _calls, progress) = setup();

        let err = mock.when::<String, _>(|| ()).err().unwrap();
        assert!(matches!(err, Error::MissingInvocation(_)));
        assert!(err.to_string().contains("Utility"));

        assert!(progress.borrow().validate_state().is_ok());
        assert!(progress.borrow_mut().pull_ongoing_stub().is_none());
    }

    #[test]
    fn test_when_ignores_stale_capture_from_earlier_interaction() {
        let (mock, calls, _progress) = setup();
        sample(&calls);

        // The earlier direct call must not satisfy an empty trigger.
        assert!(matches!(
            mock.when::<String, _>(|| ()),
            Err(Error::MissingInvocation(_))
        ));
    }

    // Successful stubbing, and independence of consecutive when calls.
    #[test]
    fn test_when_stubs_the_captured_call() {
        let (mock, calls, _progress) = setup();

        mock.when(|| sample(&calls))
            .unwrap()
            .then_return("x".to_string());
        assert_eq!(sample(&calls), "x");

        mock.when(|| sample(&calls))
            .unwrap()
            .then_return("y".to_string());
        assert_eq!(sample(&calls), "y");
    }

    #[test]
    fn test_when_swallows_trigger_panic() {
        let (mock, calls, _progress) = setup();

        let stub = mock.when::<String, _>(|| {
            sample(&calls);
            panic!("stub declaration path has no valid value");
        });
        stub.unwrap().then_return("ok".to_string());
        assert_eq!(sample(&calls), "ok");
    }

    // The default mode checks for exactly one recorded invocation.
    #[test]
    fn test_verify_default_mode_counts() {
        let (mock, calls, _progress) = setup();

        let err = mock.verify(|| sample(&calls)).unwrap_err();
        assert!(matches!(err, Error::Verification(_)));
        assert!(err.to_string().contains("recorded 0"));

        sample(&calls);
        mock.verify(|| sample(&calls)).unwrap();

        sample(&calls);
        let err = mock.verify(|| sample(&calls)).unwrap_err();
        assert!(err.to_string().contains("recorded 2"));
    }

    #[test]
    fn test_verify_with_explicit_modes() {
        let (mock, calls, _progress) = setup();
        sample(&calls);
        sample(&calls);

        mock.verify_with(times(2), || sample(&calls)).unwrap();
        mock.verify_with(at_least(1), || sample(&calls)).unwrap();
        assert!(mock.verify_with(never(), || sample(&calls)).is_err());
    }

    #[test]
    fn test_verify_with_lazy_mode_resolves_before_arming() {
        let (mock, calls, _progress) = setup();
        sample(&calls);

        mock.verify_with(lazily(|| Box::new(times(1))), || sample(&calls))
            .unwrap();
    }

    // Unrelated trigger panics are wrapped, never surfaced raw.
    #[test]
    fn test_verify_wraps_unrelated_trigger_panic() {
        let (mock, _calls, progress) = setup();

        let err = mock
            .verify(|| panic!("something else entirely"))
            .unwrap_err();
        match err {
            Error::UnexpectedTrigger { target, detail, .. } => {
                assert!(target.contains("Utility"));
                assert_eq!(detail, "something else entirely");
            }
            other => panic!("expected UnexpectedTrigger, got {other}"),
        }
        assert!(progress.borrow().validate_state().is_ok());
    }

    #[test]
    fn test_verify_rethrows_verification_failure_unchanged() {
        let (mock, calls, _progress) = setup();
        sample(&calls);
        sample(&calls);

        // The failure comes back as-is; it is not wrapped as unexpected.
        assert!(matches!(
            mock.verify(|| sample(&calls)),
            Err(Error::Verification(_))
        ));
    }

    #[test]
    fn test_verify_without_invocation_reports_missing() {
        let (mock, _calls, progress) = setup();

        let err = mock.verify(|| ()).unwrap_err();
        assert!(matches!(err, Error::MissingInvocation(_)));
        assert!(progress.borrow().validate_state().is_ok());
    }

    // Reset clears history; verify_no_interactions reflects that.
    #[test]
    fn test_reset_then_no_interactions() {
        let (mock, calls, _progress) = setup();
        sample(&calls);

        assert!(mock.verify_no_interactions().is_err());
        mock.reset().unwrap();
        mock.verify_no_interactions().unwrap();
    }

    #[test]
    fn test_reset_discards_stubbed_behavior() {
        let (mock, calls, _progress) = setup();
        mock.when(|| sample(&calls))
            .unwrap()
            .then_return("x".to_string());

        mock.reset().unwrap();
        assert_eq!(sample(&calls), String::new());
    }

    #[test]
    fn test_stub_builder_held_across_reset_is_inert() {
        let (mock, calls, _progress) = setup();

        let stub = mock.when::<String, _>(|| sample(&calls)).unwrap();
        mock.reset().unwrap();

        // Configuring the orphaned builder must neither panic nor leak into
        // rules declared after the reset.
        let _stub = stub.then_return("stale".to_string());
        assert_eq!(sample(&calls), String::new());

        mock.when(|| sample(&calls))
            .unwrap()
            .then_return("fresh".to_string());
        assert_eq!(sample(&calls), "fresh");
    }

    #[test]
    fn test_clear_invocations_preserves_stubbed_behavior() {
        let (mock, calls, _progress) = setup();
        mock.when(|| sample(&calls))
            .unwrap()
            .then_return("x".to_string());
        sample(&calls);

        mock.clear_invocations().unwrap();
        mock.verify_no_interactions().unwrap();
        assert_eq!(sample(&calls), "x");
    }

    // Reset and clear refuse to run over a dirty tracker.
    #[test]
    fn test_reset_fails_mid_protocol() {
        let (mock, _calls, progress) = setup();

        let context =
            VerificationContext::new(mock.target_name(), Box::new(times(1)), vec![]);
        progress.borrow_mut().verification_started(context).unwrap();

        assert!(matches!(mock.reset(), Err(Error::Usage(_))));

        progress.borrow_mut().reset();
        mock.reset().unwrap();
    }

    #[test]
    fn test_clear_invocations_fails_mid_stubbing() {
        let (mock, _calls, progress) = setup();
        progress.borrow_mut().stubbing_started();

        assert!(matches!(mock.clear_invocations(), Err(Error::Usage(_))));
    }

    #[test]
    fn test_no_more_interactions_after_partial_verification() {
        let (mock, calls, _progress) = setup();
        sample(&calls);
        let _ = calls.invoke::<String>("other", vec![]);

        assert!(mock.verify_no_more_interactions().is_err());
        mock.verify(|| sample(&calls)).unwrap();
        assert!(mock.verify_no_more_interactions().is_err());
        mock.verify(|| {
            let _ = calls.invoke::<String>("other", vec![]);
        })
        .unwrap();
        mock.verify_no_more_interactions().unwrap();
    }

    // The end-to-end scenario from the crate's contract.
    #[test]
    fn test_full_session_scenario() {
        let (mock, calls, _progress) = setup();

        mock.when(|| sample(&calls))
            .unwrap()
            .then_return("x".to_string());
        assert_eq!(sample(&calls), "x");

        mock.verify(|| sample(&calls)).unwrap();

        mock.close().unwrap();
        assert!(matches!(mock.verify(|| sample(&calls)), Err(Error::Usage(_))));
    }

    #[test]
    fn test_two_handles_on_one_progress() {
        struct Other;

        let progress = MockingProgress::handle();
        let (mock_a, calls_a) = MockedStatic::<Utility>::activate(&progress);
        let (mock_b, calls_b) = MockedStatic::<Other>::activate(&progress);

        mock_a
            .when(|| sample(&calls_a))
            .unwrap()
            .then_return("a".to_string());
        mock_b
            .when(|| calls_b.invoke::<i32>("count", vec![]))
            .unwrap()
            .then_return(5);

        assert_eq!(sample(&calls_a), "a");
        assert_eq!(calls_b.invoke::<i32>("count", vec![]), Some(5));

        mock_a.verify(|| sample(&calls_a)).unwrap();
        mock_b
            .verify(|| calls_b.invoke::<i32>("count", vec![]))
            .unwrap();
    }
}
