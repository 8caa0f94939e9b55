//! The interception layer: control and dispatch for one mocked type.
//!
//! [`StaticMockControl`] owns the on/off switch for a target's mocked
//! surface and is held exclusively by the scoped mock handle. Its cloneable
//! counterpart [`StaticSurface`] is the dispatch end: the test's stand-in
//! for the mocked type routes every class-level call through
//! [`StaticSurface::invoke`], which records the call, serves stubbed
//! answers, and runs armed verifications.

mod settings;

pub use settings::{MockIntrospection, MockSettings, VerificationStartedListener};

use std::cell::Cell;
use std::marker::PhantomData;
use std::panic::panic_any;
use std::rc::Rc;

use crate::invocation::{ContainerHandle, InvocationContainer, InvocationMatcher};
use crate::progress::{ProgressHandle, StubCapture};
use crate::verification::{VerificationData, VerificationEvent};

/// State shared between a control and its surfaces.
struct InterceptState {
    enabled: Cell<bool>,
    disable_calls: Cell<u32>,
}

/// The on/off switch for one target type's mocked surface.
///
/// Exclusively owned by the scoped mock handle; disabling it is the handle's
/// teardown action and nothing else is permitted to do so.
pub struct StaticMockControl<T> {
    state: Rc<InterceptState>,
    container: ContainerHandle,
    settings: Rc<MockSettings>,
    _target: PhantomData<T>,
}

impl<T: 'static> StaticMockControl<T> {
    /// Create an enabled control and its dispatch surface.
    pub(crate) fn new(
        progress: ProgressHandle,
        settings: MockSettings,
    ) -> (Self, StaticSurface<T>) {
        let state = Rc::new(InterceptState {
            enabled: Cell::new(true),
            disable_calls: Cell::new(0),
        });
        let container = InvocationContainer::handle();
        let surface = StaticSurface {
            state: Rc::clone(&state),
            container: Rc::clone(&container),
            progress,
            _target: PhantomData,
        };
        let control = Self {
            state,
            container,
            settings: Rc::new(settings),
            _target: PhantomData,
        };
        (control, surface)
    }

    /// Full name of the mocked type.
    #[must_use]
    pub fn target_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    /// Stop intercepting; surfaces become inert.
    pub fn disable(&self) {
        self.state.enabled.set(false);
        self.state.disable_calls.set(self.state.disable_calls.get() + 1);
    }

    /// Whether the surface is still intercepting.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.enabled.get()
    }

    #[cfg(test)]
    pub(crate) fn disable_calls(&self) -> u32 {
        self.state.disable_calls.get()
    }

    pub(crate) fn container(&self) -> &ContainerHandle {
        &self.container
    }

    pub(crate) fn settings(&self) -> &MockSettings {
        &self.settings
    }

    /// Resolve the read-only introspection view of this mock.
    #[must_use]
    pub fn introspection(&self) -> MockIntrospection {
        MockIntrospection::new(
            self.target_name(),
            self.settings.name(),
            self.container.borrow().len(),
        )
    }
}

/// The dispatch end handed to the test's stand-in for the mocked type.
///
/// Cloneable so it can be captured by triggers and by the stand-in itself;
/// all clones share one recorder and one switch.
///
/// # Example
///
/// ```rust
/// use staticmock::mock::MockedStatic;
/// use staticmock::progress::MockingProgress;
///
/// struct Utility;
///
/// let progress = MockingProgress::handle();
/// let (mock, calls) = MockedStatic::<Utility>::activate(&progress);
///
/// // Unstubbed calls answer None and are recorded.
/// assert_eq!(calls.invoke::<String>("sample", vec![]), None);
/// mock.verify(|| calls.invoke::<String>("sample", vec![])).unwrap();
/// ```
pub struct StaticSurface<T> {
    state: Rc<InterceptState>,
    container: ContainerHandle,
    progress: ProgressHandle,
    _target: PhantomData<T>,
}

impl<T> Clone for StaticSurface<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            container: Rc::clone(&self.container),
            progress: Rc::clone(&self.progress),
            _target: PhantomData,
        }
    }
}

impl<T: 'static> StaticSurface<T> {
    /// Full name of the mocked type.
    #[must_use]
    pub fn target_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    /// Whether calls through this surface are still intercepted.
    #[must_use]
    pub fn is_intercepting(&self) -> bool {
        self.state.enabled.get()
    }

    /// Dispatch one class-level call through the mock.
    ///
    /// Ordinary calls are recorded, registered as the pending stub, and
    /// answered from the matching stub rule; `None` means unstubbed (the
    /// stand-in decides the fallback, typically a default value). When a
    /// verification context is armed this call consumes it instead, runs the
    /// policy against a recorder snapshot, and propagates any failure as a
    /// panic through the caller's trigger.
    ///
    /// A disabled surface is inert: nothing is recorded and `None` is
    /// returned so callers fall back to real behavior.
    #[must_use]
    pub fn invoke<R: 'static>(&self, method: &str, args: Vec<String>) -> Option<R> {
        if !self.state.enabled.get() {
            return None;
        }

        let armed = self.progress.borrow_mut().take_verification_context();
        if let Some(context) = armed {
            self.run_verification(context, method, args);
            return None;
        }

        let record = self.container.borrow_mut().record(method, args);
        self.progress
            .borrow_mut()
            .register_ongoing_stub(StubCapture::new(
                Rc::clone(&self.container),
                Rc::clone(&record),
            ));

        let answer = self.container.borrow_mut().answer_for(&record)?;
        answer.downcast::<R>().ok().map(|boxed| *boxed)
    }

    fn run_verification(
        &self,
        context: crate::verification::VerificationContext,
        method: &str,
        args: Vec<String>,
    ) {
        let wanted = InvocationMatcher::new(method, args);
        let data = VerificationData::new(self.container.borrow().snapshot(), Some(wanted));
        let (target, mode, listeners) = context.into_parts();

        let outcome = mode.verify(&data);
        let event = VerificationEvent::new(&target, &mode.description(), outcome.as_ref().err());
        for listener in &listeners {
            listener.on_verification(&event);
        }
        if let Err(err) = outcome {
            // The stand-in cannot return a Result; the failure unwinds
            // through the user trigger and is classified by verify().
            panic_any(err);
        }
    }
}
