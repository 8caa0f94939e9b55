//! The thread-confined progress tracker shared by every mock on a thread.
//!
//! [`MockingProgress`] is the single capture channel both protocols run
//! over: an intercepted call lands in the pending-stub slot during ordinary
//! execution, or consumes the armed verification context when one is set.
//! The tracker is deliberately unsynchronized; it travels behind a
//! [`ProgressHandle`] (`Rc<RefCell<_>>`), is passed explicitly to every mock
//! activation, and each operation takes only a short exclusive borrow. The
//! `Rc` also makes every handle `!Send`, so the single-thread contract holds
//! by construction.
//!
//! # Example
//!
//! ```rust
//! use staticmock::progress::MockingProgress;
//!
//! let progress = MockingProgress::handle();
//! assert!(progress.borrow().validate_state().is_ok());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::invocation::{ContainerHandle, InvocationRef};
use crate::verification::{VerificationContext, VerificationListener, VerificationMode};

/// Shared handle to the tracker for one thread's mocks.
pub type ProgressHandle = Rc<RefCell<MockingProgress>>;

/// A call captured for stubbing: the record plus the container it lives in.
pub struct StubCapture {
    container: ContainerHandle,
    record: InvocationRef,
}

impl StubCapture {
    /// Capture `record` together with its owning container.
    #[must_use]
    pub fn new(container: ContainerHandle, record: InvocationRef) -> Self {
        Self { container, record }
    }

    /// The container the captured call was recorded in.
    #[must_use]
    pub fn container(&self) -> &ContainerHandle {
        &self.container
    }

    /// The captured call record.
    #[must_use]
    pub fn record(&self) -> &InvocationRef {
        &self.record
    }
}

/// Tracks whether stubbing or verification is currently in progress and
/// holds the most recently captured pending stub or armed verification.
#[derive(Default)]
pub struct MockingProgress {
    stubbing_in_progress: bool,
    ongoing_stub: Option<StubCapture>,
    verification: Option<VerificationContext>,
    listeners: Vec<Rc<dyn VerificationListener>>,
}

impl MockingProgress {
    /// Create a fresh tracker behind a shared handle.
    ///
    /// Tests typically create one per test function and pass it to every
    /// mock they activate.
    #[must_use]
    pub fn handle() -> ProgressHandle {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Mark the start of a stubbing declaration.
    pub fn stubbing_started(&mut self) {
        self.stubbing_in_progress = true;
    }

    /// Mark the stubbing declaration as concluded.
    pub fn stubbing_completed(&mut self) {
        self.stubbing_in_progress = false;
    }

    /// Store the most recent intercepted call as the pending stub.
    ///
    /// Every ordinary intercepted call lands here; only a `when` call
    /// consumes it.
    pub fn register_ongoing_stub(&mut self, capture: StubCapture) {
        self.ongoing_stub = Some(capture);
    }

    /// Read and clear the pending stub slot.
    pub fn pull_ongoing_stub(&mut self) -> Option<StubCapture> {
        self.ongoing_stub.take()
    }

    /// Drop any pending stub without consuming it.
    pub fn reset_ongoing_stubbing(&mut self) {
        self.ongoing_stub = None;
    }

    /// Arm the channel for verification.
    ///
    /// Any stale pending stub is discarded so it cannot leak into a later
    /// stubbing declaration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] when a previous protocol is still armed.
    pub fn verification_started(&mut self, context: VerificationContext) -> Result<()> {
        self.validate_state()?;
        self.reset_ongoing_stubbing();
        self.verification = Some(context);
        Ok(())
    }

    /// Read and clear the armed verification context.
    pub fn take_verification_context(&mut self) -> Option<VerificationContext> {
        self.verification.take()
    }

    /// Resolve a possibly-lazy mode into its effective policy.
    pub fn resolve_lazy_mode(&self, mode: Box<dyn VerificationMode>) -> Box<dyn VerificationMode> {
        let mut mode = mode;
        while let Some(resolved) = mode.resolve_lazily() {
            mode = resolved;
        }
        mode
    }

    /// Fail unless the tracker is in a clean state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] when a stubbing declaration or a
    /// verification is still in progress.
    pub fn validate_state(&self) -> Result<()> {
        if self.stubbing_in_progress {
            return Err(Error::usage(
                "unfinished stubbing detected: a previous when() did not conclude",
            ));
        }
        if let Some(context) = &self.verification {
            return Err(Error::usage(format!(
                "unfinished verification detected: a verification of `{}` was started \
                 but no mocked function was invoked",
                context.target()
            )));
        }
        Ok(())
    }

    /// Return the tracker to its pristine state.
    pub fn reset(&mut self) {
        self.stubbing_in_progress = false;
        self.ongoing_stub = None;
        self.verification = None;
    }

    /// Register a framework-wide verification listener.
    pub fn add_verification_listener(&mut self, listener: Rc<dyn VerificationListener>) {
        self.listeners.push(listener);
    }

    /// The listeners bound into every verification context.
    #[must_use]
    pub fn verification_listeners(&self) -> Vec<Rc<dyn VerificationListener>> {
        self.listeners.clone()
    }
}
