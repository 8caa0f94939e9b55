//! Mock configuration and the introspection view handed to listeners.

use std::rc::Rc;

/// A read-only summary of one active mock, resolved on demand.
///
/// This is what verification-started listeners receive: enough to identify
/// the mock and see how much history it carries, without any way to mutate
/// its state.
#[derive(Clone, Debug)]
pub struct MockIntrospection {
    target: String,
    name: Option<String>,
    invocations: usize,
}

impl MockIntrospection {
    pub(crate) fn new(target: &str, name: Option<&str>, invocations: usize) -> Self {
        Self {
            target: target.to_string(),
            name: name.map(ToString::to_string),
            invocations,
        }
    }

    /// Full name of the mocked type.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The configured mock name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of currently recorded invocations.
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.invocations
    }
}

/// Observer notified when a verification is about to run on a mock.
///
/// Notification is fire-and-forget: listener panics are not suppressed.
pub trait VerificationStartedListener {
    /// Called before the verification context is armed.
    fn on_verification_started(&self, introspection: &MockIntrospection);
}

/// Per-mock configuration supplied at activation.
#[derive(Clone, Default)]
pub struct MockSettings {
    name: Option<String>,
    verification_started_listeners: Vec<Rc<dyn VerificationStartedListener>>,
}

impl MockSettings {
    /// Start from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Give the mock a name used in introspection.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register a listener notified at every verification start.
    #[must_use]
    pub fn verification_started_listener(
        mut self,
        listener: Rc<dyn VerificationStartedListener>,
    ) -> Self {
        self.verification_started_listeners.push(listener);
        self
    }

    /// The configured mock name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The registered verification-started listeners.
    #[must_use]
    pub fn verification_started_listeners(&self) -> &[Rc<dyn VerificationStartedListener>] {
        &self.verification_started_listeners
    }
}
