// Allow must_use_candidate since most items here are consumed for their
// side effects inside the verification protocol
#![allow(clippy::must_use_candidate)]

//! Verification policies and the data they run against.
//!
//! A [`VerificationMode`] encodes an expectation about recorded calls
//! (`exactly n`, `at least n`, "nothing unverified", ...). The scoped mock
//! handle never decides pass/fail itself; it snapshots the recorder into a
//! [`VerificationData`] and hands it to the mode.
//!
//! # Example
//!
//! ```rust
//! use staticmock::invocation::{Invocation, InvocationMatcher};
//! use staticmock::verification::{times, VerificationData, VerificationMode};
//!
//! let history = vec![Invocation::new("sample", vec![])];
//! let wanted = InvocationMatcher::new("sample", vec![]);
//! let data = VerificationData::new(history, Some(wanted));
//!
//! assert!(times(1).verify(&data).is_ok());
//! assert!(times(2).verify(&data).is_err());
//! ```

mod modes;

pub use modes::{
    at_least, at_most, lazily, never, no_interactions, no_more_interactions, times, AtLeast,
    AtMost, Lazily, NoInteractions, NoMoreInteractions, Times,
};

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::invocation::{InvocationMatcher, InvocationRef};

/// An expectation about recorded invocations.
///
/// Modes are strategy objects: [`verify`](VerificationMode::verify) throws a
/// [`Error::Verification`] on an unmet expectation and returns `Ok(())`
/// otherwise. Count-checking modes mark the invocations they accounted for as
/// verified, which is what [`no_more_interactions`] later keys on.
pub trait VerificationMode {
    /// Check the expectation against a recorder snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Verification`] when the expectation is unmet, or
    /// [`Error::Usage`] when the mode was handed data it cannot interpret.
    fn verify(&self, data: &VerificationData) -> Result<()>;

    /// Human-readable description of the expectation.
    fn description(&self) -> String;

    /// Hook for modes whose real policy is built on demand.
    ///
    /// Returns `Some` with the effective mode for wrappers such as
    /// [`lazily`]; plain modes return `None`. The progress tracker resolves
    /// this before the mode is armed.
    fn resolve_lazily(&self) -> Option<Box<dyn VerificationMode>> {
        None
    }
}

/// A point-in-time view of the recorder, paired with the wanted invocation.
///
/// The invocation list is copied but the records are shared, so marking a
/// record verified through one snapshot is observed by later snapshots.
pub struct VerificationData {
    invocations: Vec<InvocationRef>,
    wanted: Option<InvocationMatcher>,
}

impl VerificationData {
    /// Build verification data from a snapshot and an optional target call.
    ///
    /// `wanted` is `None` for whole-mock checks such as [`no_interactions`].
    #[must_use]
    pub fn new(invocations: Vec<InvocationRef>, wanted: Option<InvocationMatcher>) -> Self {
        Self {
            invocations,
            wanted,
        }
    }

    /// The call being verified, if this is a targeted check.
    pub fn wanted(&self) -> Option<&InvocationMatcher> {
        self.wanted.as_ref()
    }

    /// All snapshotted invocations.
    pub fn invocations(&self) -> &[InvocationRef] {
        &self.invocations
    }

    /// Invocations matching the wanted call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] when no wanted call was supplied.
    pub fn matching(&self) -> Result<Vec<&InvocationRef>> {
        let wanted = self.wanted.as_ref().ok_or_else(|| {
            Error::usage("a count-based verification mode requires a wanted invocation")
        })?;
        Ok(self
            .invocations
            .iter()
            .filter(|inv| wanted.matches(inv))
            .collect())
    }

    /// Invocations no verification mode has accounted for yet.
    pub fn unverified(&self) -> Vec<&InvocationRef> {
        self.invocations
            .iter()
            .filter(|inv| !inv.is_verified())
            .collect()
    }
}

/// The armed binding of one verification: target, effective mode, listeners.
///
/// Mirrors the stubbing capture on the other half of the shared channel: it
/// is placed into the progress tracker when verification starts and consumed
/// (read-and-cleared) by the first intercepted call.
pub struct VerificationContext {
    target: String,
    mode: Box<dyn VerificationMode>,
    listeners: Vec<Rc<dyn VerificationListener>>,
}

impl VerificationContext {
    /// Bind a mode to a target together with the current listeners.
    #[must_use]
    pub fn new(
        target: impl Into<String>,
        mode: Box<dyn VerificationMode>,
        listeners: Vec<Rc<dyn VerificationListener>>,
    ) -> Self {
        Self {
            target: target.into(),
            mode,
            listeners,
        }
    }

    /// Name of the type under verification.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Decompose into target, mode and listeners.
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        String,
        Box<dyn VerificationMode>,
        Vec<Rc<dyn VerificationListener>>,
    ) {
        (self.target, self.mode, self.listeners)
    }
}

/// Outcome of one verification run, handed to [`VerificationListener`]s.
#[derive(Clone, Debug)]
pub struct VerificationEvent {
    target: String,
    mode: String,
    error: Option<String>,
}

impl VerificationEvent {
    /// Build an event for `target` checked with `mode`.
    #[must_use]
    pub fn new(target: &str, mode: &str, error: Option<&Error>) -> Self {
        Self {
            target: target.to_string(),
            mode: mode.to_string(),
            error: error.map(ToString::to_string),
        }
    }

    /// Name of the verified type.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Description of the mode that ran.
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Whether the verification passed.
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }

    /// The failure message, when the verification failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Observer of verification outcomes, registered on the progress tracker.
pub trait VerificationListener {
    /// Called after a mode ran, pass or fail.
    fn on_verification(&self, event: &VerificationEvent);
}
