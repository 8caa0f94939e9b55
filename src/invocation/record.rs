//! A single intercepted call and the matcher derived from it.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A record of one intercepted call to a mocked function.
///
/// Records are shared between the container's history and verification
/// snapshots, so a snapshot is a point-in-time copy of the *list* while the
/// verified flag on each record stays live.
#[derive(Debug)]
pub struct Invocation {
    method: String,
    args: Vec<String>,
    verified: Cell<bool>,
}

/// Shared reference to an [`Invocation`].
pub type InvocationRef = Rc<Invocation>;

impl Invocation {
    /// Create a record for a call to `method` with rendered `args`.
    #[must_use]
    pub fn new(method: impl Into<String>, args: Vec<String>) -> InvocationRef {
        Rc::new(Self {
            method: method.into(),
            args,
            verified: Cell::new(false),
        })
    }

    /// Name of the invoked function.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Rendered argument values.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether a verification mode has already accounted for this call.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified.get()
    }

    /// Mark this call as accounted for by a verification mode.
    pub fn mark_verified(&self) {
        self.verified.set(true);
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.method, self.args.join(", "))
    }
}

/// Matches invocations by method name and rendered arguments.
///
/// Built from the call captured during `when`/`verify`; equality on the
/// rendered argument form is the matching rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationMatcher {
    method: String,
    args: Vec<String>,
}

impl InvocationMatcher {
    /// Build a matcher for `method` with exact `args`.
    #[must_use]
    pub fn new(method: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// Derive a matcher from a captured invocation.
    #[must_use]
    pub fn from_invocation(invocation: &Invocation) -> Self {
        Self {
            method: invocation.method().to_string(),
            args: invocation.args().to_vec(),
        }
    }

    /// Name of the matched function.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Check whether `invocation` matches.
    #[must_use]
    pub fn matches(&self, invocation: &Invocation) -> bool {
        invocation.method() == self.method && invocation.args() == self.args.as_slice()
    }
}

impl fmt::Display for InvocationMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.method, self.args.join(", "))
    }
}
