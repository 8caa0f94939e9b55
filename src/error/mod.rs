//! Error definitions
//!
//! This module provides the error taxonomy for staticmock. Every failure
//! message is self-contained: it names the mocked type and, where the root
//! cause is ambiguous, shows example usage, so a test failure is diagnosable
//! without reading this crate's internals.

use thiserror::Error;

/// Main error type for staticmock.
///
/// The variants form the classification boundary used by the verification
/// protocol: [`Error::Usage`], [`Error::MissingInvocation`] and
/// [`Error::Verification`] are the framework's own failure families and are
/// always surfaced unchanged, while anything else escaping a verification
/// trigger is wrapped into [`Error::UnexpectedTrigger`].
#[derive(Error, Debug)]
pub enum Error {
    /// The handle was misused: an operation ran on a released handle, a
    /// handle was released twice, or a reset ran mid-protocol.
    #[error("Invalid use of static mock: {0}")]
    Usage(String),

    /// A stubbing or verification trigger never invoked a mocked function
    /// of the target type.
    #[error("Missing invocation: {0}")]
    MissingInvocation(String),

    /// A verification policy found an expectation unmet.
    #[error("Verification failed: {0}")]
    Verification(String),

    /// An unrelated panic escaped a verification trigger.
    #[error(
        "An unexpected error occurred while verifying a static stub: {detail}\n\
         \n\
         To correctly verify a stub, invoke a single mocked function of `{target}` \
         inside the provided closure.\n\
         For example, if a function `sample` was mocked, pass a closure containing the call\n\
         \n\
         || {short}::sample(&surface)\n\
         or the equivalent function path\n\
         {short}::sample"
    )]
    UnexpectedTrigger {
        /// Full name of the mocked type.
        target: String,
        /// Last path segment of the mocked type, used in the examples.
        short: String,
        /// Message recovered from the escaped panic.
        detail: String,
    },
}

impl Error {
    /// Create a usage error.
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Create a missing-invocation error.
    #[must_use]
    pub fn missing_invocation(message: impl Into<String>) -> Self {
        Self::MissingInvocation(message.into())
    }

    /// Create a verification failure.
    #[must_use]
    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification(message.into())
    }

    /// Wrap an unrelated trigger failure with usage guidance for `target`.
    #[must_use]
    pub fn unexpected_trigger(target: &str, detail: impl Into<String>) -> Self {
        Self::UnexpectedTrigger {
            target: target.to_string(),
            short: short_type_name(target).to_string(),
            detail: detail.into(),
        }
    }

    /// Whether this error is a genuine verification outcome (as opposed to a
    /// wrapped, unrelated failure).
    #[must_use]
    pub fn is_verification_failure(&self) -> bool {
        matches!(self, Self::Verification(_) | Self::MissingInvocation(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Strip module path segments from a fully qualified type name.
#[must_use]
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("my_crate::util::Utility"), "Utility");
        assert_eq!(short_type_name("Utility"), "Utility");
    }

    #[test]
    fn test_unexpected_trigger_message_guidance() {
        let err = Error::unexpected_trigger("my_crate::Utility", "boom");
        let message = err.to_string();
        assert!(message.contains("my_crate::Utility"));
        assert!(message.contains("|| Utility::sample(&surface)"));
        assert!(message.contains("Utility::sample"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn test_classification() {
        assert!(Error::verification("count mismatch").is_verification_failure());
        assert!(Error::missing_invocation("nothing captured").is_verification_failure());
        assert!(!Error::usage("already released").is_verification_failure());
        assert!(!Error::unexpected_trigger("T", "x").is_verification_failure());
    }

    #[test]
    fn test_display_prefixes() {
        assert!(Error::usage("x").to_string().starts_with("Invalid use"));
        assert!(Error::verification("x")
            .to_string()
            .starts_with("Verification failed"));
    }
}
