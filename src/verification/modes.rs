//! Built-in verification policies.
//!
//! [`times`] is the default mode used by `verify`; [`no_interactions`] and
//! [`no_more_interactions`] back the whole-mock checks. [`lazily`] wraps a
//! mode that should only be built at verification time.

use crate::error::{Error, Result};

use super::{VerificationData, VerificationMode};

/// Expect exactly `wanted` matching invocations.
pub fn times(wanted: usize) -> Times {
    Times { wanted }
}

/// Expect no matching invocation at all. Shorthand for `times(0)`.
pub fn never() -> Times {
    Times { wanted: 0 }
}

/// Expect at least `wanted` matching invocations.
pub fn at_least(wanted: usize) -> AtLeast {
    AtLeast { wanted }
}

/// Expect at most `wanted` matching invocations.
pub fn at_most(wanted: usize) -> AtMost {
    AtMost { wanted }
}

/// Expect the recorder to hold no invocations whatsoever.
#[must_use]
pub fn no_interactions() -> NoInteractions {
    NoInteractions
}

/// Expect every recorded invocation to have been verified already.
#[must_use]
pub fn no_more_interactions() -> NoMoreInteractions {
    NoMoreInteractions
}

/// Defer mode construction until verification actually starts.
///
/// The wrapped builder runs when the progress tracker resolves the mode,
/// immediately before it is armed.
pub fn lazily<F>(build: F) -> Lazily
where
    F: Fn() -> Box<dyn VerificationMode> + 'static,
{
    Lazily {
        build: Box::new(build),
    }
}

/// Exact-count policy.
pub struct Times {
    wanted: usize,
}

impl VerificationMode for Times {
    fn verify(&self, data: &VerificationData) -> Result<()> {
        let matching = data.matching()?;
        if matching.len() != self.wanted {
            let wanted_call = data.wanted().map(ToString::to_string).unwrap_or_default();
            return Err(Error::verification(format!(
                "wanted {} invocation(s) of `{}` but recorded {}",
                self.wanted,
                wanted_call,
                matching.len()
            )));
        }
        for invocation in matching {
            invocation.mark_verified();
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("exactly {} invocation(s)", self.wanted)
    }
}

/// Lower-bound count policy.
pub struct AtLeast {
    wanted: usize,
}

impl VerificationMode for AtLeast {
    fn verify(&self, data: &VerificationData) -> Result<()> {
        let matching = data.matching()?;
        if matching.len() < self.wanted {
            let wanted_call = data.wanted().map(ToString::to_string).unwrap_or_default();
            return Err(Error::verification(format!(
                "wanted at least {} invocation(s) of `{}` but recorded {}",
                self.wanted,
                wanted_call,
                matching.len()
            )));
        }
        for invocation in matching {
            invocation.mark_verified();
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("at least {} invocation(s)", self.wanted)
    }
}

/// Upper-bound count policy.
pub struct AtMost {
    wanted: usize,
}

impl VerificationMode for AtMost {
    fn verify(&self, data: &VerificationData) -> Result<()> {
        let matching = data.matching()?;
        if matching.len() > self.wanted {
            let wanted_call = data.wanted().map(ToString::to_string).unwrap_or_default();
            return Err(Error::verification(format!(
                "wanted at most {} invocation(s) of `{}` but recorded {}",
                self.wanted,
                wanted_call,
                matching.len()
            )));
        }
        for invocation in matching {
            invocation.mark_verified();
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("at most {} invocation(s)", self.wanted)
    }
}

/// Whole-mock policy: the recorder must be empty.
pub struct NoInteractions;

impl VerificationMode for NoInteractions {
    fn verify(&self, data: &VerificationData) -> Result<()> {
        let recorded = data.invocations();
        if let Some(first) = recorded.first() {
            return Err(Error::verification(format!(
                "wanted no interactions but recorded {}, first was `{first}`",
                recorded.len()
            )));
        }
        Ok(())
    }

    fn description(&self) -> String {
        "no interactions".to_string()
    }
}

/// Whole-mock policy: every recorded call must already be verified.
pub struct NoMoreInteractions;

impl VerificationMode for NoMoreInteractions {
    fn verify(&self, data: &VerificationData) -> Result<()> {
        let unverified = data.unverified();
        if let Some(first) = unverified.first() {
            return Err(Error::verification(format!(
                "found {} unverified interaction(s), first was `{first}`",
                unverified.len()
            )));
        }
        Ok(())
    }

    fn description(&self) -> String {
        "no more interactions".to_string()
    }
}

/// Wrapper around a mode built on demand.
pub struct Lazily {
    build: Box<dyn Fn() -> Box<dyn VerificationMode>>,
}

impl VerificationMode for Lazily {
    fn verify(&self, data: &VerificationData) -> Result<()> {
        // Normally resolved away before arming; building here keeps an
        // unresolved wrapper functional.
        (self.build)().verify(data)
    }

    fn description(&self) -> String {
        format!("lazily resolved: {}", (self.build)().description())
    }

    fn resolve_lazily(&self) -> Option<Box<dyn VerificationMode>> {
        Some((self.build)())
    }
}
