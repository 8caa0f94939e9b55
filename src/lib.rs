//! # staticmock 🧰
//!
//! > Scoped mocking of class-level functions for Rust tests
//!
//! **staticmock** lets a test temporarily replace a type's class-level
//! (associated) functions with configurable behavior, verify how they were
//! called, and restore everything when the scope ends.
//!
//! A mocking session is three pieces working together:
//!
//! - a [`progress::MockingProgress`] tracker, one per test, shared by every
//!   mock on the thread;
//! - a [`mock::MockedStatic`] handle per mocked type, owning the session's
//!   lifecycle (stub, verify, reset, close);
//! - a [`intercept::StaticSurface`] per mocked type, which the test's
//!   stand-in routes its class-level calls through.
//!
//! Stubbing and verification both use trigger closures: the closure makes
//! one call reach the mocked surface, and the handle interprets what that
//! call produced.
//!
//! ## Quick Start
//!
//! ```rust
//! use staticmock::prelude::*;
//!
//! struct Utility;
//!
//! impl Utility {
//!     fn sample(calls: &StaticSurface<Utility>) -> String {
//!         calls.invoke("sample", vec![]).unwrap_or_default()
//!     }
//! }
//!
//! let progress = MockingProgress::handle();
//! let (mock, calls) = MockedStatic::<Utility>::activate(&progress);
//!
//! mock.when(|| Utility::sample(&calls))
//!     .unwrap()
//!     .then_return("mocked".to_string());
//!
//! assert_eq!(Utility::sample(&calls), "mocked");
//! mock.verify(|| Utility::sample(&calls)).unwrap();
//!
//! mock.close().unwrap();
//! assert_eq!(Utility::sample(&calls), String::new()); // back to default
//! ```
//!
//! ## Features
//!
//! - 🎭 **Scoped mocking** - interception lives exactly as long as the handle
//! - 🧵 **Thread-confined** - handles are `!Send`; the contract is compile-checked
//! - 🔁 **Answer sequences** - chain `then_return` / `then_answer` / `then_panic`
//! - 🔍 **Verification modes** - `times`, `never`, `at_least`, `at_most`, lazy modes
//! - 👂 **Listeners** - observe verification starts and outcomes

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod intercept;
pub mod invocation;
pub mod mock;
pub mod progress;
pub mod stubbing;
pub mod verification;

/// Prelude for convenient imports
///
/// ```rust
/// use staticmock::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::intercept::{MockSettings, StaticSurface};
    pub use crate::mock::MockedStatic;
    pub use crate::progress::{MockingProgress, ProgressHandle};
    pub use crate::stubbing::OngoingStub;
    pub use crate::verification::{at_least, at_most, lazily, never, times, VerificationMode};
}

// Re-exports
pub use error::{Error, Result};
pub use mock::MockedStatic;
