//! Invocation records and per-target bookkeeping.
//!
//! An [`Invocation`] is one intercepted call to a mocked class-level
//! function. The [`InvocationContainer`] keeps the call history and the
//! configured stub rules for one target type; verification snapshots and
//! stub answers are both served from it.

mod container;
mod record;

pub use container::{Answer, ContainerHandle, InvocationContainer, StubRule, StubRuleHandle};
pub use record::{Invocation, InvocationMatcher, InvocationRef};
