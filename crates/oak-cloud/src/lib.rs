//! Oak Cloud - Typed registration facade for device runtimes
//!
//! Application code exposes state, callable functions and event handlers
//! to a connectivity runtime through [`Cloud`]:
//! 1. Variables: shared storage resolved to one primitive kind at compile time
//! 2. Functions: `FnMut(&str) -> i32` callables or bound instance methods
//! 3. Events: publish, prefix subscriptions with scope or device filters
//! 4. Lifecycle and control-channel calls forwarded to the runtime
//!
//! The runtime itself is injected through the [`CloudRuntime`] trait.
//! Building without the `cloud` feature turns every cloud entry point into
//! a no-op that returns `false`.

pub mod runtime;
pub mod variable;
pub mod function;
pub mod subscribe;
pub mod cloud;
pub mod stream;

pub use runtime::*;
pub use variable::*;
pub use function::*;
pub use subscribe::*;
pub use cloud::*;

pub use oak_core::{
    CloudError, CloudResult, DeviceId, InboundEvent, KindTag, OutboundEvent, PrimitiveKind, Scope,
    SubscriptionFilter, VariableValue, Visibility, BOOLEAN, DOUBLE, INT, STRING,
};

/// Whether cloud entry points reach the runtime in this build
pub const CLOUD_ENABLED: bool = cfg!(feature = "cloud");
