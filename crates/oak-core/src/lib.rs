//! Oak Core - Fundamental types for cloud-connected device applications
//!
//! This crate defines the types shared between the registration facade
//! and the device runtimes it talks to:
//! - Primitive kinds and kind tags (Boolean, Int, Double, String)
//! - Variable value snapshots
//! - Device identifiers
//! - Outbound and inbound events
//! - Subscription scopes and filters
//! - Error types

pub mod kind;
pub mod value;
pub mod id;
pub mod event;
pub mod subscription;
pub mod error;

pub use kind::*;
pub use value::*;
pub use id::*;
pub use event::*;
pub use subscription::*;
pub use error::*;
