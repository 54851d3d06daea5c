//! Runtime collaborator contract
//!
//! The device runtime owns the registry, the transport and the processing
//! loop. The facade only hands it normalized bindings and forwards
//! lifecycle calls.

use oak_core::{CloudResult, DeviceId, OutboundEvent};

use crate::{EventSubscription, FunctionBinding, VariableBinding};

/// Registration, event and lifecycle entry points of a device runtime
///
/// Fallible calls report their cause through [`oak_core::CloudError`];
/// the facade collapses them to `bool`. How duplicate names, limits and
/// matching order are handled is up to the implementation.
pub trait CloudRuntime: ControlChannel {
    /// Prepare the runtime; `system_context` is set when called by system code
    fn initialize(&mut self, system_context: bool);

    fn register_variable(&mut self, binding: VariableBinding) -> CloudResult<()>;

    fn register_function(&mut self, binding: FunctionBinding) -> CloudResult<()>;

    fn publish_event(&mut self, event: &OutboundEvent) -> CloudResult<()>;

    fn register_subscription(&mut self, subscription: EventSubscription) -> CloudResult<()>;

    /// Drop every subscription held by the runtime
    fn clear_subscriptions(&mut self);

    /// Start connecting; `internal` marks a connect issued by system code
    fn connect(&mut self, internal: bool) -> bool;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Run one pass of the processing loop: service remote reads, function
    /// calls and inbound events
    fn pump(&mut self);

    /// Request a time synchronization from the cloud
    fn sync_time(&mut self) -> bool;

    fn is_claimed(&self) -> bool;

    /// Device public key, PEM encoded
    fn public_key(&self) -> String;

    fn provision_keys(&mut self, force: bool) -> bool;

    fn device_id(&self) -> DeviceId;
}

/// Byte stream over the runtime's control channel
pub trait ControlChannel {
    fn begin(&mut self) {}

    /// Queue one byte, returning the number of bytes accepted
    fn write_byte(&mut self, byte: u8) -> usize;

    /// Bytes ready to read
    fn available(&self) -> usize;

    fn read_byte(&mut self) -> Option<u8>;

    fn peek_byte(&self) -> Option<u8>;

    fn flush(&mut self);

    fn end(&mut self) {}
}
