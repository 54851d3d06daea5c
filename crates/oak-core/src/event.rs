//! Event definitions
//!
//! Outbound events are published by the device; inbound events arrive from
//! other devices and are routed to subscriptions by the runtime.

use crate::DeviceId;

/// Default time-to-live for published events, in seconds
pub const DEFAULT_TTL: u32 = 60;

/// Who may receive a published event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Visibility {
    /// Delivered to any subscriber
    #[default]
    Public = 0x00,
    /// Delivered only to devices owned by the same account
    Private = 0x01,
}

/// Event published by this device
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundEvent {
    pub name: String,
    pub data: Option<String>,
    pub ttl: u32,
    pub visibility: Visibility,
}

impl OutboundEvent {
    /// Public event with no data and the default TTL
    pub fn new(name: impl Into<String>) -> Self {
        OutboundEvent {
            name: name.into(),
            data: None,
            ttl: DEFAULT_TTL,
            visibility: Visibility::Public,
        }
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn private(self) -> Self {
        self.visibility(Visibility::Private)
    }

    /// Size of the data payload in bytes
    pub fn data_len(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.len())
    }
}

/// Event received from the cloud
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundEvent {
    pub name: String,
    pub data: Option<String>,
    /// Device that published the event
    pub source: DeviceId,
    pub visibility: Visibility,
    /// Source device belongs to the same account as this device
    pub owned: bool,
}

impl InboundEvent {
    /// Public event from a device owned by someone else
    pub fn new(name: impl Into<String>, source: DeviceId) -> Self {
        InboundEvent {
            name: name.into(),
            data: None,
            source,
            visibility: Visibility::Public,
            owned: false,
        }
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Mark the source as one of this account's devices
    pub fn owned(mut self) -> Self {
        self.owned = true;
        self
    }

    /// Private event; implies an owned source
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self.owned = true;
        self
    }
}
