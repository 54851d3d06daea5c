//! Subscription scopes and filters
//!
//! A subscription matches an inbound event when the event name starts with
//! the subscription prefix and the event source passes the filter. Prefix
//! matching is purely lexical: `"door"` matches `"door/open"` and also
//! `"doorbell"`. The empty prefix matches every event.

use crate::{DeviceId, InboundEvent, Visibility};

/// Broadcast class a subscription listens to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Scope {
    /// Public events from any device
    #[default]
    AllDevices = 0x00,
    /// Public and private events from this account's devices
    MyDevices = 0x01,
}

/// Source filter for a subscription: a scope or a single device, never both
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionFilter {
    Scope(Scope),
    Device(DeviceId),
}

impl Default for SubscriptionFilter {
    fn default() -> Self {
        SubscriptionFilter::Scope(Scope::AllDevices)
    }
}

impl From<Scope> for SubscriptionFilter {
    fn from(scope: Scope) -> Self {
        SubscriptionFilter::Scope(scope)
    }
}

impl From<DeviceId> for SubscriptionFilter {
    fn from(device: DeviceId) -> Self {
        SubscriptionFilter::Device(device)
    }
}

impl SubscriptionFilter {
    /// Does an event from this source pass the filter?
    pub fn accepts(&self, event: &InboundEvent) -> bool {
        match self {
            SubscriptionFilter::Scope(Scope::AllDevices) => event.visibility == Visibility::Public,
            SubscriptionFilter::Scope(Scope::MyDevices) => event.owned,
            SubscriptionFilter::Device(id) => event.source == *id,
        }
    }

    /// Device this filter is pinned to, if any
    pub fn device(&self) -> Option<DeviceId> {
        match self {
            SubscriptionFilter::Device(id) => Some(*id),
            SubscriptionFilter::Scope(_) => None,
        }
    }
}

/// Lexical prefix match of an event name
#[inline]
pub fn prefix_matches(prefix: &str, event_name: &str) -> bool {
    event_name.starts_with(prefix)
}

/// Full match: prefix and source filter
pub fn subscription_matches(prefix: &str, filter: &SubscriptionFilter, event: &InboundEvent) -> bool {
    prefix_matches(prefix, &event.name) && filter.accepts(event)
}
