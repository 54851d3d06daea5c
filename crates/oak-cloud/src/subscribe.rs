//! Event subscriptions
//!
//! A subscription pairs a name prefix and a source filter with a handler
//! taking `(event_name, event_data)`. Matching is lexical on the prefix;
//! see [`oak_core::prefix_matches`].

use std::fmt;
use std::sync::Arc;

use oak_core::{subscription_matches, InboundEvent, SubscriptionFilter};
use parking_lot::Mutex;

/// Handler shape expected by the runtime
pub type EventHandler = Box<dyn FnMut(&str, Option<&str>) + Send>;

/// Subscription handed to the runtime
pub struct EventSubscription {
    pub prefix: String,
    pub filter: SubscriptionFilter,
    handler: EventHandler,
}

impl EventSubscription {
    pub fn new<F>(prefix: impl Into<String>, filter: impl Into<SubscriptionFilter>, handler: F) -> Self
    where
        F: FnMut(&str, Option<&str>) + Send + 'static,
    {
        EventSubscription {
            prefix: prefix.into(),
            filter: filter.into(),
            handler: Box::new(handler),
        }
    }

    /// Adapt a two-argument method on a shared instance
    pub fn method<T>(
        prefix: impl Into<String>,
        filter: impl Into<SubscriptionFilter>,
        instance: &Arc<Mutex<T>>,
        method: fn(&mut T, &str, Option<&str>),
    ) -> Self
    where
        T: Send + 'static,
    {
        let instance = Arc::clone(instance);
        Self::new(prefix, filter, move |name: &str, data: Option<&str>| {
            method(&mut instance.lock(), name, data)
        })
    }

    /// Does this subscription want the event?
    pub fn matches(&self, event: &InboundEvent) -> bool {
        subscription_matches(&self.prefix, &self.filter, event)
    }

    /// Hand the event to the handler without checking the match
    pub fn deliver(&mut self, event: &InboundEvent) {
        (self.handler)(&event.name, event.data.as_deref())
    }

    /// Deliver if matching; returns whether the handler ran
    pub fn dispatch(&mut self, event: &InboundEvent) -> bool {
        if !self.matches(event) {
            return false;
        }
        self.deliver(event);
        true
    }
}

impl fmt::Debug for EventSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubscription")
            .field("prefix", &self.prefix)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
