//! Cloud facade
//!
//! [`Cloud`] is the single entry point application code talks to. It is
//! constructed once at startup around an injected runtime and torn down
//! with [`Cloud::shutdown`].

use std::sync::Arc;

use oak_core::{
    CloudError, CloudResult, DeviceId, KindTag, OutboundEvent, Scope, SubscriptionFilter,
    DEFAULT_TTL,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    CloudRuntime, EventSubscription, FunctionBinding, Variable, VariableBinding, VariableRef,
};

/// Facade configuration
#[derive(Clone, Debug)]
pub struct CloudConfig {
    /// Initialize the runtime as system code rather than user code
    pub system_context: bool,
    /// TTL applied by `publish` and `publish_data`, in seconds
    pub default_ttl: u32,
    /// Connect as part of construction
    pub auto_connect: bool,
}

impl Default for CloudConfig {
    fn default() -> Self {
        CloudConfig {
            system_context: false,
            default_ttl: DEFAULT_TTL,
            auto_connect: false,
        }
    }
}

/// Registration and lifecycle facade over a device runtime
pub struct Cloud<R> {
    runtime: R,
    config: CloudConfig,
}

impl<R: CloudRuntime> Cloud<R> {
    /// Create a facade with default configuration
    pub fn new(runtime: R) -> Self {
        Self::with_config(runtime, CloudConfig::default())
    }

    /// Create a facade and initialize the runtime
    pub fn with_config(runtime: R, config: CloudConfig) -> Self {
        let mut cloud = Cloud { runtime, config };
        let system_context = cloud.config.system_context;
        cloud.gated((), |rt| rt.initialize(system_context));
        if cloud.config.auto_connect {
            cloud.connect(false);
        }
        cloud
    }

    /// Revoke subscriptions, disconnect and hand the runtime back
    pub fn shutdown(mut self) -> R {
        self.unsubscribe();
        self.disconnect();
        info!("cloud facade shut down");
        self.runtime
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    /// Expose shared storage as a cloud variable, kind inferred from its type
    ///
    /// Accepts `&'static` references and `Arc`s to the storage types listed
    /// in [`crate::variable`]. Returns `false` if the runtime refuses the
    /// name or cloud support is compiled out.
    pub fn variable<V: VariableRef>(&mut self, name: &str, var: V) -> bool {
        let binding = VariableBinding::new(name, var);
        let kind = binding.kind;
        let ok = self.forward("variable", name, move |rt| rt.register_variable(binding));
        if ok {
            debug!("variable {} registered as {}", name, kind);
        }
        ok
    }

    /// Expose a variable with an explicit kind hint
    ///
    /// The hint must name the kind the storage resolves to; a mismatch such
    /// as `variable_as("n", &COUNT, STRING)` for an integer does not compile.
    pub fn variable_as<V, K>(&mut self, name: &str, var: V, _kind: K) -> bool
    where
        V: VariableRef,
        V::Target: Variable<Tag = K>,
        K: KindTag,
    {
        self.variable(name, var)
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    /// Expose a callable as a cloud function
    pub fn function<F>(&mut self, name: &str, handler: F) -> bool
    where
        F: FnMut(&str) -> i32 + Send + 'static,
    {
        let binding = FunctionBinding::new(name, handler);
        self.register_function(binding)
    }

    /// Expose a method on a shared instance as a cloud function
    pub fn function_method<T>(
        &mut self,
        name: &str,
        instance: &Arc<Mutex<T>>,
        method: fn(&mut T, &str) -> i32,
    ) -> bool
    where
        T: Send + 'static,
    {
        let binding = FunctionBinding::method(name, instance, method);
        self.register_function(binding)
    }

    fn register_function(&mut self, binding: FunctionBinding) -> bool {
        let name = binding.name.clone();
        let ok = self.forward("function", &name, move |rt| rt.register_function(binding));
        if ok {
            debug!("function {} registered", name);
        }
        ok
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Publish a public event without data
    pub fn publish(&mut self, name: &str) -> bool {
        let event = OutboundEvent::new(name).ttl(self.config.default_ttl);
        self.publish_event(event)
    }

    /// Publish a public event with data
    pub fn publish_data(&mut self, name: &str, data: &str) -> bool {
        let event = OutboundEvent::new(name)
            .data(data)
            .ttl(self.config.default_ttl);
        self.publish_event(event)
    }

    /// Publish a fully specified event
    pub fn publish_event(&mut self, event: OutboundEvent) -> bool {
        let name = event.name.clone();
        self.forward("publish", &name, |rt| rt.publish_event(&event))
    }

    /// Subscribe to public events whose name starts with `prefix`
    pub fn subscribe<F>(&mut self, prefix: &str, handler: F) -> bool
    where
        F: FnMut(&str, Option<&str>) + Send + 'static,
    {
        self.subscribe_filtered(prefix, handler, Scope::AllDevices)
    }

    /// Subscribe with a scope or a single source device
    pub fn subscribe_filtered<F>(
        &mut self,
        prefix: &str,
        handler: F,
        filter: impl Into<SubscriptionFilter>,
    ) -> bool
    where
        F: FnMut(&str, Option<&str>) + Send + 'static,
    {
        let subscription = EventSubscription::new(prefix, filter, handler);
        self.register_subscription(subscription)
    }

    /// Subscribe a method on a shared instance to public events
    pub fn subscribe_method<T>(
        &mut self,
        prefix: &str,
        instance: &Arc<Mutex<T>>,
        method: fn(&mut T, &str, Option<&str>),
    ) -> bool
    where
        T: Send + 'static,
    {
        self.subscribe_method_filtered(prefix, instance, method, Scope::AllDevices)
    }

    /// Subscribe a method on a shared instance with a scope or device filter
    pub fn subscribe_method_filtered<T>(
        &mut self,
        prefix: &str,
        instance: &Arc<Mutex<T>>,
        method: fn(&mut T, &str, Option<&str>),
        filter: impl Into<SubscriptionFilter>,
    ) -> bool
    where
        T: Send + 'static,
    {
        let subscription = EventSubscription::method(prefix, filter, instance, method);
        self.register_subscription(subscription)
    }

    fn register_subscription(&mut self, subscription: EventSubscription) -> bool {
        let prefix = subscription.prefix.clone();
        let filter = subscription.filter;
        let ok = self.forward("subscribe", &prefix, move |rt| {
            rt.register_subscription(subscription)
        });
        if ok {
            debug!("subscribed to {:?} with {:?}", prefix, filter);
        }
        ok
    }

    /// Remove every subscription held by the runtime, including ones
    /// registered elsewhere in the process
    pub fn unsubscribe(&mut self) {
        self.gated((), |rt| rt.clear_subscriptions());
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub fn connect(&mut self, internal: bool) -> bool {
        let ok = self.gated(false, |rt| rt.connect(internal));
        info!("cloud connect requested (internal: {}): {}", internal, ok);
        ok
    }

    pub fn disconnect(&mut self) {
        self.gated((), |rt| rt.disconnect());
    }

    pub fn connected(&self) -> bool {
        crate::CLOUD_ENABLED && self.runtime.is_connected()
    }

    pub fn disconnected(&self) -> bool {
        !self.connected()
    }

    /// Run one pass of the runtime's processing loop
    pub fn process(&mut self) {
        self.gated((), |rt| rt.pump());
    }

    pub fn sync_time(&mut self) -> bool {
        self.gated(false, |rt| rt.sync_time())
    }

    pub fn is_claimed(&self) -> bool {
        crate::CLOUD_ENABLED && self.runtime.is_claimed()
    }

    /// Device public key; empty when cloud support is compiled out
    pub fn pub_key(&self) -> String {
        if crate::CLOUD_ENABLED {
            self.runtime.public_key()
        } else {
            String::new()
        }
    }

    pub fn provision_keys(&mut self, force: bool) -> bool {
        self.gated(false, |rt| rt.provision_keys(force))
    }

    pub fn device_id(&self) -> DeviceId {
        self.runtime.device_id()
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Run a fallible runtime call and collapse the outcome to `bool`
    fn forward<F>(&mut self, op: &str, name: &str, call: F) -> bool
    where
        F: FnOnce(&mut R) -> CloudResult<()>,
    {
        match self.dispatch(call) {
            Ok(()) => true,
            Err(CloudError::Disabled) => {
                debug!("{} {:?} skipped: cloud support disabled", op, name);
                false
            }
            Err(e) => {
                warn!("{} {:?} rejected: {}", op, name, e);
                false
            }
        }
    }

    #[cfg(feature = "cloud")]
    fn dispatch<F>(&mut self, call: F) -> CloudResult<()>
    where
        F: FnOnce(&mut R) -> CloudResult<()>,
    {
        call(&mut self.runtime)
    }

    #[cfg(not(feature = "cloud"))]
    fn dispatch<F>(&mut self, _call: F) -> CloudResult<()>
    where
        F: FnOnce(&mut R) -> CloudResult<()>,
    {
        Err(CloudError::Disabled)
    }

    /// Run an infallible runtime call, or return `disabled` without
    /// touching the runtime when cloud support is compiled out
    #[cfg(feature = "cloud")]
    fn gated<T, F>(&mut self, _disabled: T, call: F) -> T
    where
        F: FnOnce(&mut R) -> T,
    {
        call(&mut self.runtime)
    }

    #[cfg(not(feature = "cloud"))]
    fn gated<T, F>(&mut self, disabled: T, _call: F) -> T
    where
        F: FnOnce(&mut R) -> T,
    {
        disabled
    }
}
