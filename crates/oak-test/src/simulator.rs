//! Simulated device runtime for host-side testing
//!
//! [`RuntimeSimulator`] implements [`CloudRuntime`] in memory. It enforces
//! registry limits, keeps the last registration for a repeated name, and
//! queues remote traffic (variable reads, function calls, inbound events)
//! until the application runs `Cloud::process`.

use std::collections::VecDeque;

use oak_cloud::{
    CloudRuntime, ControlChannel, EventSubscription, FunctionBinding, VariableBinding,
};
use oak_core::{
    CloudError, CloudResult, DeviceId, InboundEvent, OutboundEvent, PrimitiveKind,
    SubscriptionFilter, VariableValue,
};
use tracing::{debug, trace};

/// Limits and identity of the simulated device
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub device_id: DeviceId,
    /// Device is claimed by an account
    pub claimed: bool,
    /// Cloud is reachable; `connect` fails otherwise
    pub reachable: bool,
    pub public_key: String,
    pub max_variables: usize,
    pub max_functions: usize,
    pub max_subscriptions: usize,
    /// Longest variable or function name, in bytes
    pub max_key_len: usize,
    /// Longest function call argument, in bytes
    pub max_arg_len: usize,
    pub max_event_name_len: usize,
    pub max_event_data_len: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            device_id: DeviceId::new([0x53, 0xff, 0x6c, 0x06, 0x50, 0x75, 0x55, 0x49, 0x31, 0x30, 0x24, 0x87]),
            claimed: true,
            reachable: true,
            public_key: String::new(),
            max_variables: 20,
            max_functions: 15,
            max_subscriptions: 4,
            max_key_len: 64,
            max_arg_len: 63,
            max_event_name_len: 63,
            max_event_data_len: 255,
        }
    }
}

impl SimConfig {
    /// Small registry of early firmware: 10 variables, 4 functions, 12 byte names
    pub fn constrained() -> Self {
        SimConfig {
            max_variables: 10,
            max_functions: 4,
            max_key_len: 12,
            ..SimConfig::default()
        }
    }

    /// Cloud never answers
    pub fn offline() -> Self {
        SimConfig {
            reachable: false,
            ..SimConfig::default()
        }
    }
}

/// Entry point invocation recorded by the simulator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeCall {
    Initialize { system_context: bool },
    RegisterVariable { name: String, kind: PrimitiveKind },
    RegisterFunction { name: String },
    PublishEvent { name: String },
    RegisterSubscription { prefix: String, filter: SubscriptionFilter },
    ClearSubscriptions,
    Connect { internal: bool },
    Disconnect,
    Pump,
    SyncTime,
    ProvisionKeys { force: bool },
}

/// Remote traffic waiting for the processing loop
#[derive(Clone, Debug, PartialEq)]
pub enum Inbound {
    Read { name: String },
    Call { name: String, arg: String },
    Event(InboundEvent),
}

/// Outcome of one piece of remote traffic
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Value { name: String, value: VariableValue },
    UnknownVariable(String),
    Return { name: String, status: i32 },
    UnknownFunction(String),
    ArgumentTooLong { name: String, len: usize },
    Delivered { name: String, handlers: usize },
}

/// In-memory device runtime
pub struct RuntimeSimulator {
    config: SimConfig,
    initialized: Option<bool>,
    connected: bool,
    channel_open: bool,
    variables: Vec<VariableBinding>,
    functions: Vec<FunctionBinding>,
    subscriptions: Vec<EventSubscription>,
    published: Vec<OutboundEvent>,
    inbound: VecDeque<Inbound>,
    responses: Vec<Response>,
    calls: Vec<RuntimeCall>,
    control_in: VecDeque<u8>,
    control_out: Vec<u8>,
    time_syncs: u32,
}

impl Default for RuntimeSimulator {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl RuntimeSimulator {
    pub fn new(config: SimConfig) -> Self {
        RuntimeSimulator {
            config,
            initialized: None,
            connected: false,
            channel_open: false,
            variables: Vec::new(),
            functions: Vec::new(),
            subscriptions: Vec::new(),
            published: Vec::new(),
            inbound: VecDeque::new(),
            responses: Vec::new(),
            calls: Vec::new(),
            control_in: VecDeque::new(),
            control_out: Vec::new(),
            time_syncs: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// System-context flag passed to `initialize`, if it ran
    pub fn initialized(&self) -> Option<bool> {
        self.initialized
    }

    /// Every entry point invocation, in order
    pub fn calls(&self) -> &[RuntimeCall] {
        &self.calls
    }

    pub fn published(&self) -> &[OutboundEvent] {
        &self.published
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn take_responses(&mut self) -> Vec<Response> {
        std::mem::take(&mut self.responses)
    }

    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    pub fn time_syncs(&self) -> u32 {
        self.time_syncs
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn variable_kind(&self, name: &str) -> Option<PrimitiveKind> {
        self.variables.iter().find(|v| v.name == name).map(|v| v.kind)
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Read a variable immediately, bypassing the queue
    pub fn read_variable(&self, name: &str) -> Option<VariableValue> {
        self.variables.iter().find(|v| v.name == name).map(|v| v.read())
    }

    // ------------------------------------------------------------------
    // Remote traffic
    // ------------------------------------------------------------------

    pub fn inject(&mut self, inbound: Inbound) {
        self.inbound.push_back(inbound);
    }

    pub fn request_variable(&mut self, name: impl Into<String>) {
        self.inject(Inbound::Read { name: name.into() });
    }

    pub fn request_call(&mut self, name: impl Into<String>, arg: impl Into<String>) {
        self.inject(Inbound::Call {
            name: name.into(),
            arg: arg.into(),
        });
    }

    pub fn inject_event(&mut self, event: InboundEvent) {
        self.inject(Inbound::Event(event));
    }

    fn service(&mut self, inbound: Inbound) -> Response {
        match inbound {
            Inbound::Read { name } => match self.variables.iter().find(|v| v.name == name) {
                Some(binding) => Response::Value {
                    value: binding.read(),
                    name,
                },
                None => Response::UnknownVariable(name),
            },
            Inbound::Call { name, arg } => {
                if arg.len() > self.config.max_arg_len {
                    return Response::ArgumentTooLong {
                        name,
                        len: arg.len(),
                    };
                }
                match self.functions.iter_mut().find(|f| f.name == name) {
                    Some(binding) => Response::Return {
                        status: binding.call(&arg),
                        name,
                    },
                    None => Response::UnknownFunction(name),
                }
            }
            Inbound::Event(event) => {
                let handlers = self
                    .subscriptions
                    .iter_mut()
                    .map(|sub| sub.dispatch(&event))
                    .filter(|ran| *ran)
                    .count();
                Response::Delivered {
                    name: event.name,
                    handlers,
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Control channel
    // ------------------------------------------------------------------

    /// Bytes arriving from the remote end of the control channel
    pub fn feed_control(&mut self, bytes: &[u8]) {
        self.control_in.extend(bytes.iter().copied());
    }

    /// Bytes the application wrote since the last call
    pub fn take_control_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.control_out)
    }

    pub fn channel_open(&self) -> bool {
        self.channel_open
    }

    // ------------------------------------------------------------------
    // Registry rules
    // ------------------------------------------------------------------

    fn check_key(&self, name: &str) -> CloudResult<()> {
        if name.is_empty() {
            return Err(CloudError::EmptyName);
        }
        if name.len() > self.config.max_key_len {
            return Err(CloudError::NameTooLong {
                len: name.len(),
                max: self.config.max_key_len,
            });
        }
        Ok(())
    }
}

/// Replace the entry with the same name, or append within `limit`
fn upsert<T>(
    entries: &mut Vec<T>,
    item: T,
    name_of: impl Fn(&T) -> &str,
    limit: usize,
) -> CloudResult<()> {
    let name = name_of(&item);
    if let Some(pos) = entries.iter().position(|e| name_of(e) == name) {
        entries[pos] = item;
        return Ok(());
    }
    if entries.len() >= limit {
        return Err(CloudError::RegistryFull(limit));
    }
    entries.push(item);
    Ok(())
}

impl CloudRuntime for RuntimeSimulator {
    fn initialize(&mut self, system_context: bool) {
        self.calls.push(RuntimeCall::Initialize { system_context });
        self.initialized = Some(system_context);
    }

    fn register_variable(&mut self, binding: VariableBinding) -> CloudResult<()> {
        self.calls.push(RuntimeCall::RegisterVariable {
            name: binding.name.clone(),
            kind: binding.kind,
        });
        self.check_key(&binding.name)?;
        let limit = self.config.max_variables;
        upsert(&mut self.variables, binding, |v| v.name.as_str(), limit)
    }

    fn register_function(&mut self, binding: FunctionBinding) -> CloudResult<()> {
        self.calls.push(RuntimeCall::RegisterFunction {
            name: binding.name.clone(),
        });
        self.check_key(&binding.name)?;
        let limit = self.config.max_functions;
        upsert(&mut self.functions, binding, |f| f.name.as_str(), limit)
    }

    fn publish_event(&mut self, event: &OutboundEvent) -> CloudResult<()> {
        self.calls.push(RuntimeCall::PublishEvent {
            name: event.name.clone(),
        });
        if !self.connected {
            return Err(CloudError::NotConnected);
        }
        if event.name.is_empty() {
            return Err(CloudError::EmptyName);
        }
        if event.name.len() > self.config.max_event_name_len {
            return Err(CloudError::NameTooLong {
                len: event.name.len(),
                max: self.config.max_event_name_len,
            });
        }
        if event.data_len() > self.config.max_event_data_len {
            return Err(CloudError::EventTooLarge {
                len: event.data_len(),
                max: self.config.max_event_data_len,
            });
        }
        self.published.push(event.clone());
        Ok(())
    }

    fn register_subscription(&mut self, subscription: EventSubscription) -> CloudResult<()> {
        self.calls.push(RuntimeCall::RegisterSubscription {
            prefix: subscription.prefix.clone(),
            filter: subscription.filter,
        });
        if self.subscriptions.len() >= self.config.max_subscriptions {
            return Err(CloudError::RegistryFull(self.config.max_subscriptions));
        }
        self.subscriptions.push(subscription);
        Ok(())
    }

    fn clear_subscriptions(&mut self) {
        self.calls.push(RuntimeCall::ClearSubscriptions);
        self.subscriptions.clear();
    }

    fn connect(&mut self, internal: bool) -> bool {
        self.calls.push(RuntimeCall::Connect { internal });
        self.connected = self.config.reachable;
        debug!("simulated connect: {}", self.connected);
        self.connected
    }

    fn disconnect(&mut self) {
        self.calls.push(RuntimeCall::Disconnect);
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    /// Service queued traffic; nothing is delivered while disconnected
    fn pump(&mut self) {
        self.calls.push(RuntimeCall::Pump);
        if !self.connected {
            return;
        }
        while let Some(inbound) = self.inbound.pop_front() {
            let response = self.service(inbound);
            trace!("serviced remote request: {:?}", response);
            self.responses.push(response);
        }
    }

    fn sync_time(&mut self) -> bool {
        self.calls.push(RuntimeCall::SyncTime);
        if self.connected {
            self.time_syncs += 1;
        }
        self.connected
    }

    fn is_claimed(&self) -> bool {
        self.config.claimed
    }

    fn public_key(&self) -> String {
        self.config.public_key.clone()
    }

    fn provision_keys(&mut self, force: bool) -> bool {
        self.calls.push(RuntimeCall::ProvisionKeys { force });
        if force || self.config.public_key.is_empty() {
            self.config.public_key = format!(
                "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----",
                self.config.device_id
            );
        }
        true
    }

    fn device_id(&self) -> DeviceId {
        self.config.device_id
    }
}

impl ControlChannel for RuntimeSimulator {
    fn begin(&mut self) {
        self.channel_open = true;
    }

    fn write_byte(&mut self, byte: u8) -> usize {
        self.control_out.push(byte);
        1
    }

    fn available(&self) -> usize {
        self.control_in.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.control_in.pop_front()
    }

    fn peek_byte(&self) -> Option<u8> {
        self.control_in.front().copied()
    }

    fn flush(&mut self) {}

    fn end(&mut self) {
        self.channel_open = false;
        self.control_in.clear();
    }
}
