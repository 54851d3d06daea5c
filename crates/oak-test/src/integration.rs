//! End-to-end tests: facade + simulated runtime
//!
//! Each test registers through `Cloud`, drives remote traffic through the
//! simulator and runs `process` the way firmware would in its main loop.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;

use oak_cloud::Cloud;
use oak_core::{
    DeviceId, InboundEvent, OutboundEvent, PrimitiveKind, Scope, VariableValue, Visibility,
};
use parking_lot::{Mutex, RwLock};
use proptest::prelude::*;

use crate::{init_test_tracing, Response, RuntimeCall, RuntimeSimulator, SimConfig};

fn connected_cloud() -> Cloud<RuntimeSimulator> {
    init_test_tracing();
    let mut cloud = Cloud::new(RuntimeSimulator::default());
    assert!(cloud.connect(false));
    cloud
}

fn remote_read(cloud: &mut Cloud<RuntimeSimulator>, name: &str) -> VariableValue {
    cloud.runtime_mut().request_variable(name);
    cloud.process();
    match cloud.runtime_mut().take_responses().pop() {
        Some(Response::Value { value, .. }) => value,
        other => panic!("no value for {}: {:?}", name, other),
    }
}

fn remote_call(cloud: &mut Cloud<RuntimeSimulator>, name: &str, arg: &str) -> Response {
    cloud.runtime_mut().request_call(name, arg);
    cloud.process();
    cloud
        .runtime_mut()
        .take_responses()
        .pop()
        .expect("call serviced")
}

fn deliver(cloud: &mut Cloud<RuntimeSimulator>, event: InboundEvent) -> usize {
    cloud.runtime_mut().inject_event(event);
    cloud.process();
    match cloud.runtime_mut().take_responses().pop() {
        Some(Response::Delivered { handlers, .. }) => handlers,
        other => panic!("event not delivered: {:?}", other),
    }
}

fn device(n: u8) -> DeviceId {
    DeviceId::new([n; 12])
}

// ============================================================================
// VARIABLES
// ============================================================================

#[test]
fn test_variable_round_trip_per_kind() {
    let mut cloud = connected_cloud();

    let armed = Arc::new(AtomicBool::new(false));
    let count = Arc::new(AtomicI32::new(0));
    let uptime = Arc::new(AtomicU32::new(0));
    let level = Arc::new(RwLock::new(0.0f64));
    let label = Arc::new(Mutex::new(*b"boot\0\0\0\0\0\0\0\0\0\0\0\0"));
    let status = Arc::new(RwLock::new(String::new()));

    assert!(cloud.variable("armed", armed.clone()));
    assert!(cloud.variable("count", count.clone()));
    assert!(cloud.variable("uptime", uptime.clone()));
    assert!(cloud.variable("level", level.clone()));
    assert!(cloud.variable("label", label.clone()));
    assert!(cloud.variable("status", status.clone()));

    let sim = cloud.runtime();
    assert_eq!(sim.variable_kind("armed"), Some(PrimitiveKind::Boolean));
    assert_eq!(sim.variable_kind("count"), Some(PrimitiveKind::Int));
    assert_eq!(sim.variable_kind("uptime"), Some(PrimitiveKind::Int));
    assert_eq!(sim.variable_kind("level"), Some(PrimitiveKind::Double));
    assert_eq!(sim.variable_kind("label"), Some(PrimitiveKind::String));
    assert_eq!(sim.variable_kind("status"), Some(PrimitiveKind::String));

    armed.store(true, Ordering::Release);
    count.store(-17, Ordering::Release);
    uptime.store(3_600, Ordering::Release);
    *level.write() = 21.75;
    label.lock()[..5].copy_from_slice(b"ready");
    *status.write() = "heating".to_string();

    assert_eq!(remote_read(&mut cloud, "armed"), VariableValue::Boolean(true));
    assert_eq!(remote_read(&mut cloud, "count"), VariableValue::Int(-17));
    assert_eq!(remote_read(&mut cloud, "uptime").as_uint(), Some(3_600));
    assert_eq!(remote_read(&mut cloud, "level"), VariableValue::Double(21.75));
    assert_eq!(remote_read(&mut cloud, "label").as_str(), Some("ready"));
    assert_eq!(remote_read(&mut cloud, "status").as_str(), Some("heating"));

    // Later writes are visible to later reads.
    *status.write() = "idle".to_string();
    assert_eq!(remote_read(&mut cloud, "status").as_str(), Some("idle"));
}

#[test]
fn test_static_storage() {
    static FIRMWARE: &str = "2.1.0";
    static RSSI: AtomicI32 = AtomicI32::new(-70);
    static BOARD: [u8; 8] = *b"oak\0\0\0\0\0";

    let mut cloud = connected_cloud();
    assert!(cloud.variable("fw", FIRMWARE));
    assert!(cloud.variable("rssi", &RSSI));
    assert!(cloud.variable("board", &BOARD));

    assert_eq!(remote_read(&mut cloud, "fw").as_str(), Some("2.1.0"));
    assert_eq!(remote_read(&mut cloud, "board").as_str(), Some("oak"));
    assert_eq!(cloud.runtime().variable_kind("board"), Some(PrimitiveKind::String));
    RSSI.store(-55, Ordering::Release);
    assert_eq!(remote_read(&mut cloud, "rssi"), VariableValue::Int(-55));
}

#[test]
fn test_registration_makes_one_runtime_call() {
    let mut cloud = connected_cloud();
    let before = cloud.runtime().calls().len();

    assert!(cloud.variable("count", Arc::new(AtomicI32::new(1))));

    let calls = &cloud.runtime().calls()[before..];
    assert_eq!(
        calls,
        &[RuntimeCall::RegisterVariable {
            name: "count".into(),
            kind: PrimitiveKind::Int
        }]
    );
}

#[test]
fn test_duplicate_variable_last_wins() {
    let mut cloud = connected_cloud();
    let first = Arc::new(AtomicI32::new(1));
    let second = Arc::new(RwLock::new(String::from("second")));

    assert!(cloud.variable("value", first));
    assert!(cloud.variable("value", second));

    assert_eq!(cloud.runtime().variable_names(), vec!["value"]);
    assert_eq!(cloud.runtime().variable_kind("value"), Some(PrimitiveKind::String));
    assert_eq!(remote_read(&mut cloud, "value").as_str(), Some("second"));
}

#[test]
fn test_variable_limit_rejects_without_side_effect() {
    init_test_tracing();
    let mut cloud = Cloud::new(RuntimeSimulator::new(SimConfig {
        max_variables: 2,
        ..SimConfig::default()
    }));

    assert!(cloud.variable("a", Arc::new(AtomicBool::new(true))));
    assert!(cloud.variable("b", Arc::new(AtomicBool::new(true))));
    assert!(!cloud.variable("c", Arc::new(AtomicBool::new(true))));
    assert_eq!(cloud.runtime().variable_names(), vec!["a", "b"]);

    // Replacing an existing name does not need a free slot.
    assert!(cloud.variable("b", Arc::new(AtomicBool::new(false))));
}

#[test]
fn test_unknown_variable() {
    let mut cloud = connected_cloud();
    cloud.runtime_mut().request_variable("missing");
    cloud.process();
    assert_eq!(
        cloud.runtime().responses(),
        &[Response::UnknownVariable("missing".into())]
    );
}

// ============================================================================
// FUNCTIONS
// ============================================================================

struct Thermostat {
    target: f64,
    changes: u32,
}

impl Thermostat {
    fn set_target(&mut self, arg: &str) -> i32 {
        match arg.parse::<f64>() {
            Ok(target) => {
                self.target = target;
                self.changes += 1;
                0
            }
            Err(_) => -1,
        }
    }

    fn on_weather(&mut self, _name: &str, data: Option<&str>) {
        if data == Some("cold") {
            self.target += 1.0;
        }
    }
}

#[test]
fn test_function_call() {
    let mut cloud = connected_cloud();
    assert!(cloud.function("double", |arg: &str| arg.parse::<i32>().map_or(-1, |n| n * 2)));

    assert_eq!(
        remote_call(&mut cloud, "double", "21"),
        Response::Return {
            name: "double".into(),
            status: 42
        }
    );
    assert_eq!(
        remote_call(&mut cloud, "nope", ""),
        Response::UnknownFunction("nope".into())
    );
}

#[test]
fn test_function_method_on_shared_instance() {
    let mut cloud = connected_cloud();
    let thermostat = Arc::new(Mutex::new(Thermostat {
        target: 20.0,
        changes: 0,
    }));
    assert!(cloud.function_method("target", &thermostat, Thermostat::set_target));

    assert_eq!(
        remote_call(&mut cloud, "target", "22.5"),
        Response::Return {
            name: "target".into(),
            status: 0
        }
    );
    assert_eq!(
        remote_call(&mut cloud, "target", "warm"),
        Response::Return {
            name: "target".into(),
            status: -1
        }
    );

    let t = thermostat.lock();
    assert_eq!(t.target, 22.5);
    assert_eq!(t.changes, 1);
}

#[test]
fn test_duplicate_function_last_wins() {
    let mut cloud = connected_cloud();
    assert!(cloud.function("f", |_: &str| 1));
    assert!(cloud.function("f", |_: &str| 2));

    assert_eq!(cloud.runtime().function_names(), vec!["f"]);
    assert_eq!(
        remote_call(&mut cloud, "f", ""),
        Response::Return {
            name: "f".into(),
            status: 2
        }
    );
}

#[test]
fn test_function_argument_limit() {
    let mut cloud = connected_cloud();
    assert!(cloud.function("echo", |arg: &str| arg.len() as i32));

    let long = "x".repeat(64);
    assert_eq!(
        remote_call(&mut cloud, "echo", &long),
        Response::ArgumentTooLong {
            name: "echo".into(),
            len: 64
        }
    );
}

#[test]
fn test_function_name_limit_on_constrained_device() {
    init_test_tracing();
    let mut cloud = Cloud::new(RuntimeSimulator::new(SimConfig::constrained()));
    assert!(!cloud.function("a_very_long_name", |_: &str| 0));
    assert!(cloud.function("short", |_: &str| 0));
}

// ============================================================================
// EVENTS
// ============================================================================

#[test]
fn test_prefix_matching_is_lexical() {
    let mut cloud = connected_cloud();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    assert!(cloud.subscribe("door", move |name: &str, _: Option<&str>| {
        sink.lock().push(name.to_string());
    }));

    assert_eq!(deliver(&mut cloud, InboundEvent::new("door/open", device(1))), 1);
    assert_eq!(deliver(&mut cloud, InboundEvent::new("doorbell", device(1))), 1);
    assert_eq!(deliver(&mut cloud, InboundEvent::new("backdoor", device(1))), 0);

    assert_eq!(*seen.lock(), vec!["door/open", "doorbell"]);
}

#[test]
fn test_temp_prefix() {
    let mut cloud = connected_cloud();
    assert!(cloud.subscribe("temp", |_: &str, _: Option<&str>| {}));

    assert_eq!(deliver(&mut cloud, InboundEvent::new("temperature", device(1))), 1);
    assert_eq!(deliver(&mut cloud, InboundEvent::new("temp/hot", device(1))), 1);
    assert_eq!(deliver(&mut cloud, InboundEvent::new("humidity", device(1))), 0);
}

#[test]
fn test_empty_prefix_receives_everything() {
    let mut cloud = connected_cloud();
    let count = Arc::new(AtomicU32::new(0));
    let hits = Arc::clone(&count);
    assert!(cloud.subscribe("", move |_: &str, _: Option<&str>| {
        hits.fetch_add(1, Ordering::Relaxed);
    }));

    deliver(&mut cloud, InboundEvent::new("a", device(1)));
    deliver(&mut cloud, InboundEvent::new("b/c", device(2)));
    assert_eq!(count.load(Ordering::Relaxed), 2);
}

#[test]
fn test_scope_and_device_filters() {
    let mut cloud = connected_cloud();
    let log = Arc::new(Mutex::new(Vec::new()));

    let all = Arc::clone(&log);
    cloud.subscribe_filtered(
        "alarm",
        move |_: &str, data: Option<&str>| all.lock().push(format!("all:{}", data.unwrap_or(""))),
        Scope::AllDevices,
    );
    let mine = Arc::clone(&log);
    cloud.subscribe_filtered(
        "alarm",
        move |_: &str, data: Option<&str>| mine.lock().push(format!("mine:{}", data.unwrap_or(""))),
        Scope::MyDevices,
    );
    let pinned = Arc::clone(&log);
    cloud.subscribe_filtered(
        "alarm",
        move |_: &str, data: Option<&str>| pinned.lock().push(format!("dev:{}", data.unwrap_or(""))),
        device(9),
    );

    // Public, foreign device: only the broadcast subscription.
    assert_eq!(deliver(&mut cloud, InboundEvent::new("alarm", device(1)).data("p")), 1);
    // Private, own device: only my-devices.
    assert_eq!(deliver(&mut cloud, InboundEvent::new("alarm", device(2)).data("q").private()), 1);
    // Public from the pinned device, owned: all three.
    assert_eq!(
        deliver(&mut cloud, InboundEvent::new("alarm", device(9)).data("r").owned()),
        3
    );

    assert_eq!(
        *log.lock(),
        vec!["all:p", "mine:q", "all:r", "mine:r", "dev:r"]
    );
}

#[test]
fn test_subscribe_method() {
    let mut cloud = connected_cloud();
    let thermostat = Arc::new(Mutex::new(Thermostat {
        target: 20.0,
        changes: 0,
    }));
    assert!(cloud.subscribe_method("weather", &thermostat, Thermostat::on_weather));
    assert!(cloud.subscribe_method_filtered(
        "weather",
        &thermostat,
        Thermostat::on_weather,
        device(4)
    ));

    assert_eq!(
        deliver(&mut cloud, InboundEvent::new("weather/today", device(4)).data("cold")),
        2
    );
    assert_eq!(thermostat.lock().target, 22.0);
}

#[test]
fn test_unsubscribe_is_idempotent() {
    let mut cloud = connected_cloud();
    cloud.unsubscribe();
    cloud.unsubscribe();
    assert_eq!(cloud.runtime().subscription_count(), 0);
}

#[test]
fn test_unsubscribe_revokes_everything() {
    use oak_cloud::{CloudRuntime, EventSubscription};

    let mut cloud = connected_cloud();
    assert!(cloud.subscribe("a", |_: &str, _: Option<&str>| {}));
    assert!(cloud.subscribe_filtered("b", |_: &str, _: Option<&str>| {}, Scope::MyDevices));
    // Registered straight on the runtime, bypassing this facade.
    cloud
        .runtime_mut()
        .register_subscription(EventSubscription::new("c", Scope::AllDevices, |_: &str, _: Option<&str>| {}))
        .unwrap();
    assert_eq!(cloud.runtime().subscription_count(), 3);

    cloud.unsubscribe();
    assert_eq!(cloud.runtime().subscription_count(), 0);
    assert_eq!(deliver(&mut cloud, InboundEvent::new("a", device(1))), 0);
}

#[test]
fn test_subscription_limit() {
    let mut cloud = connected_cloud();
    for i in 0..4 {
        assert!(cloud.subscribe(&format!("e{}", i), |_: &str, _: Option<&str>| {}));
    }
    assert!(!cloud.subscribe("e4", |_: &str, _: Option<&str>| {}));
    assert_eq!(cloud.runtime().subscription_count(), 4);
}

#[test]
fn test_publish() {
    let mut cloud = connected_cloud();
    assert!(cloud.publish("boot"));
    assert!(cloud.publish_data("temp", "21.5"));
    assert!(cloud.publish_event(OutboundEvent::new("secret").data("x").ttl(5).private()));

    let published = cloud.runtime().published();
    assert_eq!(published.len(), 3);
    assert_eq!(published[0], OutboundEvent::new("boot"));
    assert_eq!(published[1].data.as_deref(), Some("21.5"));
    assert_eq!(published[2].visibility, Visibility::Private);
    assert_eq!(published[2].ttl, 5);
}

#[test]
fn test_publish_requires_connection() {
    init_test_tracing();
    let mut cloud = Cloud::new(RuntimeSimulator::default());
    assert!(!cloud.publish("early"));
    assert!(cloud.runtime().published().is_empty());
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[test]
fn test_traffic_waits_for_connection() {
    init_test_tracing();
    let mut cloud = Cloud::new(RuntimeSimulator::default());
    let calls = Arc::new(AtomicU32::new(0));
    let hits = Arc::clone(&calls);
    assert!(cloud.function("ping", move |_: &str| {
        hits.fetch_add(1, Ordering::Relaxed);
        0
    }));

    cloud.runtime_mut().request_call("ping", "");
    cloud.process();
    assert_eq!(calls.load(Ordering::Relaxed), 0);
    assert_eq!(cloud.runtime().pending(), 1);

    assert!(cloud.connect(false));
    cloud.process();
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn test_offline_runtime() {
    init_test_tracing();
    let mut cloud = Cloud::new(RuntimeSimulator::new(SimConfig::offline()));
    assert!(!cloud.connect(false));
    assert!(cloud.disconnected());
    assert!(!cloud.sync_time());
}

#[test]
fn test_lifecycle_passthrough() {
    let mut cloud = connected_cloud();
    assert!(cloud.connected());
    assert!(cloud.sync_time());
    assert_eq!(cloud.runtime().time_syncs(), 1);
    assert!(cloud.is_claimed());
    assert_eq!(cloud.device_id().to_string(), "53ff6c065075554931302487");

    assert!(cloud.pub_key().is_empty());
    assert!(cloud.provision_keys(true));
    assert!(cloud.pub_key().contains("BEGIN PUBLIC KEY"));

    cloud.disconnect();
    assert!(cloud.disconnected());
}

#[test]
fn test_initialize_and_shutdown() {
    init_test_tracing();
    let mut cloud = Cloud::with_config(
        RuntimeSimulator::default(),
        oak_cloud::CloudConfig {
            system_context: true,
            auto_connect: true,
            ..Default::default()
        },
    );
    assert!(cloud.connected());
    cloud.subscribe("x", |_: &str, _: Option<&str>| {});

    let sim = cloud.shutdown();
    assert_eq!(sim.initialized(), Some(true));
    assert_eq!(sim.subscription_count(), 0);
    assert!(!oak_cloud::CloudRuntime::is_connected(&sim));
    assert_eq!(sim.calls()[0], RuntimeCall::Initialize { system_context: true });
    assert_eq!(sim.calls()[1], RuntimeCall::Connect { internal: false });
}

#[test]
fn test_control_channel() {
    use std::io::{Read, Write};

    let mut cloud = connected_cloud();
    cloud.begin();
    assert!(cloud.runtime().channel_open());

    write!(cloud, "AT+{}", 1).unwrap();
    cloud.flush();
    assert_eq!(cloud.runtime_mut().take_control_output(), b"AT+1".to_vec());

    cloud.runtime_mut().feed_control(b"OK\r\n");
    assert_eq!(cloud.available(), 4);
    assert_eq!(cloud.peek(), Some(b'O'));
    let mut reply = [0u8; 4];
    cloud.read_exact(&mut reply).unwrap();
    assert_eq!(&reply, b"OK\r\n");
    assert_eq!(cloud.read(), None);

    cloud.end();
    assert!(!cloud.runtime().channel_open());
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_int_round_trip(value in any::<i32>()) {
        let mut cloud = connected_cloud();
        let storage = Arc::new(AtomicI32::new(0));
        prop_assert!(cloud.variable("n", storage.clone()));
        storage.store(value, Ordering::Release);
        prop_assert_eq!(remote_read(&mut cloud, "n"), VariableValue::Int(value));
    }

    #[test]
    fn prop_uint_round_trip(value in any::<u32>()) {
        let mut cloud = connected_cloud();
        let storage = Arc::new(RwLock::new(0u32));
        prop_assert!(cloud.variable("n", storage.clone()));
        *storage.write() = value;
        prop_assert_eq!(remote_read(&mut cloud, "n").as_uint(), Some(value));
    }

    #[test]
    fn prop_double_round_trip(value in proptest::num::f64::NORMAL) {
        let mut cloud = connected_cloud();
        let storage = Arc::new(Mutex::new(0.0f64));
        prop_assert!(cloud.variable("d", storage.clone()));
        *storage.lock() = value;
        prop_assert_eq!(remote_read(&mut cloud, "d"), VariableValue::Double(value));
    }

    #[test]
    fn prop_string_round_trip(value in "[ -~]{0,40}") {
        let mut cloud = connected_cloud();
        let storage = Arc::new(RwLock::new(String::new()));
        prop_assert!(cloud.variable("s", storage.clone()));
        *storage.write() = value.clone();
        prop_assert_eq!(remote_read(&mut cloud, "s"), VariableValue::String(value));
    }

    #[test]
    fn prop_prefix_of_name_always_matches(name in "[a-z/]{1,20}", cut in 0usize..20) {
        let mut cloud = connected_cloud();
        let cut = cut.min(name.len());
        let subscribed = cloud.subscribe(&name[..cut], |_: &str, _: Option<&str>| {});
        prop_assert!(subscribed);
        prop_assert_eq!(deliver(&mut cloud, InboundEvent::new(name.clone(), device(1))), 1);
    }
}
