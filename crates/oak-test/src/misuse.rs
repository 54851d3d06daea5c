//! Registrations that must not build
//!
//! Storage shapes that would misbehave on the device have no trait
//! implementation, so type checking rejects them (`E0277`) with a message
//! saying how to fix the call. `cargo check` reports them as well.
//!
//! Supported shapes compile:
//!
//! ```
//! use std::sync::atomic::AtomicI32;
//! use oak_cloud::{Cloud, INT, STRING};
//! use oak_test::RuntimeSimulator;
//! use parking_lot::{const_rwlock, RwLock};
//!
//! static COUNT: AtomicI32 = AtomicI32::new(0);
//! static LEVEL: RwLock<f64> = const_rwlock(0.0);
//! static MOTD: RwLock<String> = const_rwlock(String::new());
//!
//! let mut cloud = Cloud::new(RuntimeSimulator::default());
//! assert!(cloud.variable("count", &COUNT));
//! assert!(cloud.variable("level", &LEVEL));
//! assert!(cloud.variable_as("motd", &MOTD, STRING));
//! assert!(cloud.variable_as("count2", &COUNT, INT));
//!
//! static BOARD: [u8; 8] = *b"oak\0\0\0\0\0";
//! assert!(cloud.variable_as("board", &BOARD, STRING));
//! ```
//!
//! `f32` storage asks for `f64` instead:
//!
//! ```compile_fail,E0277
//! use oak_cloud::Cloud;
//! use oak_test::RuntimeSimulator;
//! use parking_lot::{const_rwlock, RwLock};
//!
//! static LEVEL: RwLock<f32> = const_rwlock(0.0);
//!
//! let mut cloud = Cloud::new(RuntimeSimulator::default());
//! cloud.variable("level", &LEVEL);
//! ```
//!
//! A raw pointer to a string variable asks for the `addr_of!` to be dropped:
//!
//! ```compile_fail,E0277
//! use oak_cloud::Cloud;
//! use oak_test::RuntimeSimulator;
//! use parking_lot::{const_rwlock, RwLock};
//!
//! static MOTD: RwLock<String> = const_rwlock(String::new());
//!
//! let mut cloud = Cloud::new(RuntimeSimulator::default());
//! cloud.variable("motd", std::ptr::addr_of!(MOTD));
//! ```
//!
//! So does a mutable raw pointer:
//!
//! ```compile_fail,E0277
//! use oak_cloud::Cloud;
//! use oak_test::RuntimeSimulator;
//! use parking_lot::RwLock;
//!
//! let mut motd = RwLock::new(String::new());
//! let mut cloud = Cloud::new(RuntimeSimulator::default());
//! cloud.variable("motd", std::ptr::addr_of_mut!(motd));
//! ```
//!
//! The same holds with an explicit kind hint:
//!
//! ```compile_fail,E0277
//! use oak_cloud::{Cloud, STRING};
//! use oak_test::RuntimeSimulator;
//! use parking_lot::{const_rwlock, RwLock};
//!
//! static MOTD: RwLock<String> = const_rwlock(String::new());
//!
//! let mut cloud = Cloud::new(RuntimeSimulator::default());
//! cloud.variable_as("motd", std::ptr::addr_of!(MOTD), STRING);
//! ```
//!
//! A `String` passed by value asks for shared storage:
//!
//! ```compile_fail,E0277
//! use oak_cloud::Cloud;
//! use oak_test::RuntimeSimulator;
//!
//! let motd = String::from("hello");
//! let mut cloud = Cloud::new(RuntimeSimulator::default());
//! cloud.variable("motd", motd);
//! ```
//!
//! A kind hint that disagrees with the storage fails to resolve the
//! storage's `Tag`:
//!
//! ```compile_fail,E0271
//! use std::sync::atomic::AtomicI32;
//! use oak_cloud::{Cloud, STRING};
//! use oak_test::RuntimeSimulator;
//!
//! static COUNT: AtomicI32 = AtomicI32::new(0);
//!
//! let mut cloud = Cloud::new(RuntimeSimulator::default());
//! cloud.variable_as("count", &COUNT, STRING);
//! ```
