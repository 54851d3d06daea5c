//! Variable type dispatch
//!
//! Maps application storage onto exactly one [`PrimitiveKind`]:
//! - `AtomicBool`, `Mutex<bool>`, `RwLock<bool>` → Boolean
//! - `AtomicI32`, `AtomicU32`, `Mutex`/`RwLock` of `i32` or `u32` → Int
//! - `Mutex`/`RwLock<f64>` → Double
//! - `str`, `[u8; N]` (bare or locked), `heapless::String<N>`, `String` → String
//!
//! Fixed buffers are read in place. A dynamic `String` is copied under
//! its lock at read time ([`Access::Snapshot`]) so the runtime always
//! sees a stable byte view.
//!
//! Storage is shared with the runtime, never moved into it: pass a
//! `&'static` reference (usually to a `static`) or an `Arc`. Shapes that
//! would silently misbehave on the device have no implementation, so
//! trait resolution rejects them during type checking (`cargo check`
//! included) with a corrective message: `f32` storage, raw pointers, and a
//! `String` passed by value.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;

use oak_core::{BooleanTag, DoubleTag, IntTag, KindTag, PrimitiveKind, StringTag, VariableValue};
use parking_lot::{Mutex, RwLock};

/// How the runtime obtains a readable view of a variable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    /// Storage is read in place
    Direct,
    /// Storage is copied into a stable snapshot before each read
    Snapshot,
}

/// Plain value type the runtime can interpret
///
/// `f32` is left out: the runtime only stores doubles.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot back a cloud variable",
    label = "unsupported variable type",
    note = "supported values are bool, i32, u32, f64, [u8; N], heapless::String<N> and String",
    note = "Please change the variable from type `f32` to `f64` for use with Cloud::variable()"
)]
pub trait Primitive: Send + Sync + 'static {
    type Tag: KindTag;

    const KIND: PrimitiveKind = <Self::Tag as KindTag>::KIND;

    const ACCESS: Access = Access::Direct;

    fn value(&self) -> VariableValue;
}

impl Primitive for bool {
    type Tag = BooleanTag;

    fn value(&self) -> VariableValue {
        VariableValue::Boolean(*self)
    }
}

impl Primitive for i32 {
    type Tag = IntTag;

    fn value(&self) -> VariableValue {
        VariableValue::Int(*self)
    }
}

impl Primitive for u32 {
    type Tag = IntTag;

    fn value(&self) -> VariableValue {
        VariableValue::Int(*self as i32)
    }
}

impl Primitive for f64 {
    type Tag = DoubleTag;

    fn value(&self) -> VariableValue {
        VariableValue::Double(*self)
    }
}

impl Primitive for String {
    type Tag = StringTag;

    const ACCESS: Access = Access::Snapshot;

    fn value(&self) -> VariableValue {
        VariableValue::String(self.clone())
    }
}

impl<const N: usize> Primitive for heapless::String<N> {
    type Tag = StringTag;

    fn value(&self) -> VariableValue {
        VariableValue::String(self.as_str().to_owned())
    }
}

impl<const N: usize> Primitive for [u8; N] {
    type Tag = StringTag;

    fn value(&self) -> VariableValue {
        VariableValue::String(c_buffer_str(self))
    }
}

/// Text of a NUL-terminated buffer; the whole buffer if no NUL is present
fn c_buffer_str(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// Storage a registered variable reads from
///
/// Implemented for interior-mutable containers of [`Primitive`]s so the
/// application can keep writing while the runtime reads, and for
/// immutable text.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not cloud variable storage",
    label = "wrap the value in an atomic, a parking_lot Mutex or RwLock",
    note = "e.g. `static MY_VAR: RwLock<f64> = const_rwlock(0.0)` passed as &MY_VAR"
)]
pub trait Variable: Send + Sync + 'static {
    type Tag: KindTag;

    const KIND: PrimitiveKind;

    const ACCESS: Access;

    fn read(&self) -> VariableValue;
}

impl<P: Primitive> Variable for Mutex<P> {
    type Tag = P::Tag;
    const KIND: PrimitiveKind = P::KIND;
    const ACCESS: Access = P::ACCESS;

    fn read(&self) -> VariableValue {
        self.lock().value()
    }
}

impl<P: Primitive> Variable for RwLock<P> {
    type Tag = P::Tag;
    const KIND: PrimitiveKind = P::KIND;
    const ACCESS: Access = P::ACCESS;

    fn read(&self) -> VariableValue {
        RwLock::read(self).value()
    }
}

impl Variable for AtomicBool {
    type Tag = BooleanTag;
    const KIND: PrimitiveKind = PrimitiveKind::Boolean;
    const ACCESS: Access = Access::Direct;

    fn read(&self) -> VariableValue {
        VariableValue::Boolean(self.load(Ordering::Acquire))
    }
}

impl Variable for AtomicI32 {
    type Tag = IntTag;
    const KIND: PrimitiveKind = PrimitiveKind::Int;
    const ACCESS: Access = Access::Direct;

    fn read(&self) -> VariableValue {
        VariableValue::Int(self.load(Ordering::Acquire))
    }
}

impl Variable for AtomicU32 {
    type Tag = IntTag;
    const KIND: PrimitiveKind = PrimitiveKind::Int;
    const ACCESS: Access = Access::Direct;

    fn read(&self) -> VariableValue {
        VariableValue::Int(self.load(Ordering::Acquire) as i32)
    }
}

/// Constant text, e.g. a firmware version string
impl Variable for str {
    type Tag = StringTag;
    const KIND: PrimitiveKind = PrimitiveKind::String;
    const ACCESS: Access = Access::Direct;

    fn read(&self) -> VariableValue {
        VariableValue::String(self.to_owned())
    }
}

/// Fixed text buffer, read up to the first NUL
impl<const N: usize> Variable for [u8; N] {
    type Tag = StringTag;
    const KIND: PrimitiveKind = PrimitiveKind::String;
    const ACCESS: Access = Access::Direct;

    fn read(&self) -> VariableValue {
        VariableValue::String(c_buffer_str(self))
    }
}

/// Closure the runtime calls to read a variable
pub type VariableAccessor = Box<dyn Fn() -> VariableValue + Send + Sync>;

/// Handle to variable storage accepted by `Cloud::variable`
///
/// Only shared handles qualify. Raw pointers and owned values have no
/// implementation.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be registered as a cloud variable",
    label = "expected `&MY_VAR` or an `Arc` of the storage",
    note = "Use cloud.variable(\"name\", &MY_VAR) without addr_of! in front of MY_VAR",
    note = "MY_VAR must be declared as `static MY_VAR: RwLock<String>` and passed as &MY_VAR, not String MY_VAR"
)]
pub trait VariableRef {
    type Target: Variable + ?Sized;

    fn into_accessor(self) -> VariableAccessor;
}

impl<T: Variable + ?Sized> VariableRef for &'static T {
    type Target = T;

    fn into_accessor(self) -> VariableAccessor {
        Box::new(move || self.read())
    }
}

impl<T: Variable> VariableRef for Arc<T> {
    type Target = T;

    fn into_accessor(self) -> VariableAccessor {
        Box::new(move || self.read())
    }
}

/// Named variable handed to the runtime registry
pub struct VariableBinding {
    pub name: String,
    pub kind: PrimitiveKind,
    pub access: Access,
    accessor: VariableAccessor,
}

impl VariableBinding {
    /// Resolve `var` to its kind and accessor
    pub fn new<R: VariableRef>(name: impl Into<String>, var: R) -> Self {
        let kind = <R::Target as Variable>::KIND;
        let access = <R::Target as Variable>::ACCESS;

        VariableBinding {
            name: name.into(),
            kind,
            access,
            accessor: var.into_accessor(),
        }
    }

    /// Current value of the backing storage
    pub fn read(&self) -> VariableValue {
        (self.accessor)()
    }
}

impl fmt::Debug for VariableBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableBinding")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}
