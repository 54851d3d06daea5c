//! Function registration
//!
//! Remote function calls carry one string argument and return an integer
//! status. Free callables and bound instance methods are normalized to
//! the same boxed handler before they reach the runtime.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Uniform invocation shape for remote functions
pub type FunctionHandler = Box<dyn FnMut(&str) -> i32 + Send>;

/// Named function handed to the runtime registry
pub struct FunctionBinding {
    pub name: String,
    handler: FunctionHandler,
}

impl FunctionBinding {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(&str) -> i32 + Send + 'static,
    {
        FunctionBinding {
            name: name.into(),
            handler: Box::new(handler),
        }
    }

    /// Bind `method` to a shared instance
    ///
    /// The binding keeps its own handle on `instance`; calls lock it for the
    /// duration of the method.
    pub fn method<T>(
        name: impl Into<String>,
        instance: &Arc<Mutex<T>>,
        method: fn(&mut T, &str) -> i32,
    ) -> Self
    where
        T: Send + 'static,
    {
        let instance = Arc::clone(instance);
        Self::new(name, move |arg: &str| method(&mut instance.lock(), arg))
    }

    /// Invoke the handler with a call argument
    pub fn call(&mut self, arg: &str) -> i32 {
        (self.handler)(arg)
    }
}

impl fmt::Debug for FunctionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionBinding")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
