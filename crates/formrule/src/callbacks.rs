//! Named functions that rules can call.
//!
//! Rule strings refer to functions by name (`callback[notify]`,
//! `required[is_business]`). Names are resolved against this registry only;
//! nothing in a rule string is ever executed as code.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Side-effect function invoked by `callback[name]` with the trimmed value.
pub type FieldCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Predicate consulted by `required[name]`; `true` means emptiness fails.
pub type RequiredGate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Registry of caller-supplied named functions.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, FieldCallback>,
    gates: HashMap<String, RequiredGate>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a field callback under `name`, replacing any previous one.
    pub fn register_callback<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.insert(name.into(), Arc::new(callback));
    }

    /// Registers a required-gate under `name`, replacing any previous one.
    pub fn register_gate<F>(&mut self, name: impl Into<String>, gate: F)
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.gates.insert(name.into(), Arc::new(gate));
    }

    /// The field callback named `name`.
    #[must_use]
    pub fn callback(&self, name: &str) -> Option<&FieldCallback> {
        self.callbacks.get(name)
    }

    /// The required-gate named `name`.
    #[must_use]
    pub fn gate(&self, name: &str) -> Option<&RequiredGate> {
        self.gates.get(name)
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut callbacks: Vec<_> = self.callbacks.keys().collect();
        let mut gates: Vec<_> = self.gates.keys().collect();
        callbacks.sort();
        gates.sort();
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &callbacks)
            .field("gates", &gates)
            .finish()
    }
}
