//! Name-indexed tables of native functions and pipe handlers.
//!
//! Both registries are assembled with a builder and are immutable afterwards.
//! Share them between VMs with `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sluice_foundation::NativeFn;

use crate::vm::pipe::{PipeHandler, builtin_handlers};

/// Native functions callable as `name(args...)`.
#[derive(Clone, Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<&'static str, NativeFn>,
}

impl FunctionRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> FunctionRegistryBuilder {
        FunctionRegistryBuilder::default()
    }

    /// Looks up a function by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NativeFn> {
        self.functions.get(name)
    }

    /// Returns true if a function is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns the number of functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if no functions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Returns the registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Builder for [`FunctionRegistry`].
#[derive(Default)]
pub struct FunctionRegistryBuilder {
    functions: HashMap<&'static str, NativeFn>,
}

impl FunctionRegistryBuilder {
    /// Adds a function, replacing any earlier one with the same name.
    #[must_use]
    pub fn register(mut self, func: NativeFn) -> Self {
        self.functions.insert(func.name, func);
        self
    }

    /// Adds several functions.
    #[must_use]
    pub fn register_all(self, funcs: impl IntoIterator<Item = NativeFn>) -> Self {
        funcs.into_iter().fold(self, Self::register)
    }

    /// Finishes the registry.
    #[must_use]
    pub fn build(self) -> FunctionRegistry {
        FunctionRegistry {
            functions: self.functions,
        }
    }
}

/// Pipe stage handlers, keyed by stage name.
#[derive(Clone, Default)]
pub struct PipeRegistry {
    handlers: HashMap<Arc<str>, Arc<dyn PipeHandler>>,
}

impl PipeRegistry {
    /// Returns a registry with the built-in stage kinds: `first`, `pipe`,
    /// `map`, `filter`, `find`, and `reduce`.
    #[must_use]
    pub fn builtin() -> Self {
        Self::builder().with_builtins().build()
    }

    /// Starts building a registry with no handlers.
    #[must_use]
    pub fn builder() -> PipeRegistryBuilder {
        PipeRegistryBuilder::default()
    }

    /// Looks up a handler by stage name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn PipeHandler>> {
        self.handlers.get(name)
    }

    /// Returns true if a handler is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Returns the registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|k| &**k).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for PipeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

/// Builder for [`PipeRegistry`].
#[derive(Default)]
pub struct PipeRegistryBuilder {
    handlers: HashMap<Arc<str>, Arc<dyn PipeHandler>>,
}

impl PipeRegistryBuilder {
    /// Adds the built-in stage kinds.
    #[must_use]
    pub fn with_builtins(mut self) -> Self {
        for (name, handler) in builtin_handlers() {
            self.handlers.insert(name.into(), handler);
        }
        self
    }

    /// Adds a handler, replacing any earlier one with the same name.
    #[must_use]
    pub fn register(mut self, name: impl Into<Arc<str>>, handler: Arc<dyn PipeHandler>) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Finishes the registry.
    #[must_use]
    pub fn build(self) -> PipeRegistry {
        PipeRegistry {
            handlers: self.handlers,
        }
    }
}
