use crate::fault::{Fault, FaultKind};
use std::any::{self, Any};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Type-erased values
// =============================================================================

/// A value whose static type has been erased, remembering the name of what it was.
pub struct DynValue {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl DynValue {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Recover the concrete value, or a type-mismatch fault naming both types.
    pub fn downcast<T: Any>(self) -> Result<T, Fault> {
        let type_name = self.type_name;
        self.value.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
            Fault::new(
                FaultKind::TypeMismatch,
                format!("cannot cast {} to {}", type_name, any::type_name::<T>()),
            )
        })
    }
}

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Type registry
// =============================================================================

type Constructor = Box<dyn Fn() -> DynValue>;

/// Name → constructor lookup, the only place a type can be resolved by name.
#[derive(Default)]
pub struct TypeRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<i32>("i32");
        registry.register::<i64>("i64");
        registry.register::<f64>("f64");
        registry.register::<bool>("bool");
        registry.register::<String>("String");
        registry
    }

    /// Register `T` under `name`, replacing any earlier registration.
    pub fn register<T: Any + Default>(&mut self, name: impl Into<String>) -> &mut Self {
        self.constructors
            .insert(name.into(), Box::new(|| DynValue::new(T::default())));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Build a fresh default instance of the type registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<DynValue, Fault> {
        self.constructors
            .get(name)
            .map(|construct| construct())
            .ok_or_else(|| {
                Fault::new(
                    FaultKind::LookupFailure,
                    format!("type '{name}' is not registered"),
                )
            })
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("names", &self.names())
            .finish()
    }
}
