// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property registry: named read/write accessors over game entities.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::bundle::RegistryError;
use crate::descriptor::PropertyDescriptor;

/// A named scalar property of a game entity.
///
/// Accessors take the entity handle by reference; mutation goes through
/// whatever interior mutability the handle type provides.
pub trait PropertyAccessor<E>: Send + Sync {
    /// Registry metadata for this property
    fn descriptor(&self) -> PropertyDescriptor;

    /// Read the property value
    fn read(&self, entity: &E) -> f32;

    /// Write the property value
    fn write(&self, entity: &E, value: f32);
}

/// Fallible constructor for a bootstrap-registered property accessor
pub type PropertyConstructor<E> = fn() -> Result<Arc<dyn PropertyAccessor<E>>, RegistryError>;

struct PropertyEntry<E: 'static> {
    descriptor: PropertyDescriptor,
    accessor: Arc<dyn PropertyAccessor<E>>,
}

impl<E: 'static> Clone for PropertyEntry<E> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            accessor: Arc::clone(&self.accessor),
        }
    }
}

/// Name-keyed table of property accessors
pub struct PropertyRegistry<E: 'static> {
    entries: IndexMap<String, PropertyEntry<E>>,
}

impl<E: 'static> Default for PropertyRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Clone for PropertyRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<E: 'static> PropertyRegistry<E> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Build a registry from an ordered bootstrap list; failed
    /// constructors are skipped with a warning, later names overwrite
    /// earlier ones.
    pub fn from_bootstrap(constructors: &[PropertyConstructor<E>]) -> Self {
        let mut registry = Self::new();
        for construct in constructors {
            match construct() {
                Ok(accessor) => registry.register(accessor),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to register property accessor, skipping");
                }
            }
        }
        registry
    }

    /// Register an accessor, overwriting any existing entry of the same name
    pub fn register(&mut self, accessor: Arc<dyn PropertyAccessor<E>>) {
        let descriptor = accessor.descriptor();
        self.entries.insert(
            descriptor.name.clone(),
            PropertyEntry {
                descriptor,
                accessor,
            },
        );
    }

    /// Get an accessor by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn PropertyAccessor<E>>> {
        self.entries.get(name).map(|e| Arc::clone(&e.accessor))
    }

    /// Whether a property of this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Read a property from an entity; an unknown name reads as 0
    pub fn read(&self, name: &str, entity: &E) -> f32 {
        match self.get(name) {
            Some(accessor) => accessor.read(entity),
            None => {
                tracing::warn!(property = name, "property not registered, reading 0");
                0.0
            }
        }
    }

    /// Descriptors of all registered properties, in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.entries.values().map(|e| &e.descriptor)
    }

    /// Returns the number of registered properties
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no properties are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
