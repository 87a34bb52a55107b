// SPDX-License-Identifier: MIT OR Apache-2.0
//! Effect registry: side-effecting skill behaviours invoked by name.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::bundle::RegistryError;
use crate::context::SkillContext;
use crate::descriptor::EffectDescriptor;

/// A side-effecting skill behaviour.
///
/// Implementations apply their effect to the scoped context using the
/// already-evaluated integer value.
pub trait EffectBehaviour<E>: Send + Sync {
    /// Registry metadata for this effect
    fn descriptor(&self) -> EffectDescriptor;

    /// Apply the effect
    fn execute(&self, context: &SkillContext<E>, value: i32);
}

/// Fallible constructor for a bootstrap-registered effect
pub type EffectConstructor<E> = fn() -> Result<Arc<dyn EffectBehaviour<E>>, RegistryError>;

struct EffectEntry<E: 'static> {
    descriptor: EffectDescriptor,
    behaviour: Arc<dyn EffectBehaviour<E>>,
}

impl<E: 'static> Clone for EffectEntry<E> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            behaviour: Arc::clone(&self.behaviour),
        }
    }
}

/// Name-keyed table of effect behaviours
pub struct EffectRegistry<E: 'static> {
    entries: IndexMap<String, EffectEntry<E>>,
}

impl<E: 'static> Default for EffectRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Clone for EffectRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<E: 'static> EffectRegistry<E> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Build a registry from an ordered bootstrap list.
    ///
    /// A constructor that fails is skipped with a warning; a later entry
    /// with the same name overwrites an earlier one.
    pub fn from_bootstrap(constructors: &[EffectConstructor<E>]) -> Self {
        let mut registry = Self::new();
        for construct in constructors {
            match construct() {
                Ok(behaviour) => registry.register(behaviour),
                Err(err) => tracing::warn!(error = %err, "failed to register effect, skipping"),
            }
        }
        registry
    }

    /// Register an effect, overwriting any existing entry of the same name
    pub fn register(&mut self, behaviour: Arc<dyn EffectBehaviour<E>>) {
        let descriptor = behaviour.descriptor();
        self.entries.insert(
            descriptor.name.clone(),
            EffectEntry {
                descriptor,
                behaviour,
            },
        );
    }

    /// Get an effect by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn EffectBehaviour<E>>> {
        self.entries.get(name).map(|e| Arc::clone(&e.behaviour))
    }

    /// Whether an effect of this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Descriptors of all registered effects, in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &EffectDescriptor> {
        self.entries.values().map(|e| &e.descriptor)
    }

    /// Returns the number of registered effects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no effects are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
