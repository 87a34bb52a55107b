// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transform registry: pure value functions with declared arity and
//! ordered input port names.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::bundle::RegistryError;
use crate::descriptor::TransformDescriptor;

/// A pure value-transform function.
///
/// The declared arity and port names of the descriptor tell the compiler
/// how many operand expressions to bind and in what order; `apply`
/// receives exactly that many evaluated inputs (fewer only if the
/// compiled data was edited by hand, which implementations must tolerate).
pub trait ValueTransform: Send + Sync {
    /// Registry metadata for this transform
    fn descriptor(&self) -> TransformDescriptor;

    /// Apply the transform to the evaluated operands
    fn apply(&self, inputs: &[f32]) -> f32;
}

/// Fallible constructor for a bootstrap-registered transform
pub type TransformConstructor = fn() -> Result<Arc<dyn ValueTransform>, RegistryError>;

#[derive(Clone)]
struct TransformEntry {
    descriptor: TransformDescriptor,
    transform: Arc<dyn ValueTransform>,
}

/// Name-keyed table of value transforms
#[derive(Clone, Default)]
pub struct TransformRegistry {
    entries: IndexMap<String, TransformEntry>,
}

impl TransformRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Build a registry from an ordered bootstrap list; failed
    /// constructors are skipped with a warning, later names overwrite
    /// earlier ones.
    pub fn from_bootstrap(constructors: &[TransformConstructor]) -> Self {
        let mut registry = Self::new();
        for construct in constructors {
            match construct() {
                Ok(transform) => registry.register(transform),
                Err(err) => tracing::warn!(error = %err, "failed to register transform, skipping"),
            }
        }
        registry
    }

    /// Register a transform, overwriting any existing entry of the same name
    pub fn register(&mut self, transform: Arc<dyn ValueTransform>) {
        let descriptor = transform.descriptor();
        self.entries.insert(
            descriptor.name.clone(),
            TransformEntry {
                descriptor,
                transform,
            },
        );
    }

    /// Get a transform by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ValueTransform>> {
        self.entries.get(name).map(|e| Arc::clone(&e.transform))
    }

    /// Get a transform's descriptor by name
    pub fn descriptor(&self, name: &str) -> Option<&TransformDescriptor> {
        self.entries.get(name).map(|e| &e.descriptor)
    }

    /// Whether a transform of this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Descriptors of all registered transforms, in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &TransformDescriptor> {
        self.entries.values().map(|e| &e.descriptor)
    }

    /// Returns the number of registered transforms
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no transforms are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Standard transforms. These are the general-purpose math helpers most
// skills end up needing; games extend the bootstrap list with their own.

struct Percent;

impl ValueTransform for Percent {
    fn descriptor(&self) -> TransformDescriptor {
        TransformDescriptor::new("Percent", 2)
            .with_input_names(["Value", "Percent"])
            .with_color([204, 136, 136])
    }

    fn apply(&self, inputs: &[f32]) -> f32 {
        match inputs {
            [value, percent, ..] => value * percent / 100.0,
            _ => 0.0,
        }
    }
}

struct Clamp;

impl ValueTransform for Clamp {
    fn descriptor(&self) -> TransformDescriptor {
        TransformDescriptor::new("Clamp", 3)
            .with_input_names(["Value", "Min", "Max"])
            .with_color([136, 204, 136])
    }

    fn apply(&self, inputs: &[f32]) -> f32 {
        match inputs {
            [value, min, max, ..] => value.clamp(*min, *max),
            [value, ..] => *value,
            _ => 0.0,
        }
    }
}

struct Round;

impl ValueTransform for Round {
    fn descriptor(&self) -> TransformDescriptor {
        TransformDescriptor::new("Round", 1).with_input_names(["Value"])
    }

    fn apply(&self, inputs: &[f32]) -> f32 {
        match inputs {
            [value, ..] => value.round(),
            _ => 0.0,
        }
    }
}

struct Min;

impl ValueTransform for Min {
    fn descriptor(&self) -> TransformDescriptor {
        TransformDescriptor::new("Min", 2)
            .with_input_names(["A", "B"])
            .with_color([204, 204, 136])
    }

    fn apply(&self, inputs: &[f32]) -> f32 {
        match inputs {
            [a, b, ..] => a.min(*b),
            [a, ..] => *a,
            _ => 0.0,
        }
    }
}

struct Max;

impl ValueTransform for Max {
    fn descriptor(&self) -> TransformDescriptor {
        TransformDescriptor::new("Max", 2)
            .with_input_names(["A", "B"])
            .with_color([136, 204, 204])
    }

    fn apply(&self, inputs: &[f32]) -> f32 {
        match inputs {
            [a, b, ..] => a.max(*b),
            [a, ..] => *a,
            _ => 0.0,
        }
    }
}

/// Bootstrap list for the standard transform set: Percent, Clamp, Round,
/// Min, Max
pub fn standard_transforms() -> Vec<TransformConstructor> {
    vec![
        || Ok(Arc::new(Percent)),
        || Ok(Arc::new(Clamp)),
        || Ok(Arc::new(Round)),
        || Ok(Arc::new(Min)),
        || Ok(Arc::new(Max)),
    ]
}
