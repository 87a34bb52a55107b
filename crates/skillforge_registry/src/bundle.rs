// SPDX-License-Identifier: MIT OR Apache-2.0
//! The registry bundle: all three capability tables behind one guarded
//! lazy build.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::effect::{EffectConstructor, EffectRegistry};
use crate::property::{PropertyConstructor, PropertyRegistry};
use crate::transform::{TransformConstructor, TransformRegistry};

/// Error carried by a failed capability constructor
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The implementation could not be constructed
    #[error("construction failed: {0}")]
    Construction(String),
}

/// The ordered bootstrap lists the bundle builds its tables from.
///
/// Order matters: on duplicate names the last entry wins, so the list
/// itself is the deterministic collision-resolution rule.
pub struct RegistryBootstrap<E: 'static> {
    /// Effect constructors
    pub effects: Vec<EffectConstructor<E>>,
    /// Property accessor constructors
    pub properties: Vec<PropertyConstructor<E>>,
    /// Value transform constructors
    pub transforms: Vec<TransformConstructor>,
}

impl<E: 'static> Default for RegistryBootstrap<E> {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            properties: Vec::new(),
            transforms: Vec::new(),
        }
    }
}

/// The built, read-only capability tables
pub struct RegistryTables<E: 'static> {
    /// Effect behaviours by name
    pub effects: EffectRegistry<E>,
    /// Property accessors by name
    pub properties: PropertyRegistry<E>,
    /// Value transforms by name
    pub transforms: TransformRegistry,
}

impl<E: 'static> Clone for RegistryTables<E> {
    fn clone(&self) -> Self {
        Self {
            effects: self.effects.clone(),
            properties: self.properties.clone(),
            transforms: self.transforms.clone(),
        }
    }
}

impl<E: 'static> RegistryTables<E> {
    fn build(bootstrap: &RegistryBootstrap<E>) -> Self {
        Self {
            effects: EffectRegistry::from_bootstrap(&bootstrap.effects),
            properties: PropertyRegistry::from_bootstrap(&bootstrap.properties),
            transforms: TransformRegistry::from_bootstrap(&bootstrap.transforms),
        }
    }
}

/// Lazily built bundle of the three capability registries.
///
/// The first call to [`tables`](Self::tables) builds all three tables
/// under a write lock; concurrent first callers wait, and no caller ever
/// observes a partially built table. After that the tables are read-only
/// and cheaply shared. [`invalidate`](Self::invalidate) drops the cache so
/// the next access rebuilds from the bootstrap lists.
///
/// The bundle is an explicit value passed into compile and execute calls;
/// tests construct isolated bundles instead of sharing process globals.
pub struct RegistryBundle<E: 'static> {
    bootstrap: RegistryBootstrap<E>,
    tables: RwLock<Option<Arc<RegistryTables<E>>>>,
}

impl<E: 'static> RegistryBundle<E> {
    /// Create a bundle that will build from the given bootstrap lists
    pub fn new(bootstrap: RegistryBootstrap<E>) -> Self {
        Self {
            bootstrap,
            tables: RwLock::new(None),
        }
    }

    /// The built tables, building them on first access
    pub fn tables(&self) -> Arc<RegistryTables<E>> {
        if let Some(tables) = self.tables.read().as_ref() {
            return Arc::clone(tables);
        }

        let mut slot = self.tables.write();
        // Another caller may have built while we waited for the lock.
        if let Some(tables) = slot.as_ref() {
            return Arc::clone(tables);
        }

        tracing::debug!("building capability registries");
        let built = Arc::new(RegistryTables::build(&self.bootstrap));
        *slot = Some(Arc::clone(&built));
        built
    }

    /// Drop the built tables so the next access rebuilds them
    pub fn invalidate(&self) {
        *self.tables.write() = None;
    }

    /// Add an effect at runtime, overwriting any same-name entry.
    ///
    /// Existing [`RegistryTables`] handles keep the old view; new
    /// `tables()` calls see the addition.
    pub fn register_effect(&self, behaviour: Arc<dyn crate::effect::EffectBehaviour<E>>) {
        let mut tables = (*self.tables()).clone();
        tables.effects.register(behaviour);
        *self.tables.write() = Some(Arc::new(tables));
    }

    /// Add a property accessor at runtime, overwriting any same-name entry
    pub fn register_property(&self, accessor: Arc<dyn crate::property::PropertyAccessor<E>>) {
        let mut tables = (*self.tables()).clone();
        tables.properties.register(accessor);
        *self.tables.write() = Some(Arc::new(tables));
    }

    /// Add a value transform at runtime, overwriting any same-name entry
    pub fn register_transform(&self, transform: Arc<dyn crate::transform::ValueTransform>) {
        let mut tables = (*self.tables()).clone();
        tables.transforms.register(transform);
        *self.tables.write() = Some(Arc::new(tables));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::context::SkillContext;
    use crate::descriptor::{EffectDescriptor, TransformDescriptor};
    use crate::effect::EffectBehaviour;
    use crate::transform::{standard_transforms, ValueTransform};

    static BUILD_COUNT: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl EffectBehaviour<()> for Counted {
        fn descriptor(&self) -> EffectDescriptor {
            EffectDescriptor::new("Counted", "")
        }

        fn execute(&self, _context: &SkillContext<()>, _value: i32) {}
    }

    fn counted_constructor() -> Result<Arc<dyn EffectBehaviour<()>>, RegistryError> {
        BUILD_COUNT.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Counted))
    }

    #[test]
    fn test_lazy_build_runs_once() {
        BUILD_COUNT.store(0, Ordering::SeqCst);
        let bundle = RegistryBundle::new(RegistryBootstrap {
            effects: vec![counted_constructor],
            ..RegistryBootstrap::default()
        });

        let first = bundle.tables();
        let second = bundle.tables();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(BUILD_COUNT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalidate_rebuilds() {
        BUILD_COUNT.store(0, Ordering::SeqCst);
        let bundle = RegistryBundle::new(RegistryBootstrap {
            effects: vec![counted_constructor],
            ..RegistryBootstrap::default()
        });

        bundle.tables();
        bundle.invalidate();
        bundle.tables();
        assert_eq!(BUILD_COUNT.load(Ordering::SeqCst), 2);
    }

    struct Doubler;

    impl ValueTransform for Doubler {
        fn descriptor(&self) -> TransformDescriptor {
            TransformDescriptor::new("Double", 1)
        }

        fn apply(&self, inputs: &[f32]) -> f32 {
            inputs.first().copied().unwrap_or(0.0) * 2.0
        }
    }

    #[test]
    fn test_runtime_registration_visible_to_new_readers() {
        let bundle: RegistryBundle<()> = RegistryBundle::new(RegistryBootstrap {
            transforms: standard_transforms(),
            ..RegistryBootstrap::default()
        });

        let before = bundle.tables();
        bundle.register_transform(Arc::new(Doubler));
        let after = bundle.tables();

        assert!(!before.transforms.contains("Double"));
        assert!(after.transforms.contains("Double"));
        assert_eq!(after.transforms.len(), before.transforms.len() + 1);
    }
}
