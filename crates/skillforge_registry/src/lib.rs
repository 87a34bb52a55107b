// SPDX-License-Identifier: MIT OR Apache-2.0
//! Capability registries for SkillForge.
//!
//! This crate provides the three name-keyed plugin tables that the compiler
//! and interpreter depend on:
//!
//! - **Effects**: side-effecting skill behaviours invoked by name
//! - **Properties**: named read/write accessors over game entities
//! - **Transforms**: pure value functions with declared arity and port names
//!
//! Registries are built from an explicit bootstrap list of fallible
//! constructors. A constructor that fails is skipped with a logged warning;
//! building never aborts. Duplicate names resolve by last-registered-wins,
//! deterministic because the bootstrap list is ordered.
//!
//! [`RegistryBundle`] packages the three tables behind a guarded lazy
//! build: the first caller builds, concurrent callers wait, and nobody
//! observes a partially built table. The bundle is an explicit value passed
//! into compile/execute calls, so tests construct isolated instances
//! instead of sharing global state.
//!
//! # Example
//!
//! ```rust
//! use skillforge_registry::{RegistryBootstrap, RegistryBundle, standard_transforms};
//!
//! let mut bootstrap: RegistryBootstrap<()> = RegistryBootstrap::default();
//! bootstrap.transforms = standard_transforms();
//! let bundle = RegistryBundle::new(bootstrap);
//!
//! let tables = bundle.tables();
//! assert!(tables.transforms.contains("Clamp"));
//! ```

pub mod bundle;
pub mod context;
pub mod descriptor;
pub mod effect;
pub mod property;
pub mod transform;

pub use bundle::{RegistryBootstrap, RegistryBundle, RegistryError, RegistryTables};
pub use context::SkillContext;
pub use descriptor::{EffectDescriptor, PropertyDescriptor, TransformDescriptor};
pub use effect::{EffectBehaviour, EffectConstructor, EffectRegistry};
pub use property::{PropertyAccessor, PropertyConstructor, PropertyRegistry};
pub use transform::{
    standard_transforms, TransformConstructor, TransformRegistry, ValueTransform,
};
