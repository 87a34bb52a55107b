// SPDX-License-Identifier: MIT OR Apache-2.0
//! Execution context: the caster/target entity pair a pipeline runs against.

use skillforge_model::EntitySource;

/// The entity pair one pipeline executes against.
///
/// `E` is the caller's entity handle type; it must be cheap to clone (an
/// ID, an `Arc`, an ECS handle). The context is the only mutable state
/// shared during a single execute call, and nothing outside that call may
/// mutate it.
#[derive(Debug, Clone)]
pub struct SkillContext<E> {
    /// The casting entity
    pub caster: E,
    /// The targeted entity
    pub target: E,
}

impl<E> SkillContext<E> {
    /// Create a context from a caster/target pair
    pub fn new(caster: E, target: E) -> Self {
        Self { caster, target }
    }

    /// The entity selected by a compiled entity source
    pub fn entity(&self, source: EntitySource) -> &E {
        match source {
            EntitySource::Caster => &self.caster,
            EntitySource::Target => &self.target,
        }
    }
}

impl<E: Clone> SkillContext<E> {
    /// Derive the execution-scoped context for one action's recorded
    /// entity sources
    pub fn scoped(&self, caster_source: EntitySource, target_source: EntitySource) -> Self {
        Self {
            caster: self.entity(caster_source).clone(),
            target: self.entity(target_source).clone(),
        }
    }
}
