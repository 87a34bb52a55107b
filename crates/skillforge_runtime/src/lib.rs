// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph compiler and pipeline interpreter for SkillForge.
//!
//! The compiler walks a [`skillforge_model::SkillGraph`] from its Info
//! node and lowers each pipeline slot to a flat instruction list with
//! embedded expression trees. The interpreter executes a compiled
//! pipeline against a caster/target context and the capability
//! registries.
//!
//! Both passes are synchronous and total: malformed graph structure
//! compiles to an empty pipeline for the affected slot, and missing
//! registry entries evaluate to zero or skip one instruction. Neither
//! pass aborts a whole compile or execute call for a single bad node.

pub mod compiler;
pub mod executor;

pub use compiler::{compile, recompile, GraphCompiler};
pub use executor::{execute, execute_slot};
