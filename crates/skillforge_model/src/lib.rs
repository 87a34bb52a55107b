// SPDX-License-Identifier: MIT OR Apache-2.0
//! Skill graph data model for SkillForge.
//!
//! This crate defines the serializable data that flows between the graph
//! editor, the compiler, and the runtime:
//! - Graph nodes and edges authored by the editor
//! - The compiled flat-instruction pipeline produced by the compiler
//! - The editor/compiler shared port-name configuration
//!
//! ## Architecture
//!
//! A [`SkillGraph`] is the asset root: node and edge storage, skill
//! metadata, and the compiled [`SkillDefinition`] cached as derived data.
//! Compiled pipelines are regenerated wholesale on every compile, never
//! patched incrementally.

pub mod compiled;
pub mod config;
pub mod edge;
pub mod graph;
pub mod node;
pub mod variable;

pub use compiled::{
    CompareOp, CompiledAction, CompiledCondition, CompiledPipeline, CompiledValue, EntitySource,
    LogicalOp, MathOp, SkillDefinition,
};
pub use config::EditorConfig;
pub use edge::Edge;
pub use graph::{GraphError, SkillGraph};
pub use node::{Node, NodeId, NodeKind};
pub use variable::{SkillVariable, VariableKind};
