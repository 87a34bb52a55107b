// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for skill graphs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compiled::{CompareOp, LogicalOp, MathOp};
use crate::variable::SkillVariable;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A node instance in a skill graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Position in the graph UI (irrelevant to compilation)
    pub position: [f32; 2],
    /// Behaviour-determining payload
    pub kind: NodeKind,
}

impl Node {
    /// Create a new node of the given kind
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            position: [0.0, 0.0],
            kind,
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }
}

/// The kind of a skill graph node.
///
/// Only `Effect` and `Branch` nodes are scheduled as instructions by the
/// compiler; every other kind is resolved on demand as an expression
/// operand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    /// Singleton root node; pipeline slots hang off its output ports
    Info,
    /// Marks the Self/Target entry point of one pipeline slot
    Context,
    /// Invokes a registered effect by name
    Effect {
        /// Registered effect name
        effect_name: String,
        /// Inline literal used when the Value port is unconnected
        value: i32,
    },
    /// Conditional forward-skip gate
    Branch,
    /// Logical combinator over condition inputs
    Logical(LogicalOp),
    /// Numeric comparison producing a condition
    Comparison(CompareOp),
    /// Literal float value
    Constant {
        /// The literal
        value: f32,
    },
    /// Named mutable scalar with a declared numeric kind
    Variable(SkillVariable),
    /// Reads a registered entity property by name
    GetProperty {
        /// Registered property name
        property_name: String,
    },
    /// Binary arithmetic over two value inputs
    Math(MathOp),
    /// Invokes a registered value transform by name
    Processor {
        /// Registered transform name
        processor_name: String,
    },
    /// Non-functional annotation
    Comment {
        /// Annotation text
        text: String,
    },
}

impl NodeKind {
    /// Get the display name for this node kind
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Info => "Skill Info",
            Self::Context => "Context",
            Self::Effect { .. } => "Effect",
            Self::Branch => "Branch",
            Self::Logical(_) => "Logical",
            Self::Comparison(_) => "Comparison",
            Self::Constant { .. } => "Constant",
            Self::Variable(_) => "Variable",
            Self::GetProperty { .. } => "Get Property",
            Self::Math(_) => "Math",
            Self::Processor { .. } => "Processor",
            Self::Comment { .. } => "Comment",
        }
    }

    /// Whether the compiler schedules this kind as an instruction
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Effect { .. } | Self::Branch)
    }
}
