// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiled pipeline representation.
//!
//! The compiler lowers a skill graph into a flat, ordered instruction list
//! per pipeline slot. Control flow is a single construct: a `Branch`
//! instruction that skips strictly forward when its condition is false.
//! Value and condition operands are self-contained expression trees; each
//! composite variant exclusively owns its children, so evaluation needs no
//! cycle detection.

use serde::{Deserialize, Serialize};

/// Selects which entity of the execution context an operation reads.
///
/// `Caster` is the "Self" role of the graph's Context node; the port names
/// stay "Self"/"Target" in [`crate::config::EditorConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntitySource {
    /// The casting entity (the Context node's Self output)
    Caster,
    /// The targeted entity
    Target,
}

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathOp {
    /// a + b
    Add,
    /// a - b
    Subtract,
    /// a * b
    Multiply,
    /// a / b, yielding 0 when b is 0
    Divide,
}

impl MathOp {
    /// Apply the operator. Division by zero yields 0, never an error.
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => {
                if b == 0.0 {
                    0.0
                } else {
                    a / b
                }
            }
        }
    }
}

/// Numeric comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// Epsilon-tolerant equality
    Equal,
    /// a > b
    Greater,
    /// a < b
    Less,
    /// a >= b
    GreaterOrEqual,
    /// a <= b
    LessOrEqual,
}

impl CompareOp {
    /// Evaluate the comparison. `Equal` is epsilon-tolerant; the ordering
    /// operators compare strictly.
    pub fn evaluate(self, a: f32, b: f32) -> bool {
        match self {
            Self::Equal => approximately(a, b),
            Self::Greater => a > b,
            Self::Less => a < b,
            Self::GreaterOrEqual => a >= b,
            Self::LessOrEqual => a <= b,
        }
    }
}

/// Logical combinator for condition nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    /// Both inputs true
    And,
    /// Either input true
    Or,
    /// Negate the single input
    Not,
}

/// Epsilon-tolerant float equality.
///
/// Tolerance scales with the magnitude of the operands and never drops
/// below a few machine epsilons, so values that differ only by accumulated
/// rounding compare equal.
pub fn approximately(a: f32, b: f32) -> bool {
    (b - a).abs() < (1e-6 * a.abs().max(b.abs())).max(f32::EPSILON * 8.0)
}

/// A compiled value expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CompiledValue {
    /// Literal value
    Constant(f32),
    /// Read a registered property from an entity of the context
    EntityProperty {
        /// Which context entity to read
        source: EntitySource,
        /// Registered property name
        property_name: String,
    },
    /// Binary arithmetic over two sub-expressions
    Math {
        /// Operator
        op: MathOp,
        /// Left operand
        lhs: Box<CompiledValue>,
        /// Right operand
        rhs: Box<CompiledValue>,
    },
    /// Invoke a registered value transform over its operand list
    Processor {
        /// Registered transform name
        processor_name: String,
        /// Operands, in the transform's declared port order
        inputs: Vec<CompiledValue>,
    },
}

/// A compiled condition expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CompiledCondition {
    /// Constant true (the default for unconnected condition ports)
    AlwaysTrue,
    /// Constant false
    AlwaysFalse,
    /// Both sub-conditions true; short-circuits at run time
    And {
        /// Left operand
        lhs: Box<CompiledCondition>,
        /// Right operand
        rhs: Box<CompiledCondition>,
    },
    /// Either sub-condition true; short-circuits at run time
    Or {
        /// Left operand
        lhs: Box<CompiledCondition>,
        /// Right operand
        rhs: Box<CompiledCondition>,
    },
    /// Negation of the inner condition
    Not {
        /// Negated operand
        inner: Box<CompiledCondition>,
    },
    /// Numeric comparison of two value expressions
    Compare {
        /// Operator
        op: CompareOp,
        /// Left value
        lhs: Box<CompiledValue>,
        /// Right value
        rhs: Box<CompiledValue>,
    },
}

/// One flat-list instruction of a compiled pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CompiledAction {
    /// Invoke a named effect with an evaluated integer value
    Effect {
        /// Registered effect name
        effect_name: String,
        /// Value expression, truncated to an integer at invocation
        value: CompiledValue,
        /// Entity bound to the scoped context's caster slot
        caster_source: EntitySource,
        /// Entity bound to the scoped context's target slot
        target_source: EntitySource,
    },
    /// Conditionally skip forward over the continuation block
    Branch {
        /// Gate condition; false skips to `jump_if_false`
        condition: CompiledCondition,
        /// Entity bound to the caster slot
        caster_source: EntitySource,
        /// Entity bound to the target slot
        target_source: EntitySource,
        /// Resume index when the condition is false.
        ///
        /// Invariant: strictly greater than this action's own index and at
        /// most the action count, so all jumps move forward and execution
        /// terminates without loop detection.
        jump_if_false: usize,
    },
}

/// An ordered sequence of compiled actions for one pipeline slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledPipeline {
    /// Instructions, executed by a forward index loop
    pub actions: Vec<CompiledAction>,
}

impl CompiledPipeline {
    /// Get the number of actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the pipeline holds no actions
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// The compiled pipelines of one skill, indexed by slot.
///
/// Slots beyond the graph's configured slot count stay `None`; slots that
/// failed to compile structurally hold an empty pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    /// One optional pipeline per slot
    pub slots: Vec<Option<CompiledPipeline>>,
}

impl SkillDefinition {
    /// Create a definition with `count` empty slots
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    /// Get the pipeline compiled for a slot, if any
    pub fn slot(&self, index: usize) -> Option<&CompiledPipeline> {
        self.slots.get(index).and_then(Option::as_ref)
    }
}
