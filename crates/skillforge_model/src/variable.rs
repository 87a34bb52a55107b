// SPDX-License-Identifier: MIT OR Apache-2.0
//! Skill variables: named scalars with a declared numeric kind.

use serde::{Deserialize, Serialize};

/// Declared numeric kind of a skill variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    /// Whole-number variable
    Int,
    /// Floating-point variable
    Float,
}

/// A named mutable scalar attached to a skill graph.
///
/// Carries both a default (authored in the graph) and a current value
/// (tunable per asset). The compiler folds a Variable node to a constant
/// holding its current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillVariable {
    /// Variable name
    pub name: String,
    /// Declared numeric kind
    pub kind: VariableKind,
    /// Default whole-number value
    pub default_int: i32,
    /// Default floating-point value
    pub default_float: f32,
    /// Current whole-number value
    pub int_value: i32,
    /// Current floating-point value
    pub float_value: f32,
}

impl SkillVariable {
    /// Create a variable with zeroed values
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default_int: 0,
            default_float: 0.0,
            int_value: 0,
            float_value: 0.0,
        }
    }

    /// Current value widened to f32 according to the declared kind
    pub fn value_as_f32(&self) -> f32 {
        match self.kind {
            VariableKind::Int => self.int_value as f32,
            VariableKind::Float => self.float_value,
        }
    }

    /// Set the current value, truncating for `Int` variables
    pub fn set_value(&mut self, value: f32) {
        match self.kind {
            VariableKind::Int => self.int_value = value as i32,
            VariableKind::Float => self.float_value = value,
        }
    }

    /// Reset the current value to the authored default
    pub fn reset_to_default(&mut self) {
        self.int_value = self.default_int;
        self.float_value = self.default_float;
    }
}
