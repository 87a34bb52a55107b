// SPDX-License-Identifier: MIT OR Apache-2.0
//! Descriptors: the per-capability metadata a registry holds alongside
//! each implementation. Consumed by the editor surface (display name,
//! node color) and by the compiler (transform arity and port names).

use serde::{Deserialize, Serialize};

/// Metadata for a registered effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    /// Registry key and display name
    pub name: String,
    /// Short description for the editor palette
    pub description: String,
    /// Node color in the editor
    pub color: [u8; 3],
}

impl EffectDescriptor {
    /// Create a descriptor with a default color
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            color: [255, 255, 255],
        }
    }

    /// Set the node color
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }
}

/// Metadata for a registered property accessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Registry key and display name
    pub name: String,
    /// Grouping category for the editor palette
    pub category: String,
}

impl PropertyDescriptor {
    /// Create a descriptor in the given category
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

/// Metadata for a registered value transform.
///
/// The compiler uses the arity and ordered input names to bind exactly
/// that many operand expressions in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformDescriptor {
    /// Registry key and display name
    pub name: String,
    /// Node color in the editor
    pub color: [u8; 3],
    /// Number of operand slots
    pub arity: usize,
    /// Ordered input port labels; slots past the end fall back to
    /// sequential letters
    pub input_names: Vec<String>,
}

impl TransformDescriptor {
    /// Create a descriptor with unlabeled inputs
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            color: [136, 136, 204],
            arity,
            input_names: Vec::new(),
        }
    }

    /// Label the input ports, in declared order
    pub fn with_input_names<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.input_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the node color
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// The port name for a 0-based operand slot.
    ///
    /// Unlabeled slots default to sequential single letters A, B, C, ...
    pub fn input_port_name(&self, index: usize) -> String {
        match self.input_names.get(index) {
            Some(name) => name.clone(),
            None => char::from(b'A' + (index as u8 % 26)).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_port_name_fallback() {
        let desc = TransformDescriptor::new("Lerp", 3).with_input_names(["From", "To"]);
        assert_eq!(desc.input_port_name(0), "From");
        assert_eq!(desc.input_port_name(1), "To");
        assert_eq!(desc.input_port_name(2), "C");
    }

    #[test]
    fn test_unlabeled_inputs_use_letters() {
        let desc = TransformDescriptor::new("Sum", 3);
        assert_eq!(desc.input_port_name(0), "A");
        assert_eq!(desc.input_port_name(1), "B");
        assert_eq!(desc.input_port_name(2), "C");
    }
}
