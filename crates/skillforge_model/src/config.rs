// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared editor/compiler configuration.
//!
//! Ports are addressed by name everywhere, so the editor surface and the
//! compiler must agree on one configuration instance. The defaults match
//! the conventional port labels; games can persist a customized copy
//! alongside their assets.

use serde::{Deserialize, Serialize};

/// Port names and slot layout shared by the editor and the compiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Pass-through caster input/output port name
    pub self_port: String,
    /// Pass-through target input/output port name
    pub target_port: String,
    /// Branch condition input port name
    pub condition_port: String,
    /// Context node caster output port name
    pub context_self_port: String,
    /// Context node target output port name
    pub context_target_port: String,
    /// Effect value input port name
    pub value_port: String,
    /// GetProperty entity input port name
    pub entity_port: String,
    /// Maximum number of pipeline slots per skill
    pub max_slots: usize,
    /// Format for slot port names on the Info node; `{}` is the 1-based
    /// slot number
    pub slot_port_format: String,
}

impl EditorConfig {
    /// The Info node port name for a 0-based slot index
    pub fn slot_port_name(&self, index: usize) -> String {
        self.slot_port_format.replace("{}", &(index + 1).to_string())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            self_port: "Self".to_string(),
            target_port: "Target".to_string(),
            condition_port: "Condition".to_string(),
            context_self_port: "Self".to_string(),
            context_target_port: "Target".to_string(),
            value_port: "Value".to_string(),
            entity_port: "Entity".to_string(),
            max_slots: 3,
            slot_port_format: "Slot {}".to_string(),
        }
    }
}
