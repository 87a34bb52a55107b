// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge (connection) definitions for skill graphs.

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// A directed connection between two named ports.
///
/// Ports are identified by name, not index; the editor and the compiler
/// agree on port names through [`crate::config::EditorConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node ID
    pub from_node: NodeId,
    /// Source port name
    pub from_port: String,
    /// Destination node ID
    pub to_node: NodeId,
    /// Destination port name
    pub to_port: String,
}

impl Edge {
    /// Create a new edge
    pub fn new(
        from_node: NodeId,
        from_port: impl Into<String>,
        to_node: NodeId,
        to_port: impl Into<String>,
    ) -> Self {
        Self {
            from_node,
            from_port: from_port.into(),
            to_node,
            to_port: to_port.into(),
        }
    }

    /// Check if this edge involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }
}
