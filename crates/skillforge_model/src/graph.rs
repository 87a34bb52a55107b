// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph asset containing nodes, edges, and cached compiled data.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::compiled::{CompiledPipeline, SkillDefinition};
use crate::edge::Edge;
use crate::node::{Node, NodeId};

/// A skill graph asset.
///
/// Holds the editor-authored nodes and edges, skill metadata, and the
/// compiled [`SkillDefinition`] as derived data. The compiled data is
/// regenerated from scratch on every compile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGraph {
    /// Skill display name
    pub skill_name: String,
    /// Skill description
    pub description: String,
    /// Number of active pipeline slots (1 through the configured maximum)
    pub slot_count: usize,
    /// Nodes, keyed by ID in insertion order
    nodes: IndexMap<NodeId, Node>,
    /// Directed edges between named ports
    edges: Vec<Edge>,
    /// Compiled pipelines, regenerated wholesale by the compiler
    pub compiled: SkillDefinition,
}

impl SkillGraph {
    /// Create a new empty graph with one pipeline slot
    pub fn new(skill_name: impl Into<String>) -> Self {
        Self {
            skill_name: skill_name.into(),
            description: String::new(),
            slot_count: 1,
            nodes: IndexMap::new(),
            edges: Vec::new(),
            compiled: SkillDefinition::default(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its incident edges
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.edges.retain(|e| !e.involves_node(node_id));
        self.nodes.swap_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Connect two named ports.
    ///
    /// Both endpoint nodes must exist; self-loops are rejected. Port-name
    /// agreement is the editor's responsibility, so unknown port names are
    /// not an error here - the compiler simply never finds them.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: impl Into<String>,
        to_node: NodeId,
        to_port: impl Into<String>,
    ) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&from_node) {
            return Err(GraphError::NodeNotFound(from_node));
        }
        if !self.nodes.contains_key(&to_node) {
            return Err(GraphError::NodeNotFound(to_node));
        }
        if from_node == to_node {
            return Err(GraphError::SelfLoop);
        }

        self.edges.push(Edge::new(from_node, from_port, to_node, to_port));
        Ok(())
    }

    /// Get all edges
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The first edge arriving at a named input port of a node
    pub fn edge_into(&self, node_id: NodeId, port: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.to_node == node_id && e.to_port == port)
    }

    /// The first edge leaving a named output port of a node
    pub fn edge_out_of(&self, node_id: NodeId, port: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.from_node == node_id && e.from_port == port)
    }

    /// All edges leaving a node, on any port
    pub fn edges_from(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.from_node == node_id)
    }

    /// The graph's Info node, if present
    pub fn info_node(&self) -> Option<&Node> {
        self.nodes
            .values()
            .find(|n| matches!(n.kind, crate::node::NodeKind::Info))
    }

    /// The pipeline compiled for a slot, if any
    pub fn pipeline(&self, slot: usize) -> Option<&CompiledPipeline> {
        self.compiled.slot(slot)
    }
}

/// Error when mutating a graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Self-loop not allowed
    #[error("self-loop not allowed")]
    SelfLoop,
}
