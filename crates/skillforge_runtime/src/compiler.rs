// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph-to-instruction compiler.
//!
//! Each pipeline slot is walked from the Info node's slot port through a
//! Context node, then depth-first along the pass-through edges. Only
//! Effect and Branch nodes become instructions; every other node kind is
//! resolved on demand as an expression operand. Branch continuations are
//! appended inline and the branch's forward jump is patched to one past
//! the continuation's end.

use std::collections::HashSet;

use skillforge_model::{
    CompiledAction, CompiledCondition, CompiledPipeline, CompiledValue, EditorConfig, EntitySource,
    LogicalOp, NodeId, NodeKind, SkillDefinition, SkillGraph,
};
use skillforge_registry::TransformRegistry;

/// Math, comparison, and logical nodes expose their operands on these
/// fixed ports.
const OPERAND_A: &str = "A";
const OPERAND_B: &str = "B";

/// Entity-source tracing follows same-named ports upstream; a malformed
/// edge cycle would otherwise recurse forever.
const MAX_TRACE_DEPTH: usize = 256;

/// Compiles skill graphs into flat instruction pipelines.
///
/// Borrows the shared editor configuration (port names, slot layout) and
/// the transform registry (arity and port-name metadata for Processor
/// nodes). Compilation is deterministic for a fixed graph and fixed
/// registry contents.
pub struct GraphCompiler<'a> {
    config: &'a EditorConfig,
    transforms: &'a TransformRegistry,
}

impl<'a> GraphCompiler<'a> {
    /// Create a compiler over a configuration and transform registry
    pub fn new(config: &'a EditorConfig, transforms: &'a TransformRegistry) -> Self {
        Self { config, transforms }
    }

    /// Compile every pipeline slot of a graph.
    ///
    /// Slots up to the graph's `slot_count` always compile to a pipeline,
    /// empty on structural problems; slots beyond it stay `None`. The
    /// prior compiled data is not consulted - the result is regenerated
    /// from scratch.
    pub fn compile(&self, graph: &SkillGraph) -> SkillDefinition {
        let mut definition = SkillDefinition::with_slots(self.config.max_slots);

        let Some(info) = graph.info_node() else {
            tracing::warn!(skill = %graph.skill_name, "graph has no Info node");
            for slot in definition.slots.iter_mut().take(graph.slot_count) {
                *slot = Some(CompiledPipeline::default());
            }
            return definition;
        };

        let info_id = info.id;
        let active = graph.slot_count.min(self.config.max_slots);
        for slot in 0..active {
            definition.slots[slot] = Some(self.compile_slot(graph, info_id, slot));
        }

        tracing::debug!(
            skill = %graph.skill_name,
            slots = active,
            "compiled skill graph"
        );
        definition
    }

    fn compile_slot(&self, graph: &SkillGraph, info_id: NodeId, slot: usize) -> CompiledPipeline {
        let port = self.config.slot_port_name(slot);
        let mut pipeline = CompiledPipeline::default();

        let Some(slot_edge) = graph.edge_out_of(info_id, &port) else {
            tracing::warn!(port = %port, "no pipeline connected to slot");
            return pipeline;
        };

        let context_id = slot_edge.to_node;
        let is_context = graph
            .node(context_id)
            .is_some_and(|n| matches!(n.kind, NodeKind::Context));
        if !is_context {
            tracing::warn!(port = %port, "slot edge does not lead to a Context node");
            return pipeline;
        }

        let mut visited = HashSet::new();
        for edge in graph.edges_from(context_id) {
            self.compile_node(graph, edge.to_node, &mut pipeline, &mut visited);
        }
        pipeline
    }

    fn compile_node(
        &self,
        graph: &SkillGraph,
        node_id: NodeId,
        pipeline: &mut CompiledPipeline,
        visited: &mut HashSet<NodeId>,
    ) {
        // The visited set both deduplicates diamond-shaped pass-through
        // fan-in and terminates compilation on malformed cyclic edges.
        if !visited.insert(node_id) {
            return;
        }
        let Some(node) = graph.node(node_id) else {
            return;
        };

        match &node.kind {
            NodeKind::Effect { effect_name, value } => {
                pipeline.actions.push(CompiledAction::Effect {
                    effect_name: effect_name.clone(),
                    value: self.compile_effect_value(graph, node_id, *value),
                    caster_source: self.trace_entity_source(
                        graph,
                        node_id,
                        &self.config.self_port,
                        EntitySource::Caster,
                    ),
                    target_source: self.trace_entity_source(
                        graph,
                        node_id,
                        &self.config.target_port,
                        EntitySource::Target,
                    ),
                });
                self.propagate(graph, node_id, pipeline, visited);
            }
            NodeKind::Branch => {
                let branch_index = pipeline.actions.len();
                pipeline.actions.push(CompiledAction::Branch {
                    condition: self.compile_branch_condition(graph, node_id),
                    caster_source: self.trace_entity_source(
                        graph,
                        node_id,
                        &self.config.self_port,
                        EntitySource::Caster,
                    ),
                    target_source: self.trace_entity_source(
                        graph,
                        node_id,
                        &self.config.target_port,
                        EntitySource::Target,
                    ),
                    jump_if_false: 0,
                });

                // The continuation is everything reachable downstream,
                // appended inline; a false condition skips exactly that
                // block.
                self.propagate(graph, node_id, pipeline, visited);

                let continuation_end = pipeline.actions.len();
                if let CompiledAction::Branch { jump_if_false, .. } =
                    &mut pipeline.actions[branch_index]
                {
                    *jump_if_false = continuation_end;
                }
            }
            // Everything else is expression-only: resolved as an operand
            // when some action references it, never scheduled.
            _ => {}
        }
    }

    fn propagate(
        &self,
        graph: &SkillGraph,
        node_id: NodeId,
        pipeline: &mut CompiledPipeline,
        visited: &mut HashSet<NodeId>,
    ) {
        for edge in graph.edges_from(node_id) {
            self.compile_node(graph, edge.to_node, pipeline, visited);
        }
    }

    /// Trace a Self/Target input port backward to the nearest Context
    /// ancestor output. Intermediate action nodes re-expose the ports by
    /// the same names, so the trace follows same-named inputs upstream.
    fn trace_entity_source(
        &self,
        graph: &SkillGraph,
        node_id: NodeId,
        input_port: &str,
        default: EntitySource,
    ) -> EntitySource {
        match graph.edge_into(node_id, input_port) {
            Some(edge) => {
                self.trace_to_context(graph, edge.from_node, &edge.from_port, default, 0)
            }
            None => default,
        }
    }

    fn trace_to_context(
        &self,
        graph: &SkillGraph,
        node_id: NodeId,
        out_port: &str,
        default: EntitySource,
        depth: usize,
    ) -> EntitySource {
        if depth >= MAX_TRACE_DEPTH {
            tracing::warn!("entity-source trace exceeded depth limit; using default");
            return default;
        }
        let Some(node) = graph.node(node_id) else {
            return default;
        };

        if matches!(node.kind, NodeKind::Context) {
            return if out_port == self.config.context_self_port {
                EntitySource::Caster
            } else {
                EntitySource::Target
            };
        }

        match graph.edge_into(node_id, out_port) {
            Some(edge) => {
                self.trace_to_context(graph, edge.from_node, &edge.from_port, default, depth + 1)
            }
            None => default,
        }
    }

    /// An Effect node's value: the compiled Value-port expression, or the
    /// node's inline literal when the port is unconnected (or connected
    /// to something that is not a value source).
    fn compile_effect_value(
        &self,
        graph: &SkillGraph,
        node_id: NodeId,
        inline: i32,
    ) -> CompiledValue {
        let fallback = CompiledValue::Constant(inline as f32);
        match graph.edge_into(node_id, &self.config.value_port) {
            Some(edge) => self
                .compile_value_source(graph, edge.from_node)
                .unwrap_or(fallback),
            None => fallback,
        }
    }

    /// A value operand read from a named input port; unconnected operands
    /// default to constant 0.
    fn compile_operand(&self, graph: &SkillGraph, node_id: NodeId, port: &str) -> CompiledValue {
        match graph.edge_into(node_id, port) {
            Some(edge) => self
                .compile_value_source(graph, edge.from_node)
                .unwrap_or(CompiledValue::Constant(0.0)),
            None => CompiledValue::Constant(0.0),
        }
    }

    /// Resolve a node as a value expression, or `None` if its kind does
    /// not produce a value. Shared subgraphs are re-walked on every
    /// reference: compiled expressions are owned trees, not shared graphs.
    fn compile_value_source(&self, graph: &SkillGraph, node_id: NodeId) -> Option<CompiledValue> {
        let node = graph.node(node_id)?;
        match &node.kind {
            NodeKind::Constant { value } => Some(CompiledValue::Constant(*value)),
            NodeKind::Variable(variable) => {
                // Folded at compile time; re-compile to pick up new values.
                Some(CompiledValue::Constant(variable.value_as_f32()))
            }
            NodeKind::GetProperty { property_name } => Some(CompiledValue::EntityProperty {
                source: self.trace_entity_source(
                    graph,
                    node_id,
                    &self.config.entity_port,
                    EntitySource::Caster,
                ),
                property_name: property_name.clone(),
            }),
            NodeKind::Math(op) => Some(CompiledValue::Math {
                op: *op,
                lhs: Box::new(self.compile_operand(graph, node_id, OPERAND_A)),
                rhs: Box::new(self.compile_operand(graph, node_id, OPERAND_B)),
            }),
            NodeKind::Processor { processor_name } => {
                Some(self.compile_processor(graph, node_id, processor_name))
            }
            _ => None,
        }
    }

    /// A Processor node binds exactly as many operands as the registered
    /// transform declares, on the transform's declared port names, in
    /// declared order - regardless of which ports the author connected.
    fn compile_processor(
        &self,
        graph: &SkillGraph,
        node_id: NodeId,
        processor_name: &str,
    ) -> CompiledValue {
        let Some(descriptor) = self.transforms.descriptor(processor_name) else {
            tracing::warn!(
                transform = processor_name,
                "transform not registered, compiling to 0"
            );
            return CompiledValue::Constant(0.0);
        };

        let inputs = (0..descriptor.arity)
            .map(|i| self.compile_operand(graph, node_id, &descriptor.input_port_name(i)))
            .collect();

        CompiledValue::Processor {
            processor_name: processor_name.to_string(),
            inputs,
        }
    }

    /// A Branch node's condition, defaulting to always-true when the
    /// condition port is unconnected (branch unconditionally taken).
    fn compile_branch_condition(&self, graph: &SkillGraph, node_id: NodeId) -> CompiledCondition {
        match graph.edge_into(node_id, &self.config.condition_port) {
            Some(edge) => self.compile_condition_source(graph, edge.from_node),
            None => CompiledCondition::AlwaysTrue,
        }
    }

    fn compile_condition_operand(
        &self,
        graph: &SkillGraph,
        node_id: NodeId,
        port: &str,
    ) -> CompiledCondition {
        match graph.edge_into(node_id, port) {
            Some(edge) => self.compile_condition_source(graph, edge.from_node),
            None => CompiledCondition::AlwaysTrue,
        }
    }

    fn compile_condition_source(&self, graph: &SkillGraph, node_id: NodeId) -> CompiledCondition {
        let Some(node) = graph.node(node_id) else {
            return CompiledCondition::AlwaysTrue;
        };

        match &node.kind {
            NodeKind::Logical(LogicalOp::And) => CompiledCondition::And {
                lhs: Box::new(self.compile_condition_operand(graph, node_id, OPERAND_A)),
                rhs: Box::new(self.compile_condition_operand(graph, node_id, OPERAND_B)),
            },
            NodeKind::Logical(LogicalOp::Or) => CompiledCondition::Or {
                lhs: Box::new(self.compile_condition_operand(graph, node_id, OPERAND_A)),
                rhs: Box::new(self.compile_condition_operand(graph, node_id, OPERAND_B)),
            },
            NodeKind::Logical(LogicalOp::Not) => CompiledCondition::Not {
                inner: Box::new(self.compile_condition_operand(graph, node_id, OPERAND_A)),
            },
            NodeKind::Comparison(op) => CompiledCondition::Compare {
                op: *op,
                lhs: Box::new(self.compile_operand(graph, node_id, OPERAND_A)),
                rhs: Box::new(self.compile_operand(graph, node_id, OPERAND_B)),
            },
            _ => CompiledCondition::AlwaysTrue,
        }
    }
}

/// Compile every pipeline slot of a graph
pub fn compile(
    graph: &SkillGraph,
    config: &EditorConfig,
    transforms: &TransformRegistry,
) -> SkillDefinition {
    GraphCompiler::new(config, transforms).compile(graph)
}

/// Recompile a graph and store the result as its cached compiled data
pub fn recompile(graph: &mut SkillGraph, config: &EditorConfig, transforms: &TransformRegistry) {
    graph.compiled = compile(graph, config, transforms);
}
