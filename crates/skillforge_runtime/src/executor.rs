// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flat-instruction pipeline interpreter.
//!
//! Executes one compiled pipeline with a single forward instruction
//! pointer. Branches never jump backward, so execution is a terminating
//! O(n) scan with skips; no loop detection is needed at run time.

use skillforge_model::{
    CompiledAction, CompiledCondition, CompiledPipeline, CompiledValue, SkillGraph,
};
use skillforge_registry::{RegistryTables, SkillContext};

/// Expression trees are acyclic by construction; the guard only catches
/// hand-edited compiled data.
const MAX_EXPR_DEPTH: usize = 64;

/// Execute a compiled pipeline against a context.
///
/// An empty pipeline is a warned no-op. A missing effect name skips that
/// one instruction and continues; nothing aborts the whole call.
pub fn execute<E: Clone + 'static>(
    pipeline: &CompiledPipeline,
    context: &SkillContext<E>,
    tables: &RegistryTables<E>,
) {
    if pipeline.is_empty() {
        tracing::warn!("pipeline is empty, nothing to execute");
        return;
    }

    let mut index = 0;
    while index < pipeline.actions.len() {
        match &pipeline.actions[index] {
            CompiledAction::Effect {
                effect_name,
                value,
                caster_source,
                target_source,
            } => {
                match tables.effects.get(effect_name) {
                    Some(behaviour) => {
                        let scoped = context.scoped(*caster_source, *target_source);
                        let amount = evaluate_value(value, context, tables, 0) as i32;
                        behaviour.execute(&scoped, amount);
                    }
                    None => {
                        tracing::warn!(effect = %effect_name, "effect not registered, skipping");
                    }
                }
                index += 1;
            }
            CompiledAction::Branch {
                condition,
                jump_if_false,
                ..
            } => {
                if evaluate_condition(condition, context, tables, 0) {
                    index += 1;
                } else {
                    index = *jump_if_false;
                }
            }
        }
    }
}

/// Execute one compiled pipeline slot of a graph.
///
/// An absent or never-compiled slot is a warned no-op.
pub fn execute_slot<E: Clone + 'static>(
    graph: &SkillGraph,
    slot: usize,
    context: &SkillContext<E>,
    tables: &RegistryTables<E>,
) {
    match graph.pipeline(slot) {
        Some(pipeline) => execute(pipeline, context, tables),
        None => tracing::warn!(slot, "no compiled pipeline for slot"),
    }
}

fn evaluate_value<E: Clone + 'static>(
    value: &CompiledValue,
    context: &SkillContext<E>,
    tables: &RegistryTables<E>,
    depth: usize,
) -> f32 {
    if depth >= MAX_EXPR_DEPTH {
        tracing::warn!("value expression exceeded depth limit, evaluating to 0");
        return 0.0;
    }

    match value {
        CompiledValue::Constant(v) => *v,
        CompiledValue::EntityProperty {
            source,
            property_name,
        } => tables.properties.read(property_name, context.entity(*source)),
        CompiledValue::Math { op, lhs, rhs } => op.apply(
            evaluate_value(lhs, context, tables, depth + 1),
            evaluate_value(rhs, context, tables, depth + 1),
        ),
        CompiledValue::Processor {
            processor_name,
            inputs,
        } => match tables.transforms.get(processor_name) {
            Some(transform) => {
                let evaluated: Vec<f32> = inputs
                    .iter()
                    .map(|input| evaluate_value(input, context, tables, depth + 1))
                    .collect();
                transform.apply(&evaluated)
            }
            None => {
                tracing::warn!(transform = %processor_name, "transform not registered, evaluating to 0");
                0.0
            }
        },
    }
}

fn evaluate_condition<E: Clone + 'static>(
    condition: &CompiledCondition,
    context: &SkillContext<E>,
    tables: &RegistryTables<E>,
    depth: usize,
) -> bool {
    if depth >= MAX_EXPR_DEPTH {
        tracing::warn!("condition expression exceeded depth limit, evaluating to true");
        return true;
    }

    match condition {
        CompiledCondition::AlwaysTrue => true,
        CompiledCondition::AlwaysFalse => false,
        CompiledCondition::And { lhs, rhs } => {
            evaluate_condition(lhs, context, tables, depth + 1)
                && evaluate_condition(rhs, context, tables, depth + 1)
        }
        CompiledCondition::Or { lhs, rhs } => {
            evaluate_condition(lhs, context, tables, depth + 1)
                || evaluate_condition(rhs, context, tables, depth + 1)
        }
        CompiledCondition::Not { inner } => !evaluate_condition(inner, context, tables, depth + 1),
        CompiledCondition::Compare { op, lhs, rhs } => op.evaluate(
            evaluate_value(lhs, context, tables, depth + 1),
            evaluate_value(rhs, context, tables, depth + 1),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use skillforge_model::{
        CompareOp, CompiledAction, EditorConfig, EntitySource, MathOp, Node, NodeKind,
    };
    use skillforge_registry::{
        standard_transforms, EffectBehaviour, EffectDescriptor, PropertyAccessor,
        PropertyDescriptor, RegistryBootstrap, RegistryBundle,
    };

    /// Test entity: a named unit with shared mutable hit points
    #[derive(Clone)]
    struct Unit {
        name: &'static str,
        hp: Arc<Mutex<f32>>,
    }

    impl Unit {
        fn new(name: &'static str, hp: f32) -> Self {
            Self {
                name,
                hp: Arc::new(Mutex::new(hp)),
            }
        }
    }

    /// Records (effect, target name, value) triples for assertions
    type InvocationLog = Arc<Mutex<Vec<(String, String, i32)>>>;

    struct Recording {
        name: &'static str,
        log: InvocationLog,
    }

    impl EffectBehaviour<Unit> for Recording {
        fn descriptor(&self) -> EffectDescriptor {
            EffectDescriptor::new(self.name, "")
        }

        fn execute(&self, context: &SkillContext<Unit>, value: i32) {
            self.log
                .lock()
                .push((self.name.to_string(), context.target.name.to_string(), value));
        }
    }

    struct HpAccessor;

    impl PropertyAccessor<Unit> for HpAccessor {
        fn descriptor(&self) -> PropertyDescriptor {
            PropertyDescriptor::new("HP", "Status")
        }

        fn read(&self, entity: &Unit) -> f32 {
            *entity.hp.lock()
        }

        fn write(&self, entity: &Unit, value: f32) {
            *entity.hp.lock() = value;
        }
    }

    fn tables_with_effects(log: &InvocationLog, names: &[&'static str]) -> RegistryTables<Unit> {
        let bundle: RegistryBundle<Unit> = RegistryBundle::new(RegistryBootstrap {
            transforms: standard_transforms(),
            ..RegistryBootstrap::default()
        });
        for &name in names {
            bundle.register_effect(Arc::new(Recording {
                name,
                log: Arc::clone(log),
            }));
        }
        bundle.register_property(Arc::new(HpAccessor));
        (*bundle.tables()).clone()
    }

    fn effect_action(name: &str, value: f32) -> CompiledAction {
        CompiledAction::Effect {
            effect_name: name.to_string(),
            value: CompiledValue::Constant(value),
            caster_source: EntitySource::Caster,
            target_source: EntitySource::Target,
        }
    }

    fn branch_action(condition: CompiledCondition, jump_if_false: usize) -> CompiledAction {
        CompiledAction::Branch {
            condition,
            caster_source: EntitySource::Caster,
            target_source: EntitySource::Target,
            jump_if_false,
        }
    }

    fn context() -> SkillContext<Unit> {
        SkillContext::new(Unit::new("caster", 100.0), Unit::new("target", 40.0))
    }

    #[test]
    fn test_false_branch_skips_continuation() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["E1", "E2", "E3"]);

        let pipeline = CompiledPipeline {
            actions: vec![
                branch_action(CompiledCondition::AlwaysFalse, 3),
                effect_action("E1", 1.0),
                effect_action("E2", 2.0),
                effect_action("E3", 3.0),
            ],
        };

        execute(&pipeline, &context(), &tables);
        let invoked: Vec<String> = log.lock().iter().map(|(n, _, _)| n.clone()).collect();
        assert_eq!(invoked, vec!["E3"]);
    }

    #[test]
    fn test_true_branch_falls_through() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["E1", "E2", "E3"]);

        let pipeline = CompiledPipeline {
            actions: vec![
                branch_action(CompiledCondition::AlwaysTrue, 3),
                effect_action("E1", 1.0),
                effect_action("E2", 2.0),
                effect_action("E3", 3.0),
            ],
        };

        execute(&pipeline, &context(), &tables);
        assert_eq!(log.lock().len(), 4);
    }

    #[test]
    fn test_unknown_effect_does_not_stop_pipeline() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["Known"]);

        let pipeline = CompiledPipeline {
            actions: vec![effect_action("Unknown", 1.0), effect_action("Known", 2.0)],
        };

        execute(&pipeline, &context(), &tables);
        let invoked = log.lock();
        assert_eq!(invoked.len(), 1);
        assert_eq!(invoked[0].0, "Known");
    }

    #[test]
    fn test_empty_pipeline_is_noop() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &[]);
        execute(&CompiledPipeline::default(), &context(), &tables);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_entity_sources_scope_the_context() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["Buff"]);

        // Both sources point at the caster: a self-buff.
        let pipeline = CompiledPipeline {
            actions: vec![CompiledAction::Effect {
                effect_name: "Buff".to_string(),
                value: CompiledValue::Constant(5.0),
                caster_source: EntitySource::Caster,
                target_source: EntitySource::Caster,
            }],
        };

        execute(&pipeline, &context(), &tables);
        assert_eq!(log.lock()[0].1, "caster");
    }

    #[test]
    fn test_value_truncates_to_int() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["Damage"]);

        let pipeline = CompiledPipeline {
            actions: vec![effect_action("Damage", 9.9)],
        };

        execute(&pipeline, &context(), &tables);
        assert_eq!(log.lock()[0].2, 9);
    }

    #[test]
    fn test_property_and_math_evaluation() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["Damage"]);

        // target HP (40) / 2 = 20
        let pipeline = CompiledPipeline {
            actions: vec![CompiledAction::Effect {
                effect_name: "Damage".to_string(),
                value: CompiledValue::Math {
                    op: MathOp::Divide,
                    lhs: Box::new(CompiledValue::EntityProperty {
                        source: EntitySource::Target,
                        property_name: "HP".to_string(),
                    }),
                    rhs: Box::new(CompiledValue::Constant(2.0)),
                },
                caster_source: EntitySource::Caster,
                target_source: EntitySource::Target,
            }],
        };

        execute(&pipeline, &context(), &tables);
        assert_eq!(log.lock()[0].2, 20);
    }

    #[test]
    fn test_divide_by_zero_evaluates_to_zero() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["Damage"]);

        let pipeline = CompiledPipeline {
            actions: vec![CompiledAction::Effect {
                effect_name: "Damage".to_string(),
                value: CompiledValue::Math {
                    op: MathOp::Divide,
                    lhs: Box::new(CompiledValue::Constant(5.0)),
                    rhs: Box::new(CompiledValue::Constant(0.0)),
                },
                caster_source: EntitySource::Caster,
                target_source: EntitySource::Target,
            }],
        };

        execute(&pipeline, &context(), &tables);
        assert_eq!(log.lock()[0].2, 0);
    }

    #[test]
    fn test_epsilon_equal_compare_gates_branch() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["E1"]);

        let pipeline = CompiledPipeline {
            actions: vec![
                branch_action(
                    CompiledCondition::Compare {
                        op: CompareOp::Equal,
                        lhs: Box::new(CompiledValue::Constant(1.000_000_1)),
                        rhs: Box::new(CompiledValue::Constant(1.0)),
                    },
                    2,
                ),
                effect_action("E1", 1.0),
            ],
        };

        execute(&pipeline, &context(), &tables);
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_missing_property_and_transform_evaluate_to_zero() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["Damage"]);

        let pipeline = CompiledPipeline {
            actions: vec![CompiledAction::Effect {
                effect_name: "Damage".to_string(),
                value: CompiledValue::Math {
                    op: MathOp::Add,
                    lhs: Box::new(CompiledValue::EntityProperty {
                        source: EntitySource::Caster,
                        property_name: "Mana".to_string(),
                    }),
                    rhs: Box::new(CompiledValue::Processor {
                        processor_name: "Missing".to_string(),
                        inputs: vec![CompiledValue::Constant(3.0)],
                    }),
                },
                caster_source: EntitySource::Caster,
                target_source: EntitySource::Target,
            }],
        };

        execute(&pipeline, &context(), &tables);
        assert_eq!(log.lock()[0].2, 0);
    }

    #[test]
    fn test_transform_invocation() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["Damage"]);

        // Clamp(HP(40) * 2, 0, 50) = 50
        let pipeline = CompiledPipeline {
            actions: vec![CompiledAction::Effect {
                effect_name: "Damage".to_string(),
                value: CompiledValue::Processor {
                    processor_name: "Clamp".to_string(),
                    inputs: vec![
                        CompiledValue::Math {
                            op: MathOp::Multiply,
                            lhs: Box::new(CompiledValue::EntityProperty {
                                source: EntitySource::Target,
                                property_name: "HP".to_string(),
                            }),
                            rhs: Box::new(CompiledValue::Constant(2.0)),
                        },
                        CompiledValue::Constant(0.0),
                        CompiledValue::Constant(50.0),
                    ],
                },
                caster_source: EntitySource::Caster,
                target_source: EntitySource::Target,
            }],
        };

        execute(&pipeline, &context(), &tables);
        assert_eq!(log.lock()[0].2, 50);
    }

    #[test]
    fn test_logical_conditions_short_circuit() {
        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["E1"]);

        let condition = CompiledCondition::Or {
            lhs: Box::new(CompiledCondition::AlwaysTrue),
            // Right side references a missing transform; Or must not
            // need it.
            rhs: Box::new(CompiledCondition::Compare {
                op: CompareOp::Greater,
                lhs: Box::new(CompiledValue::Processor {
                    processor_name: "Missing".to_string(),
                    inputs: vec![],
                }),
                rhs: Box::new(CompiledValue::Constant(0.0)),
            }),
        };

        let pipeline = CompiledPipeline {
            actions: vec![branch_action(condition, 2), effect_action("E1", 1.0)],
        };

        execute(&pipeline, &context(), &tables);
        assert_eq!(log.lock().len(), 1);

        let negated = CompiledCondition::Not {
            inner: Box::new(CompiledCondition::And {
                lhs: Box::new(CompiledCondition::AlwaysTrue),
                rhs: Box::new(CompiledCondition::AlwaysFalse),
            }),
        };
        let pipeline = CompiledPipeline {
            actions: vec![branch_action(negated, 2), effect_action("E1", 1.0)],
        };
        execute(&pipeline, &context(), &tables);
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn test_compile_then_execute_end_to_end() {
        use crate::compiler::recompile;
        use skillforge_model::SkillGraph;

        // Branch on target HP < 50, then deal 25% of target HP as damage.
        let mut graph = SkillGraph::new("Execute");
        let info = graph.add_node(Node::new(NodeKind::Info));
        let ctx_node = graph.add_node(Node::new(NodeKind::Context));
        let branch = graph.add_node(Node::new(NodeKind::Branch));
        let eff = graph.add_node(Node::new(NodeKind::Effect {
            effect_name: "Damage".to_string(),
            value: 0,
        }));
        let cmp = graph.add_node(Node::new(NodeKind::Comparison(CompareOp::Less)));
        let prop = graph.add_node(Node::new(NodeKind::GetProperty {
            property_name: "HP".to_string(),
        }));
        let threshold = graph.add_node(Node::new(NodeKind::Constant { value: 50.0 }));
        let proc = graph.add_node(Node::new(NodeKind::Processor {
            processor_name: "Percent".to_string(),
        }));
        let percent = graph.add_node(Node::new(NodeKind::Constant { value: 25.0 }));

        graph.connect(info, "Slot 1", ctx_node, "Pipeline").unwrap();
        graph.connect(ctx_node, "Self", branch, "Self").unwrap();
        graph.connect(cmp, "Result", branch, "Condition").unwrap();
        graph.connect(prop, "Value", cmp, "A").unwrap();
        graph.connect(threshold, "Value", cmp, "B").unwrap();
        graph.connect(ctx_node, "Target", prop, "Entity").unwrap();
        graph.connect(branch, "Self", eff, "Self").unwrap();
        graph.connect(proc, "Result", eff, "Value").unwrap();
        graph.connect(prop, "Value", proc, "Value").unwrap();
        graph.connect(percent, "Value", proc, "Percent").unwrap();

        let log: InvocationLog = Arc::default();
        let tables = tables_with_effects(&log, &["Damage"]);
        recompile(&mut graph, &EditorConfig::default(), &tables.transforms);

        // Target at 40 HP: branch taken, damage = 40 * 25% = 10.
        execute_slot(&graph, 0, &context(), &tables);
        {
            let invoked = log.lock();
            assert_eq!(invoked.len(), 1);
            assert_eq!(invoked[0], ("Damage".to_string(), "target".to_string(), 10));
        }

        // Target at 80 HP: branch skips the effect.
        let healthy = SkillContext::new(Unit::new("caster", 100.0), Unit::new("target", 80.0));
        execute_slot(&graph, 0, &healthy, &tables);
        assert_eq!(log.lock().len(), 1);
    }
}
