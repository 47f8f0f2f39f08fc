//! Animation-graph transpiler.
//!
//! Converts one authored [`AnimationGraph`] into its engine-neutral
//! description documents: a root document naming one state-machine
//! document per layer, plus the per-layer documents themselves. The
//! traversal is a single synchronous depth-first pass; leaf clips
//! encountered anywhere in a motion tree are scheduled for independent
//! export through the [`ExportHost`] as a side effect.

use std::io::Write;
use std::time::SystemTime;

use serde::Serialize;
use tracing::{debug, info, warn};

use crossport_core::{AssetKey, Error, Result};
use crossport_model::{
    AnimState, AnimationGraph, Condition, Motion, StateMachine, Transition,
};

use crate::anim::describe::{
    BlendTreeDoc, ChildMotionDoc, ConditionDoc, GraphDoc, LayerDoc, MotionDoc, StateDoc,
    StateMachineDoc, TransitionDoc,
};
use crate::host::{ExportContext, ExportHost};
use crate::naming;

/// Transpiles animation graphs against an [`ExportHost`].
pub struct AnimGraphExporter<'a, H: ExportHost + ?Sized> {
    host: &'a H,
}

impl<'a, H: ExportHost + ?Sized> AnimGraphExporter<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self { host }
    }

    /// Output identifier of the graph's root document, or `None` when
    /// the graph has no source location and cannot be exported.
    pub fn evaluate_graph_name(&self, graph: &AnimationGraph) -> Option<String> {
        self.host
            .evaluate_output_name(graph.source_path.as_deref(), ".json")
    }

    /// Export one graph: the root document plus one state-machine
    /// document per layer, each independently gated by staleness.
    ///
    /// A write failure on one document never prevents sibling documents
    /// from being attempted; all failures are reported together.
    pub fn export(&self, graph: &AnimationGraph) -> Result<()> {
        let Some(graph_name) = self.evaluate_graph_name(graph) else {
            warn!(graph = %graph.name, "Graph has no source location, not exportable");
            return Err(Error::NotExportable {
                name: graph.name.clone(),
            });
        };
        info!(graph = %graph.name, output = %graph_name, layers = graph.layers.len(), "Exporting animation graph");

        let context = ExportContext {
            source_key: graph.key,
            last_modified: graph.last_modified,
        };

        let graph_doc = GraphDoc {
            name: self.host.decorate_name(&graph.name),
            layers: (0..graph.layers.len())
                .map(|index| LayerDoc {
                    state_machine: naming::replace_extension(
                        &graph_name,
                        &format!(".SM{}.json", index),
                    ),
                })
                .collect(),
        };

        let mut failures = Vec::new();
        if let Err(e) =
            self.write_document(&graph_name, &graph_doc, graph.key, graph.last_modified)
        {
            failures.push(e);
        }

        for (layer, layer_doc) in graph.layers.iter().zip(&graph_doc.layers) {
            let machine_doc = self.transpile_state_machine(&layer.state_machine, &context);
            if let Err(e) = self.write_document(
                &layer_doc.state_machine,
                &machine_doc,
                graph.key,
                graph.last_modified,
            ) {
                failures.push(e);
            }
        }

        Error::from_failures(failures)
    }

    /// Transpile one layer's state machine.
    pub fn transpile_state_machine(
        &self,
        machine: &StateMachine,
        context: &ExportContext,
    ) -> StateMachineDoc {
        StateMachineDoc {
            default_state: machine
                .default_state
                .as_deref()
                .map(|name| self.host.decorate_name(name)),
            any_state_transitions: machine
                .any_state_transitions
                .iter()
                .map(|t| self.transpile_transition(t))
                .collect(),
            states: machine
                .states
                .iter()
                .map(|s| self.transpile_state(s, context))
                .collect(),
        }
    }

    /// Transpile one state.
    ///
    /// The state's motion is transpiled purely for its side effect of
    /// scheduling leaf-clip exports; the motion description is not part
    /// of the state document.
    pub fn transpile_state(&self, state: &AnimState, context: &ExportContext) -> StateDoc {
        let _ = self.transpile_motion(state.motion.as_ref(), context);
        StateDoc {
            name: self.host.decorate_name(&state.name),
            transitions: state
                .transitions
                .iter()
                .map(|t| self.transpile_transition(t))
                .collect(),
        }
    }

    /// Transpile one transition edge, preserving condition order.
    pub fn transpile_transition(&self, transition: &Transition) -> TransitionDoc {
        TransitionDoc {
            destination_state: self.host.decorate_name(&transition.destination_state),
            duration: transition.duration,
            conditions: transition
                .conditions
                .iter()
                .map(|c| self.transpile_condition(c))
                .collect(),
        }
    }

    /// Transpile one condition predicate.
    pub fn transpile_condition(&self, condition: &Condition) -> ConditionDoc {
        ConditionDoc {
            mode: condition.mode,
            parameter: condition.parameter.clone(),
        }
    }

    /// Transpile a motion tree, scheduling every leaf clip it touches.
    ///
    /// Returns `None` for an absent motion and degrades a clip without
    /// a resolvable source to `None` rather than failing the document:
    /// one badly authored node must not sink the whole graph.
    pub fn transpile_motion(
        &self,
        motion: Option<&Motion>,
        context: &ExportContext,
    ) -> Option<MotionDoc> {
        match motion? {
            Motion::Clip(clip) => match self.host.evaluate_clip_name(clip) {
                Some(animation_clip) => {
                    self.host.schedule_clip_export(clip, context);
                    Some(MotionDoc::Clip { animation_clip })
                }
                None => {
                    warn!(clip = %clip.name, "Clip has no source location, omitting motion");
                    None
                }
            },
            Motion::BlendTree(tree) => Some(MotionDoc::BlendTree(BlendTreeDoc {
                name: self.host.decorate_name(&tree.name),
                blend_parameter: tree.blend_parameter.clone(),
                blend_parameter_y: tree.blend_parameter_y.clone(),
                blend_type: tree.blend_type,
                min_threshold: tree.min_threshold,
                max_threshold: tree.max_threshold,
                use_automatic_thresholds: tree.use_automatic_thresholds,
                apparent_speed: tree.apparent_speed,
                average_angular_speed: tree.average_angular_speed,
                average_duration: tree.average_duration,
                average_speed: tree.average_speed,
                is_human_motion: tree.is_human_motion,
                is_looping: tree.is_looping,
                legacy: tree.legacy,
                children: tree
                    .children
                    .iter()
                    .map(|child| ChildMotionDoc {
                        cycle_offset: child.cycle_offset,
                        motion: self.transpile_motion(child.motion.as_ref(), context),
                    })
                    .collect(),
            })),
        }
    }

    fn write_document<T: Serialize>(
        &self,
        output_name: &str,
        document: &T,
        key: AssetKey,
        source_modified: SystemTime,
    ) -> Result<()> {
        let stream = self
            .host
            .try_create(key, output_name, source_modified)
            .map_err(|e| wrap_write_error(output_name, e))?;
        let Some(mut stream) = stream else {
            debug!(output = %output_name, "Skipped up-to-date document");
            return Ok(());
        };

        serde_json::to_writer_pretty(&mut stream, document)
            .map_err(Error::from)
            .and_then(|_| stream.flush().map_err(Error::from))
            .map_err(|e| wrap_write_error(output_name, e))
    }
}

fn wrap_write_error(output_name: &str, source: Error) -> Error {
    Error::DocumentWrite {
        path: output_name.to_string(),
        source: Box::new(source),
    }
}
