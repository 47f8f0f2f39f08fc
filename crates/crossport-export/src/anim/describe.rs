//! Serializable state-machine descriptions.
//!
//! These are the engine-neutral documents the animation-graph
//! transpiler emits: one root document per graph plus one state-machine
//! document per layer. Field names follow the consuming engine's
//! camelCase convention.

use serde::Serialize;

use crossport_core::Vec3;
use crossport_model::{BlendTreeType, ConditionMode};

/// Root document: `<decoratedGraphPath>.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDoc {
    pub name: String,
    pub layers: Vec<LayerDoc>,
}

/// One layer entry of the root document; holds only the output
/// identifier of the layer's state-machine document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDoc {
    pub state_machine: String,
}

/// Per-layer document: `<decoratedGraphPath>.SM<layerIndex>.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMachineDoc {
    pub default_state: Option<String>,
    pub any_state_transitions: Vec<TransitionDoc>,
    pub states: Vec<StateDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDoc {
    pub name: String,
    pub transitions: Vec<TransitionDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDoc {
    pub destination_state: String,
    pub duration: f32,
    pub conditions: Vec<ConditionDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDoc {
    pub mode: ConditionMode,
    pub parameter: String,
}

/// Transpiled motion.
///
/// Built during traversal for every authored motion; state documents do
/// not retain it (the consumer drives playback from transitions and
/// parameters alone), but building it is what schedules the leaf clips
/// a motion tree references.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MotionDoc {
    #[serde(rename_all = "camelCase")]
    Clip { animation_clip: String },
    BlendTree(BlendTreeDoc),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendTreeDoc {
    pub name: String,
    pub blend_parameter: String,
    pub blend_parameter_y: Option<String>,
    pub blend_type: BlendTreeType,
    pub min_threshold: f32,
    pub max_threshold: f32,
    pub use_automatic_thresholds: bool,
    pub apparent_speed: f32,
    pub average_angular_speed: f32,
    pub average_duration: f32,
    pub average_speed: Vec3,
    pub is_human_motion: bool,
    pub is_looping: bool,
    pub legacy: bool,
    pub children: Vec<ChildMotionDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildMotionDoc {
    pub cycle_offset: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion: Option<MotionDoc>,
}

impl MotionDoc {
    /// Nesting depth of the transpiled motion tree.
    pub fn depth(&self) -> usize {
        match self {
            MotionDoc::Clip { .. } => 1,
            MotionDoc::BlendTree(tree) => {
                1 + tree
                    .children
                    .iter()
                    .filter_map(|child| child.motion.as_ref())
                    .map(MotionDoc::depth)
                    .max()
                    .unwrap_or(0)
            }
        }
    }
}
