//! Animation-graph authoring model.
//!
//! Mirrors the structure the source engine exposes for an animation
//! graph asset: layers of state machines, states carrying motions, and
//! motions that are either leaf clip references or recursively nested
//! blend trees. Transition destinations are name references only; this
//! crate never resolves or validates them (duplicate state names are
//! legal in the source model and stay legal here).

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crossport_core::{AssetKey, Vec3};

/// One authored animation graph asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationGraph {
    /// Authored asset name
    pub name: String,
    /// Identity key in the source asset database
    pub key: AssetKey,
    /// Source-relative path of the asset, if it lives on disk
    #[serde(default)]
    pub source_path: Option<String>,
    /// Last modification time of the source asset
    #[serde(default = "SystemTime::now")]
    pub last_modified: SystemTime,
    /// Layers in authored order
    #[serde(default)]
    pub layers: Vec<AnimLayer>,
}

/// One independently blended channel of a graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimLayer {
    pub name: String,
    pub state_machine: StateMachine,
}

/// States, transitions and a default state for one layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateMachine {
    /// Authored name of the default state, if one is set
    #[serde(default)]
    pub default_state: Option<String>,
    /// Transitions evaluated against every state, in authored order
    #[serde(default)]
    pub any_state_transitions: Vec<Transition>,
    /// States in authored order
    #[serde(default)]
    pub states: Vec<AnimState>,
}

/// One state of a state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimState {
    pub name: String,
    /// Motion played while the state is active; absent when the state
    /// has not been fully authored yet
    #[serde(default)]
    pub motion: Option<Motion>,
    /// Outgoing transitions in authored order
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// One state-to-state edge.
///
/// `destination_state` is a name reference resolved by the consuming
/// engine at load time, not an ownership edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    pub destination_state: String,
    /// Blend duration in seconds, non-negative
    #[serde(default)]
    pub duration: f32,
    /// Conditions in authored order; evaluation order is significant
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// A single predicate guarding a transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub mode: ConditionMode,
    /// Parameter name, meaningful only in the consumer's parameter table
    pub parameter: String,
}

/// Comparison mode of a transition condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionMode {
    /// Trigger-style: parameter is set
    If,
    /// Trigger-style: parameter is not set
    IfNot,
    Greater,
    Less,
    Equals,
    NotEqual,
}

/// A motion authored on a state or a blend-tree child.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Motion {
    /// Reference to an external leaf animation clip asset
    Clip(ClipRef),
    /// Recursive weighted mixer of child motions
    BlendTree(BlendTree),
}

impl Motion {
    /// Nesting depth of this motion: 1 for a clip, 1 + max child depth
    /// for a blend tree.
    pub fn depth(&self) -> usize {
        match self {
            Motion::Clip(_) => 1,
            Motion::BlendTree(tree) => {
                1 + tree
                    .children
                    .iter()
                    .filter_map(|child| child.motion.as_ref())
                    .map(Motion::depth)
                    .max()
                    .unwrap_or(0)
            }
        }
    }
}

/// Reference to a leaf animation clip asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipRef {
    pub name: String,
    /// Identity key in the source asset database
    pub key: AssetKey,
    /// Source-relative path of the clip asset
    #[serde(default)]
    pub source_path: Option<String>,
}

/// Blend algorithm of a blend tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendTreeType {
    Simple1d,
    SimpleDirectional2d,
    FreeformDirectional2d,
    FreeformCartesian2d,
    Direct,
}

impl Default for BlendTreeType {
    fn default() -> Self {
        BlendTreeType::Simple1d
    }
}

/// A blend node mixing child motions by parameter value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendTree {
    pub name: String,
    /// Primary blend parameter name
    pub blend_parameter: String,
    /// Secondary blend parameter for 2D blend types
    #[serde(default)]
    pub blend_parameter_y: Option<String>,
    #[serde(default)]
    pub blend_type: BlendTreeType,
    #[serde(default)]
    pub min_threshold: f32,
    #[serde(default)]
    pub max_threshold: f32,
    #[serde(default)]
    pub use_automatic_thresholds: bool,
    /// Descriptive playback statistics computed by the source engine
    #[serde(default)]
    pub apparent_speed: f32,
    #[serde(default)]
    pub average_angular_speed: f32,
    #[serde(default)]
    pub average_duration: f32,
    #[serde(default)]
    pub average_speed: Vec3,
    #[serde(default)]
    pub is_human_motion: bool,
    #[serde(default)]
    pub is_looping: bool,
    #[serde(default)]
    pub legacy: bool,
    /// Child motions in authored order
    #[serde(default)]
    pub children: Vec<ChildMotion>,
}

/// One slot of a blend tree.
///
/// Ownership is strictly tree shaped: a child motion belongs to exactly
/// one parent blend tree and never refers back up the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildMotion {
    #[serde(default)]
    pub cycle_offset: f32,
    #[serde(default)]
    pub motion: Option<Motion>,
}
