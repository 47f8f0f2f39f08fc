//! Crossport Authoring Model
//!
//! Read-only snapshot of the source engine's authoring-time object
//! model. Every type here is constructed once per export run (either
//! programmatically by an embedding editor, or from a JSON dump via
//! [`load_graph`]) and is immutable afterwards.

pub mod anim;

pub use anim::{
    AnimLayer, AnimState, AnimationGraph, BlendTree, BlendTreeType, ChildMotion, ClipRef,
    Condition, ConditionMode, Motion, StateMachine, Transition,
};

use std::path::Path;

use crossport_core::{Error, Result};

/// Load an authored animation graph from a JSON dump produced by the
/// source engine's editor script.
pub fn load_graph(path: impl AsRef<Path>) -> Result<AnimationGraph> {
    let path = path.as_ref();
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(Error::Io(e)),
    };
    serde_json::from_str(&data).map_err(|e| Error::InvalidModel(e.to_string()))
}
