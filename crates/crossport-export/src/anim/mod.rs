//! Animation-graph export: description documents and the transpiler.

pub mod describe;
pub mod transpiler;

pub use describe::{GraphDoc, MotionDoc, StateDoc, StateMachineDoc, TransitionDoc};
pub use transpiler::AnimGraphExporter;
