//! Crossport Export Pipeline
//!
//! Converts assets from the source engine's authoring model into the
//! target engine's file formats:
//! - Animation graphs -> engine-neutral state-machine JSON documents
//! - Deterministic output naming from source locations
//! - Staleness-gated document writing (unchanged inputs write nothing)
//! - Scheduling of referenced leaf clips for independent export

pub mod anim;
pub mod host;
pub mod naming;

pub use anim::AnimGraphExporter;
pub use host::{DiskHost, ExportContext, ExportHost, ExportOptions, PendingClip};
