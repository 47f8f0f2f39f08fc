//! Export host: the target-engine facade the transpilers run against.
//!
//! [`ExportHost`] gathers the narrow contracts the transpilers need
//! from their surroundings: name decoration, output-name derivation,
//! leaf-clip export scheduling, and the staleness-gated writer.
//! [`DiskHost`] is the file-backed implementation used by the CLI;
//! tests substitute in-memory hosts.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crossport_core::{AssetKey, Error, Result};
use crossport_model::ClipRef;

use crate::naming;

/// Per-run context for one root-asset traversal.
///
/// Carries the identity of the asset whose export triggered the current
/// traversal, so scheduled leaf exports inherit its staleness baseline.
#[derive(Debug, Clone, Copy)]
pub struct ExportContext {
    /// Identity key of the root asset being exported
    pub source_key: AssetKey,
    /// Last modification time of the root asset's source
    pub last_modified: SystemTime,
}

/// Contracts the transpilers require from the embedding application.
pub trait ExportHost {
    /// Apply the target engine's name convention to an authored name.
    fn decorate_name(&self, raw: &str) -> String;

    /// Derive the output identifier for a source location with the
    /// given extension, or `None` when the asset has no source.
    fn evaluate_output_name(&self, source_path: Option<&str>, extension: &str) -> Option<String>;

    /// Derive the output identifier of an exported leaf clip.
    fn evaluate_clip_name(&self, clip: &ClipRef) -> Option<String> {
        self.evaluate_output_name(clip.source_path.as_deref(), naming::CLIP_EXTENSION)
    }

    /// Schedule a leaf clip for independent export. Scheduling the same
    /// clip twice within one run must be a no-op.
    fn schedule_clip_export(&self, clip: &ClipRef, context: &ExportContext);

    /// Open an output document for writing, or return `None` when the
    /// existing output is already up to date relative to
    /// `source_modified` (staleness skip, not an error).
    fn try_create(
        &self,
        key: AssetKey,
        output_name: &str,
        source_modified: SystemTime,
    ) -> Result<Option<Box<dyn Write>>>;
}

/// Options for the disk-backed export host.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory all output identifiers are resolved under
    pub output_root: PathBuf,
    /// Source-engine prefix stripped from source paths (case-insensitive)
    pub source_prefix: String,
    /// Extension used for exported leaf clips
    pub clip_extension: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            source_prefix: "Assets/".to_string(),
            clip_extension: naming::CLIP_EXTENSION.to_string(),
        }
    }
}

/// A leaf clip queued for export by the embedding application.
#[derive(Debug, Clone)]
pub struct PendingClip {
    pub clip: ClipRef,
    pub context: ExportContext,
}

#[derive(Default)]
struct HostState {
    scheduled: HashSet<AssetKey>,
    pending: Vec<PendingClip>,
    claimed: HashMap<String, AssetKey>,
    writes: usize,
}

/// File-backed export host with an incremental staleness gate.
pub struct DiskHost {
    options: ExportOptions,
    state: Mutex<HostState>,
}

impl DiskHost {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            state: Mutex::new(HostState::default()),
        }
    }

    /// Number of documents actually written so far in this run.
    pub fn writes_performed(&self) -> usize {
        self.state.lock().writes
    }

    /// Number of distinct clips scheduled so far in this run.
    pub fn scheduled_count(&self) -> usize {
        self.state.lock().scheduled.len()
    }

    /// Take the queue of clips awaiting export.
    pub fn drain_scheduled(&self) -> Vec<PendingClip> {
        std::mem::take(&mut self.state.lock().pending)
    }

    fn is_up_to_date(&self, dest: &std::path::Path, source_modified: SystemTime) -> bool {
        let Ok(meta) = std::fs::metadata(dest) else {
            return false;
        };
        match meta.modified() {
            Ok(dest_modified) => dest_modified >= source_modified,
            Err(_) => false,
        }
    }
}

impl ExportHost for DiskHost {
    fn decorate_name(&self, raw: &str) -> String {
        naming::safe_file_name(raw)
    }

    fn evaluate_output_name(&self, source_path: Option<&str>, extension: &str) -> Option<String> {
        let normalized = source_path.map(naming::to_asset_separators);
        let relative = normalized
            .as_deref()
            .map(|path| naming::strip_source_prefix(path, &self.options.source_prefix));
        naming::resolve_output_name(relative, extension)
    }

    fn evaluate_clip_name(&self, clip: &ClipRef) -> Option<String> {
        self.evaluate_output_name(clip.source_path.as_deref(), &self.options.clip_extension)
    }

    fn schedule_clip_export(&self, clip: &ClipRef, context: &ExportContext) {
        let mut state = self.state.lock();
        if state.scheduled.insert(clip.key) {
            debug!(clip = %clip.name, key = %clip.key, "Scheduled clip export");
            state.pending.push(PendingClip {
                clip: clip.clone(),
                context: *context,
            });
        } else {
            trace!(clip = %clip.name, key = %clip.key, "Clip already scheduled");
        }
    }

    fn try_create(
        &self,
        key: AssetKey,
        output_name: &str,
        source_modified: SystemTime,
    ) -> Result<Option<Box<dyn Write>>> {
        let mut state = self.state.lock();
        match state.claimed.get(output_name) {
            Some(owner) if *owner == key => {
                debug!(output = %output_name, "Document already written this run");
                return Ok(None);
            }
            Some(owner) => {
                warn!(
                    output = %output_name,
                    first = %owner,
                    second = %key,
                    "Two assets resolve to the same output path; keeping the first"
                );
                return Ok(None);
            }
            None => {}
        }

        let dest = self.options.output_root.join(output_name);
        if self.is_up_to_date(&dest, source_modified) {
            debug!(output = %output_name, "Output is up to date, skipping write");
            state.claimed.insert(output_name.to_string(), key);
            return Ok(None);
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }
        let file = File::create(&dest).map_err(Error::Io)?;
        state.claimed.insert(output_name.to_string(), key);
        state.writes += 1;
        Ok(Some(Box::new(BufWriter::new(file))))
    }
}
