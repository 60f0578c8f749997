use std::path::PathBuf;

use super::config::EngineConfig;
use super::error::EngineFault;

/// A per-frame engine fault together with the 1-based frame it stopped on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFault {
    pub frame: u64,
    pub fault: EngineFault,
}

/// Result of one pipeline run.
///
/// A run that stopped early on an engine fault is still a successful run:
/// the fault is recorded here and earlier frames' output is retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Engine configuration derived from the recording stream.
    pub config: EngineConfig,

    /// Full frames obtainable from the shorter input stream.
    pub total_frames: u64,

    /// Frames actually processed and written to both outputs.
    pub frames_processed: u64,

    pub output_path: PathBuf,
    pub linear_path: PathBuf,

    /// SHA-256 hex digest of the finalized primary output.
    pub output_checksum: String,

    /// SHA-256 hex digest of the finalized diagnostic output.
    pub linear_checksum: String,

    /// Set when the frame loop stopped early on an engine fault.
    pub fault: Option<FrameFault>,
}

impl RunReport {
    /// Whether every frame was processed.
    pub fn completed(&self) -> bool {
        self.fault.is_none()
    }
}
