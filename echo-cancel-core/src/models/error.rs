use thiserror::Error;

use super::config::LINEAR_FRAME_SAMPLES;

/// Errors that abort a pipeline run before or outside the frame loop.
///
/// These are the precondition and I/O failures: the process exits nonzero
/// on any of them. Per-frame engine faults are a separate type
/// ([`EngineFault`]) because they stop the loop without failing the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HarnessError {
    #[error("cannot open {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("invalid stream header in {path}: {reason}")]
    Header { path: String, reason: String },

    #[error("input format mismatch: {0}")]
    FormatMismatch(String),

    #[error("unsupported stream format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to create echo canceller: {0}")]
    EngineInit(String),

    #[error("read failed on {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("write failed on {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("storage error: {0}")]
    Storage(String),
}

/// Nonzero status reported by the engine for a single frame.
///
/// A fault stops the frame loop at the frame boundary; earlier frames'
/// output is retained and cleanup still runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineFault {
    #[error("expected {expected} samples per frame, got {got}")]
    FrameLength { expected: usize, got: usize },

    #[error("linear output buffer holds {got} samples, expected {LINEAR_FRAME_SAMPLES}")]
    LinearLength { got: usize },

    #[error("{0}")]
    Internal(String),
}
