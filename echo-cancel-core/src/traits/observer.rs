use std::path::Path;

use crate::models::state::PipelineState;
use crate::wav::format::WavHeader;

/// Event observer for pipeline runs.
///
/// Purely observational: implementations must not affect control flow, and
/// a run never fails because of its observer. All methods are called from
/// the single pipeline control flow.
pub trait PipelineObserver {
    /// Called once per input stream after its header was read.
    fn on_stream_info(&self, path: &Path, header: &WavHeader);

    /// Called on every pipeline state transition.
    fn on_state_changed(&self, state: &PipelineState);

    /// Called once per frame before it is processed; `current` is 1-based.
    fn on_progress(&self, current: u64, total: u64);
}
