use crate::models::config::EngineConfig;
use crate::models::error::EngineFault;

/// Per-frame interface of an echo-cancellation engine.
///
/// One instance is bound to one pipeline session. The engine owns its
/// adaptive state across calls on the same instance; destruction is `Drop`,
/// exactly once per created engine.
pub trait EchoCanceller {
    /// Process one 10 ms frame.
    ///
    /// - `reference`: loudspeaker signal driving the echo path.
    /// - `capture`: microphone signal containing echo of the reference.
    /// - `output`: receives the cancelled signal, same sample count as the
    ///   inputs.
    /// - `linear`: receives the linear diagnostic chunk when present; must
    ///   hold exactly [`crate::models::config::LINEAR_FRAME_SAMPLES`]
    ///   samples — the engine's fixed internal diagnostic rate, independent
    ///   of the caller's frame size.
    /// - `buffer_delay`: known offset in samples between reference and
    ///   capture, 0 if unknown.
    fn process_frame(
        &mut self,
        reference: &[i16],
        capture: &[i16],
        output: &mut [i16],
        linear: Option<&mut [i16]>,
        buffer_delay: i32,
    ) -> Result<(), EngineFault>;
}

/// Creates engine instances for the pipeline.
///
/// A separate seam from the engine itself so the pipeline can be driven by
/// the production canceller or a test double without code changes.
pub trait CancellerFactory {
    fn create(&self, config: &EngineConfig) -> Result<Box<dyn EchoCanceller>, String>;
}
