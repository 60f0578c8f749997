/// Pipeline state machine.
///
/// State transitions:
/// ```text
/// unopened → headers-validated → engine-ready → streaming
///                                                   ↓
///                                      completed / aborted → released
/// ```
///
/// `Released` is reachable from every state once any resource was acquired
/// and is the only terminal state; entering it means every stream handle and
/// the engine instance have been released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Unopened,
    HeadersValidated,
    EngineReady,
    Streaming { current: u64, total: u64 },
    Completed { frames: u64 },
    Aborted { frame: u64 },
    Released,
}

impl PipelineState {
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Released)
    }

    /// Returns the frame count if in a state that tracks one.
    pub fn frames(&self) -> Option<u64> {
        match self {
            Self::Streaming { current, .. } => Some(*current),
            Self::Completed { frames } => Some(*frames),
            Self::Aborted { frame } => Some(*frame),
            _ => None,
        }
    }
}
