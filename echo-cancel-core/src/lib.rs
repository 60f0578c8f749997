//! # echo-cancel-core
//!
//! Frame-synchronized echo-cancellation pipeline.
//!
//! Feeds two synchronized WAV streams — a loudspeaker reference and a
//! microphone recording containing its echo — through an echo-cancellation
//! engine in 10 ms frames and writes the cancelled output plus a fixed-rate
//! linear diagnostic output. The engine is an opaque capability behind the
//! `EchoCanceller` trait; one production implementation ships in `engine`.
//!
//! ## Architecture
//!
//! ```text
//! echo-cancel-core (this crate)
//! ├── traits/       ← EchoCanceller, CancellerFactory, PipelineObserver
//! ├── models/       ← HarnessError, EngineFault, EngineConfig, PipelineState, RunReport
//! ├── wav/          ← RIFF header generate/parse, WavReader, WavWriter
//! ├── engine/       ← NlmsCanceller (production implementation)
//! ├── pipeline/     ← FramePipeline (orchestrator)
//! ├── storage/      ← JSON run-summary sidecar
//! └── simd          ← no-op acceleration stubs (feature-gated)
//! ```

pub mod engine;
pub mod models;
pub mod pipeline;
pub mod simd;
pub mod storage;
pub mod traits;
pub mod wav;

// Re-export key types at crate root for convenience.
pub use engine::nlms::{NlmsCanceller, NlmsFactory};
pub use models::config::{EngineConfig, FRAMES_PER_SECOND, LINEAR_FRAME_SAMPLES, LINEAR_SAMPLE_RATE};
pub use models::error::{EngineFault, HarnessError};
pub use models::report::{FrameFault, RunReport};
pub use models::state::PipelineState;
pub use pipeline::{FramePipeline, LINEAR_FILE_NAME};
pub use storage::summary::{read_summary, write_summary, RunSummary};
pub use traits::canceller::{CancellerFactory, EchoCanceller};
pub use traits::observer::PipelineObserver;
pub use wav::format::WavHeader;
pub use wav::reader::WavReader;
pub use wav::writer::WavWriter;
