/// Frames per second of audio; every frame covers 10 ms.
pub const FRAMES_PER_SECOND: u32 = 100;

/// Sample rate of the linear diagnostic output, fixed by the engine's
/// internal diagnostic path regardless of the working rate.
pub const LINEAR_SAMPLE_RATE: u32 = 16_000;

/// Samples in one linear diagnostic chunk (10 ms at [`LINEAR_SAMPLE_RATE`]).
pub const LINEAR_FRAME_SAMPLES: usize = (LINEAR_SAMPLE_RATE / FRAMES_PER_SECOND) as usize;

/// Configuration handed to the echo-cancellation engine at creation.
///
/// This is the only configuration surface the engine exposes; there are no
/// runtime-tunable filter parameters at this boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Working sample rate in Hz, taken from the recording stream.
    pub sample_rate: u32,

    /// Number of interleaved channels, taken from the recording stream.
    pub num_channels: u16,

    /// Whether the engine also produces the linear diagnostic output.
    pub export_linear: bool,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.sample_rate % FRAMES_PER_SECOND != 0 {
            return Err(format!(
                "sample rate {} Hz does not divide into 10 ms frames",
                self.sample_rate
            ));
        }
        if ![1, 2].contains(&self.num_channels) {
            return Err(format!("unsupported channel count: {}", self.num_channels));
        }
        Ok(())
    }

    /// Samples in one 10 ms frame at the working rate.
    pub fn samples_per_frame(&self) -> usize {
        (self.sample_rate / FRAMES_PER_SECOND) as usize
    }
}
