//! Frame-synchronized streaming pipeline.
//!
//! Orchestrates the external collaborators: validates that the two input
//! streams are format-compatible, slices them into 10 ms frames, drives the
//! engine call across the frame boundary, multiplexes the two
//! differently-rated outputs, and releases every acquired resource on every
//! exit path.

use std::path::Path;

use crate::models::config::{
    EngineConfig, FRAMES_PER_SECOND, LINEAR_FRAME_SAMPLES, LINEAR_SAMPLE_RATE,
};
use crate::models::error::HarnessError;
use crate::models::report::{FrameFault, RunReport};
use crate::models::state::PipelineState;
use crate::traits::canceller::CancellerFactory;
use crate::traits::observer::PipelineObserver;
use crate::wav::format::{self, WavHeader};
use crate::wav::reader::WavReader;
use crate::wav::writer::WavWriter;

/// Name of the diagnostic output, placed next to the primary output.
pub const LINEAR_FILE_NAME: &str = "linear.wav";

/// One-session pipeline runner.
///
/// Owns the engine factory and observer across runs; every `run` opens its
/// own streams, creates one engine instance, and releases all of them before
/// returning.
pub struct FramePipeline {
    factory: Box<dyn CancellerFactory>,
    observer: Option<Box<dyn PipelineObserver>>,
    buffer_delay: i32,
    state: PipelineState,
}

impl FramePipeline {
    pub fn new(factory: Box<dyn CancellerFactory>) -> Self {
        Self {
            factory,
            observer: None,
            buffer_delay: 0,
            state: PipelineState::Unopened,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn PipelineObserver>) {
        self.observer = Some(observer);
    }

    /// Known offset in samples between reference and recording, passed to
    /// every engine call.
    pub fn set_buffer_delay(&mut self, samples: i32) {
        self.buffer_delay = samples;
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Run one session: `ref_path` is the loudspeaker reference, `rec_path`
    /// the microphone recording, `out_path` the cancelled output. The
    /// diagnostic output lands in [`LINEAR_FILE_NAME`] next to `out_path`.
    ///
    /// An engine fault during the loop stops it at the frame boundary and is
    /// reported inside the `Ok` report; `Err` is reserved for precondition
    /// and I/O failures.
    pub fn run(
        &mut self,
        ref_path: &Path,
        rec_path: &Path,
        out_path: &Path,
    ) -> Result<RunReport, HarnessError> {
        let result = self.run_inner(ref_path, rec_path, out_path);
        // Terminal on every exit path: all resources acquired by run_inner
        // are released by the time it returns.
        self.set_state(PipelineState::Released);
        result
    }

    fn run_inner(
        &mut self,
        ref_path: &Path,
        rec_path: &Path,
        out_path: &Path,
    ) -> Result<RunReport, HarnessError> {
        let mut ref_reader = WavReader::open(ref_path)?;
        self.notify_stream(ref_path, *ref_reader.header());
        let mut rec_reader = WavReader::open(rec_path)?;
        self.notify_stream(rec_path, *rec_reader.header());

        let ref_header = *ref_reader.header();
        let rec_header = *rec_reader.header();

        if let Some(difference) = ref_header.mismatch(&rec_header) {
            return Err(HarnessError::FormatMismatch(difference));
        }
        if rec_header.audio_format != format::FORMAT_PCM || rec_header.bits_per_sample != 16 {
            return Err(HarnessError::UnsupportedFormat(format!(
                "only 16-bit PCM input is supported, got format tag {} at {} bits",
                rec_header.audio_format, rec_header.bits_per_sample
            )));
        }
        self.set_state(PipelineState::HeadersValidated);

        let samples_per_frame = (rec_header.sample_rate / FRAMES_PER_SECOND) as usize;
        let bytes_per_frame = samples_per_frame * rec_header.bits_per_sample as usize / 8;
        let total = ref_header.sample_count().min(rec_header.sample_count())
            / samples_per_frame as u64;

        let config = EngineConfig {
            sample_rate: rec_header.sample_rate,
            num_channels: rec_header.channels,
            export_linear: true,
        };
        let mut engine = self
            .factory
            .create(&config)
            .map_err(HarnessError::EngineInit)?;
        self.set_state(PipelineState::EngineReady);
        log::debug!(
            "engine ready: {} frames of {} samples ({} bytes) each",
            total,
            samples_per_frame,
            bytes_per_frame
        );

        let mut out_writer = WavWriter::create(
            out_path,
            rec_header.sample_rate,
            rec_header.bits_per_sample,
            rec_header.channels,
        )?;
        let linear_path = out_path.with_file_name(LINEAR_FILE_NAME);
        let mut linear_writer = WavWriter::create(
            &linear_path,
            LINEAR_SAMPLE_RATE,
            rec_header.bits_per_sample,
            rec_header.channels,
        )?;

        // Reusable frame buffers: one allocation per stream per session.
        let mut ref_frame = vec![0i16; samples_per_frame];
        let mut rec_frame = vec![0i16; samples_per_frame];
        let mut out_frame = vec![0i16; samples_per_frame];
        let mut linear_frame = vec![0i16; LINEAR_FRAME_SAMPLES];

        self.set_state(PipelineState::Streaming { current: 0, total });

        let mut frames_processed = 0u64;
        let mut fault = None;
        for current in 1..=total {
            if let Some(ref observer) = self.observer {
                observer.on_progress(current, total);
            }

            // Short reads are not validated here: the loop bound guarantees
            // enough data under correct headers.
            ref_reader.read_samples(&mut ref_frame)?;
            rec_reader.read_samples(&mut rec_frame)?;

            if let Err(engine_fault) = engine.process_frame(
                &ref_frame,
                &rec_frame,
                &mut out_frame,
                Some(&mut linear_frame),
                self.buffer_delay,
            ) {
                log::error!("echo canceller failed on frame {}: {}", current, engine_fault);
                fault = Some(FrameFault {
                    frame: current,
                    fault: engine_fault,
                });
                break;
            }

            out_writer.write_samples(&out_frame)?;
            linear_writer.write_samples(&linear_frame)?;
            frames_processed = current;
        }

        drop(engine);
        drop(ref_reader);
        drop(rec_reader);
        let output_checksum = out_writer.close()?;
        let linear_checksum = linear_writer.close()?;

        match &fault {
            Some(f) => self.set_state(PipelineState::Aborted { frame: f.frame }),
            None => self.set_state(PipelineState::Completed {
                frames: frames_processed,
            }),
        }

        Ok(RunReport {
            config,
            total_frames: total,
            frames_processed,
            output_path: out_path.to_path_buf(),
            linear_path,
            output_checksum,
            linear_checksum,
            fault,
        })
    }

    fn set_state(&mut self, state: PipelineState) {
        self.state = state;
        if let Some(ref observer) = self.observer {
            observer.on_state_changed(&self.state);
        }
    }

    fn notify_stream(&self, path: &Path, header: WavHeader) {
        if let Some(ref observer) = self.observer {
            observer.on_stream_info(path, &header);
        }
    }
}
