use crate::models::config::{EngineConfig, LINEAR_FRAME_SAMPLES};
use crate::models::error::EngineFault;
use crate::traits::canceller::{CancellerFactory, EchoCanceller};

/// Length of the modeled echo tail in milliseconds.
const ECHO_TAIL_MS: u32 = 100;

/// NLMS step size.
const STEP_SIZE: f32 = 0.5;

/// Regularization constant against division by zero in the step
/// normalization.
const DELTA: f32 = 1e-6;

/// Floor of the residual suppressor gain.
const MIN_SUPPRESSOR_GAIN: f32 = 0.06;

/// Creates [`NlmsCanceller`] instances; the production engine factory.
pub struct NlmsFactory;

impl CancellerFactory for NlmsFactory {
    fn create(&self, config: &EngineConfig) -> Result<Box<dyn EchoCanceller>, String> {
        Ok(Box::new(NlmsCanceller::new(*config)?))
    }
}

/// Normalized Least Mean Squares echo canceller.
///
/// An adaptive FIR filter driven by the reference history estimates the
/// echo in the capture signal; the estimate is subtracted and the filter
/// taps updated per sample. The primary output additionally runs through a
/// frame-level residual suppressor; the linear (pre-suppressor) error is
/// resampled to the fixed 16 kHz diagnostic chunk.
pub struct NlmsCanceller {
    config: EngineConfig,
    samples_per_frame: usize,
    weights: Vec<f32>,
    /// Ring buffer of recent reference samples, indexed by absolute sample
    /// position modulo its length.
    history: Vec<f32>,
    /// Total reference samples fed so far.
    fed: u64,
    /// Per-frame error scratch, reused across calls.
    err_scratch: Vec<f32>,
}

impl NlmsCanceller {
    pub fn new(config: EngineConfig) -> Result<Self, String> {
        config.validate()?;

        let samples_per_frame = config.samples_per_frame();
        let taps = (config.sample_rate * ECHO_TAIL_MS / 1000) as usize;
        // Room for the echo tail, one frame, and up to half a second of
        // configured buffer delay.
        let history_len = taps + samples_per_frame + (config.sample_rate / 2) as usize;

        log::debug!(
            "nlms canceller: {} taps at {} Hz, {} channel(s)",
            taps,
            config.sample_rate,
            config.num_channels
        );

        Ok(Self {
            config,
            samples_per_frame,
            weights: vec![0.0; taps],
            history: vec![0.0; history_len],
            fed: 0,
            err_scratch: vec![0.0; samples_per_frame],
        })
    }

    /// Reference sample at absolute position `index`, 0.0 outside the
    /// retained window.
    fn reference_at(&self, index: i64) -> f32 {
        if index < 0 || index as u64 >= self.fed {
            return 0.0;
        }
        let oldest = self.fed.saturating_sub(self.history.len() as u64);
        if (index as u64) < oldest {
            return 0.0;
        }
        self.history[index as usize % self.history.len()]
    }
}

impl EchoCanceller for NlmsCanceller {
    fn process_frame(
        &mut self,
        reference: &[i16],
        capture: &[i16],
        output: &mut [i16],
        linear: Option<&mut [i16]>,
        buffer_delay: i32,
    ) -> Result<(), EngineFault> {
        let spf = self.samples_per_frame;
        if reference.len() != spf || capture.len() != spf || output.len() != spf {
            return Err(EngineFault::FrameLength {
                expected: spf,
                got: reference.len().min(capture.len()).min(output.len()),
            });
        }
        if let Some(ref linear) = linear {
            if linear.len() != LINEAR_FRAME_SAMPLES {
                return Err(EngineFault::LinearLength { got: linear.len() });
            }
        }

        // Absolute position of this frame's first sample; reference and
        // capture advance in lockstep.
        let base = self.fed;
        let history_len = self.history.len();
        for (i, &sample) in reference.iter().enumerate() {
            self.history[((base + i as u64) % history_len as u64) as usize] = sample as f32;
        }
        self.fed += spf as u64;

        let taps = self.weights.len();
        let delay = buffer_delay as i64;
        let mut err_energy = 0.0f64;
        let mut est_energy = 0.0f64;

        for i in 0..spf {
            let pos = base as i64 + i as i64 - delay;

            let mut estimate = 0.0f32;
            let mut power = 0.0f32;
            for k in 0..taps {
                let r = self.reference_at(pos - k as i64);
                estimate += self.weights[k] * r;
                power += r * r;
            }

            let err = capture[i] as f32 - estimate;
            let step = STEP_SIZE * err / (power + DELTA);
            for k in 0..taps {
                let r = self.reference_at(pos - k as i64);
                self.weights[k] += step * r;
            }

            self.err_scratch[i] = err;
            err_energy += (err * err) as f64;
            est_energy += (estimate * estimate) as f64;
        }

        let err_rms = (err_energy / spf as f64).sqrt() as f32;
        let est_rms = (est_energy / spf as f64).sqrt() as f32;
        let gain = residual_gain(err_rms, est_rms);
        for i in 0..spf {
            output[i] = clamp_sample(self.err_scratch[i] * gain);
        }

        if let Some(linear) = linear {
            if self.config.export_linear {
                resample_to_fixed(&self.err_scratch, linear);
            } else {
                linear.fill(0);
            }
        }
        Ok(())
    }
}

/// Frame-level residual suppressor gain.
///
/// Attenuates the output when the estimated echo dominates the error
/// (far-end activity with residual echo); passes near-end speech through
/// unchanged.
fn residual_gain(err_rms: f32, est_rms: f32) -> f32 {
    (err_rms / (err_rms + 0.5 * est_rms + 1.0)).clamp(MIN_SUPPRESSOR_GAIN, 1.0)
}

fn clamp_sample(value: f32) -> i16 {
    value.round().clamp(-32768.0, 32767.0) as i16
}

/// Linear-interpolation resample of one frame into a fixed-size chunk.
fn resample_to_fixed(src: &[f32], dst: &mut [i16]) {
    if src.is_empty() {
        dst.fill(0);
        return;
    }
    let ratio = src.len() as f64 / dst.len() as f64;
    for (i, out) in dst.iter_mut().enumerate() {
        let position = i as f64 * ratio;
        let index = position as usize;
        let fraction = (position - index as f64) as f32;
        let a = src[index.min(src.len() - 1)];
        let b = src[(index + 1).min(src.len() - 1)];
        *out = clamp_sample(a * (1.0 - fraction) + b * fraction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(sample_rate: u32) -> EngineConfig {
        EngineConfig {
            sample_rate,
            num_channels: 1,
            export_linear: true,
        }
    }

    fn sine(sample_rate: u32, freq: f32, count: usize, amplitude: f32) -> Vec<i16> {
        (0..count)
            .map(|n| {
                let t = n as f32 / sample_rate as f32;
                (amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()) as i16
            })
            .collect()
    }

    fn rms(samples: &[i16]) -> f64 {
        let energy: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (energy / samples.len() as f64).sqrt()
    }

    #[test]
    fn factory_rejects_invalid_config() {
        assert!(NlmsFactory.create(&config(22050)).is_err());
        assert!(NlmsFactory.create(&config(0)).is_err());
        assert!(NlmsFactory.create(&config(16000)).is_ok());
    }

    #[test]
    fn wrong_frame_length_is_a_fault() {
        let mut engine = NlmsCanceller::new(config(16000)).unwrap();
        let frame = vec![0i16; 100];
        let mut out = vec![0i16; 100];
        let mut linear = vec![0i16; LINEAR_FRAME_SAMPLES];

        let fault = engine
            .process_frame(&frame, &frame, &mut out, Some(&mut linear), 0)
            .unwrap_err();
        assert_eq!(fault, EngineFault::FrameLength { expected: 160, got: 100 });
    }

    #[test]
    fn wrong_linear_length_is_a_fault() {
        let mut engine = NlmsCanceller::new(config(16000)).unwrap();
        let frame = vec![0i16; 160];
        let mut out = vec![0i16; 160];
        let mut linear = vec![0i16; 100];

        let fault = engine
            .process_frame(&frame, &frame, &mut out, Some(&mut linear), 0)
            .unwrap_err();
        assert_eq!(fault, EngineFault::LinearLength { got: 100 });
    }

    #[test]
    fn cancels_scaled_echo() {
        let rate = 16000;
        let frames = 40;
        let spf = 160;
        let total = frames * spf;

        let reference = sine(rate, 440.0, total, 8000.0);
        // Capture is a pure attenuated echo of the reference.
        let capture: Vec<i16> = reference.iter().map(|&s| (s as f32 * 0.6) as i16).collect();

        let mut engine = NlmsCanceller::new(config(rate)).unwrap();
        let mut out = vec![0i16; spf];
        let mut linear = vec![0i16; LINEAR_FRAME_SAMPLES];
        let mut tail_out = Vec::new();
        let mut tail_cap = Vec::new();

        for f in 0..frames {
            let span = f * spf..(f + 1) * spf;
            engine
                .process_frame(
                    &reference[span.clone()],
                    &capture[span.clone()],
                    &mut out,
                    Some(&mut linear),
                    0,
                )
                .unwrap();
            if f >= frames - 10 {
                tail_out.extend_from_slice(&out);
                tail_cap.extend_from_slice(&capture[span]);
            }
        }

        assert!(
            rms(&tail_out) < 0.25 * rms(&tail_cap),
            "echo not cancelled: out rms {} vs capture rms {}",
            rms(&tail_out),
            rms(&tail_cap)
        );
    }

    #[test]
    fn cancels_delayed_echo_with_buffer_delay_hint() {
        let rate = 16000;
        let frames = 40;
        let spf = 160;
        let total = frames * spf;
        let delay = 24usize;

        let reference = sine(rate, 440.0, total, 8000.0);
        let capture: Vec<i16> = (0..total)
            .map(|n| {
                if n >= delay {
                    (reference[n - delay] as f32 * 0.6) as i16
                } else {
                    0
                }
            })
            .collect();

        let mut engine = NlmsCanceller::new(config(rate)).unwrap();
        let mut out = vec![0i16; spf];
        let mut tail_out = Vec::new();
        let mut tail_cap = Vec::new();

        for f in 0..frames {
            let span = f * spf..(f + 1) * spf;
            engine
                .process_frame(
                    &reference[span.clone()],
                    &capture[span.clone()],
                    &mut out,
                    None,
                    delay as i32,
                )
                .unwrap();
            if f >= frames - 10 {
                tail_out.extend_from_slice(&out);
                tail_cap.extend_from_slice(&capture[span]);
            }
        }

        assert!(rms(&tail_out) < 0.25 * rms(&tail_cap));
    }

    #[test]
    fn linear_chunk_is_fixed_size_at_48khz() {
        let rate = 48000;
        let spf = 480;

        let reference = sine(rate, 440.0, spf, 8000.0);
        let mut engine = NlmsCanceller::new(config(rate)).unwrap();
        let mut out = vec![0i16; spf];
        let mut linear = vec![0i16; LINEAR_FRAME_SAMPLES];

        engine
            .process_frame(&reference, &reference, &mut out, Some(&mut linear), 0)
            .unwrap();
        // First frame is unadapted: the error equals the capture, so the
        // downsampled diagnostic carries signal.
        assert!(linear.iter().any(|&s| s != 0));
    }

    #[test]
    fn export_disabled_zeroes_linear_chunk() {
        let mut engine = NlmsCanceller::new(EngineConfig {
            sample_rate: 16000,
            num_channels: 1,
            export_linear: false,
        })
        .unwrap();

        let reference = sine(16000, 440.0, 160, 8000.0);
        let mut out = vec![0i16; 160];
        let mut linear = vec![1i16; LINEAR_FRAME_SAMPLES];

        engine
            .process_frame(&reference, &reference, &mut out, Some(&mut linear), 0)
            .unwrap();
        assert!(linear.iter().all(|&s| s == 0));
    }

    #[test]
    fn resample_preserves_constant_signal() {
        let src = vec![100.0f32; 480];
        let mut dst = vec![0i16; LINEAR_FRAME_SAMPLES];
        resample_to_fixed(&src, &mut dst);
        assert!(dst.iter().all(|&s| s == 100));
    }

    #[test]
    fn suppressor_gain_bounds() {
        // No estimated echo, loud near-end: passes through.
        assert_relative_eq!(residual_gain(1000.0, 0.0), 0.999, epsilon = 1e-3);
        // Echo dominates: clamped to the floor.
        assert_relative_eq!(residual_gain(10.0, 5000.0), MIN_SUPPRESSOR_GAIN);
        // Silence: floor, not NaN.
        assert_relative_eq!(residual_gain(0.0, 0.0), MIN_SUPPRESSOR_GAIN);
    }
}
