//! Vectorized kernel entry points.
//!
//! The optional `simd` cargo feature routes the sinc-resampler convolution
//! and the 128-point FFT sub-transforms through platform intrinsics. With
//! the feature disabled (the default) these no-op stubs keep the kernel
//! dispatch surface link-complete; the scalar paths in [`crate::engine`]
//! never dispatch here. Reaching one of these bodies means the build was
//! misconfigured, not that a runtime error occurred.

/// Dual-kernel convolution of the sinc resampler.
#[cfg(not(feature = "simd"))]
pub fn sinc_convolve(_input: &[f32], _k1: &[f32], _k2: &[f32], _position: f64) -> (f32, f32) {
    debug_assert!(false, "vectorized kernel reached with the simd feature disabled");
    (0.0, 0.0)
}

/// First-stage butterflies of the 128-point complex FFT.
#[cfg(not(feature = "simd"))]
pub fn cft1st_128(_a: &mut [f32]) {
    debug_assert!(false, "vectorized kernel reached with the simd feature disabled");
}

/// Middle-stage butterflies of the 128-point complex FFT.
#[cfg(not(feature = "simd"))]
pub fn cftmdl_128(_a: &mut [f32]) {
    debug_assert!(false, "vectorized kernel reached with the simd feature disabled");
}

/// Forward real-FFT post-processing pass.
#[cfg(not(feature = "simd"))]
pub fn rftfsub_128(_a: &mut [f32]) {
    debug_assert!(false, "vectorized kernel reached with the simd feature disabled");
}

/// Backward real-FFT pre-processing pass.
#[cfg(not(feature = "simd"))]
pub fn rftbsub_128(_a: &mut [f32]) {
    debug_assert!(false, "vectorized kernel reached with the simd feature disabled");
}
