// Transform module - spectral transform abstraction and backends
//
// The pipeline only sees `SpectralTransform`: a forward real-to-complex
// transform of fixed length that writes magnitude-squared bins. Concrete
// backends own their plan and scratch buffers, which are sized once at
// construction and reused for every frame. Because that scratch state is
// mutated on every call, a transform instance is not reentrant; callers
// sharing one instance must serialize access (see `PowerSpectrum`).
//
// Module organization:
// - rustfft_backend: complex FFT (rustfft) fed with a real frame
// - realfft_backend: real-to-complex FFT (realfft)
// - dft: direct transform used as a numerical reference

mod dft;
mod realfft_backend;
mod rustfft_backend;

pub use dft::DftTransform;
pub use realfft_backend::RealFftTransform;
pub use rustfft_backend::RustFftTransform;

use crate::config::BackendKind;
use crate::error::FeatureError;

/// Forward real-to-complex transform producing magnitude-squared bins
pub trait SpectralTransform: Send {
    /// Transform length
    fn len(&self) -> usize;

    /// Number of bins written by [`power_spectrum`](Self::power_spectrum)
    fn num_bins(&self) -> usize;

    /// Short backend identifier used in logs
    fn name(&self) -> &'static str;

    /// Compute `|X[k]|^2` for the first `num_bins()` bins of one frame
    ///
    /// The frame is copied into the transform input buffer and zero-padded
    /// up to `len()`.
    ///
    /// # Errors
    /// `TransformBackend` if the frame is longer than the transform, if
    /// `output` does not hold exactly `num_bins()` values, or if the
    /// underlying library reports a failure.
    fn power_spectrum(&mut self, frame: &[f32], output: &mut [f32]) -> Result<(), FeatureError>;
}

/// Construct the transform selected by `kind`
///
/// # Arguments
/// * `kind` - Backend implementation
/// * `n_fft` - Transform length (must be > 0)
/// * `num_bins` - Retained bins (1..=n_fft / 2 + 1)
pub fn create_transform(
    kind: BackendKind,
    n_fft: usize,
    num_bins: usize,
) -> Result<Box<dyn SpectralTransform>, FeatureError> {
    check_dimensions(n_fft, num_bins)?;
    let transform: Box<dyn SpectralTransform> = match kind {
        BackendKind::RustFft => Box::new(RustFftTransform::new(n_fft, num_bins)?),
        BackendKind::RealFft => Box::new(RealFftTransform::new(n_fft, num_bins)?),
        BackendKind::Dft => Box::new(DftTransform::new(n_fft, num_bins)?),
    };
    Ok(transform)
}

fn check_dimensions(n_fft: usize, num_bins: usize) -> Result<(), FeatureError> {
    if n_fft == 0 {
        return Err(FeatureError::backend("transform length must be positive"));
    }
    if num_bins == 0 || num_bins > n_fft / 2 + 1 {
        return Err(FeatureError::backend(format!(
            "cannot retain {} bins from a {}-point transform",
            num_bins, n_fft
        )));
    }
    Ok(())
}

/// Validate the per-call slice lengths shared by every backend
fn check_call(
    name: &str,
    n_fft: usize,
    num_bins: usize,
    frame: &[f32],
    output: &[f32],
) -> Result<(), FeatureError> {
    if frame.len() > n_fft {
        return Err(FeatureError::backend(format!(
            "{}: frame of {} samples exceeds transform length {}",
            name,
            frame.len(),
            n_fft
        )));
    }
    if output.len() != num_bins {
        return Err(FeatureError::backend(format!(
            "{}: output holds {} values, expected {}",
            name,
            output.len(),
            num_bins
        )));
    }
    Ok(())
}
