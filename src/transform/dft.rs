// Direct DFT backend
//
// O(N*K) with f64 accumulation and precomputed twiddles. Too slow for
// production frame rates but exact enough to serve as the reference the FFT
// backends are checked against.

use super::{check_call, check_dimensions, SpectralTransform};
use crate::error::FeatureError;

/// Reference transform evaluating the DFT sum directly
pub struct DftTransform {
    n_fft: usize,
    num_bins: usize,
    /// cos/sin of 2*pi*m/n_fft for m in 0..n_fft
    twiddles: Vec<(f64, f64)>,
}

impl DftTransform {
    pub fn new(n_fft: usize, num_bins: usize) -> Result<Self, FeatureError> {
        check_dimensions(n_fft, num_bins)?;
        let step = 2.0 * std::f64::consts::PI / n_fft as f64;
        let twiddles = (0..n_fft)
            .map(|m| {
                let angle = step * m as f64;
                (angle.cos(), angle.sin())
            })
            .collect();

        Ok(Self {
            n_fft,
            num_bins,
            twiddles,
        })
    }
}

impl SpectralTransform for DftTransform {
    fn len(&self) -> usize {
        self.n_fft
    }

    fn num_bins(&self) -> usize {
        self.num_bins
    }

    fn name(&self) -> &'static str {
        "dft"
    }

    fn power_spectrum(&mut self, frame: &[f32], output: &mut [f32]) -> Result<(), FeatureError> {
        check_call(self.name(), self.n_fft, self.num_bins, frame, output)?;

        // Zero padding contributes nothing to the sum, so only the frame is visited
        for (k, out) in output.iter_mut().enumerate() {
            let mut re = 0.0_f64;
            let mut im = 0.0_f64;
            for (n, &sample) in frame.iter().enumerate() {
                let (cos, sin) = self.twiddles[(k * n) % self.n_fft];
                re += f64::from(sample) * cos;
                im -= f64::from(sample) * sin;
            }
            *out = (re * re + im * im) as f32;
        }
        Ok(())
    }
}
