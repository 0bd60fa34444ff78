// Complex FFT backend built on rustfft
//
// rustfft has no real-input transform, so the frame is loaded into the real
// part of a complex buffer. The plan and the in-place scratch buffer are
// created once and reused for every frame.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use super::{check_call, check_dimensions, SpectralTransform};
use crate::error::FeatureError;

/// Forward transform backed by a rustfft plan
pub struct RustFftTransform {
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    num_bins: usize,
}

impl RustFftTransform {
    /// Plan a forward FFT of length `n_fft` retaining `num_bins` bins
    pub fn new(n_fft: usize, num_bins: usize) -> Result<Self, FeatureError> {
        check_dimensions(n_fft, num_bins)?;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n_fft);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Ok(Self {
            fft,
            buffer: vec![Complex::new(0.0, 0.0); n_fft],
            scratch,
            num_bins,
        })
    }
}

impl SpectralTransform for RustFftTransform {
    fn len(&self) -> usize {
        self.buffer.len()
    }

    fn num_bins(&self) -> usize {
        self.num_bins
    }

    fn name(&self) -> &'static str {
        "rustfft"
    }

    fn power_spectrum(&mut self, frame: &[f32], output: &mut [f32]) -> Result<(), FeatureError> {
        check_call(self.name(), self.buffer.len(), self.num_bins, frame, output)?;

        let (head, tail) = self.buffer.split_at_mut(frame.len());
        for (slot, &sample) in head.iter_mut().zip(frame) {
            *slot = Complex::new(sample, 0.0);
        }
        tail.fill(Complex::new(0.0, 0.0));

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (out, bin) in output.iter_mut().zip(&self.buffer) {
            *out = bin.norm_sqr();
        }
        Ok(())
    }
}
