// Real-to-complex FFT backend built on realfft
//
// realfft uses the input buffer as scratch space, so the frame is reloaded
// (and the tail re-zeroed) on every call.

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

use super::{check_call, check_dimensions, SpectralTransform};
use crate::error::FeatureError;

/// Forward transform backed by a realfft plan
pub struct RealFftTransform {
    fft: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    num_bins: usize,
}

impl RealFftTransform {
    /// Plan a real forward FFT of length `n_fft` retaining `num_bins` bins
    pub fn new(n_fft: usize, num_bins: usize) -> Result<Self, FeatureError> {
        check_dimensions(n_fft, num_bins)?;
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n_fft);
        let input = fft.make_input_vec();
        let spectrum = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();

        Ok(Self {
            fft,
            input,
            spectrum,
            scratch,
            num_bins,
        })
    }
}

impl SpectralTransform for RealFftTransform {
    fn len(&self) -> usize {
        self.input.len()
    }

    fn num_bins(&self) -> usize {
        self.num_bins
    }

    fn name(&self) -> &'static str {
        "realfft"
    }

    fn power_spectrum(&mut self, frame: &[f32], output: &mut [f32]) -> Result<(), FeatureError> {
        check_call(self.name(), self.input.len(), self.num_bins, frame, output)?;

        let (head, tail) = self.input.split_at_mut(frame.len());
        head.copy_from_slice(frame);
        tail.fill(0.0);

        self.fft
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
            .map_err(|err| FeatureError::backend(format!("realfft: {}", err)))?;

        for (out, bin) in output.iter_mut().zip(&self.spectrum) {
            *out = bin.norm_sqr();
        }
        Ok(())
    }
}
