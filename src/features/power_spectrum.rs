// PowerSpectrum - frame -> dither -> zero-mean -> pre-emphasis -> window -> |FFT|^2
//
// One pipeline instance owns one transform. The transform's scratch state is
// the only mutable state shared between calls, so it sits behind a mutex
// that is taken for one frame at a time: concurrent `apply` calls (including
// batch workers) run every preprocessing stage in parallel and interleave
// only at the per-frame transform.

use log::info;
use std::sync::Mutex;

use super::dither::Dither;
use super::framing::{frame_signal, FrameMatrix};
use super::preemphasis::PreEmphasis;
use super::windowing::Windowing;
use crate::config::FeatureParams;
use crate::error::FeatureError;
use crate::transform::{create_transform, SpectralTransform};

/// Power spectrum feature extractor
///
/// Output layout for one utterance is `num_bins` values per frame, frames in
/// signal order (bin index varies fastest).
pub struct PowerSpectrum {
    params: FeatureParams,
    dither: Dither,
    pre_emphasis: PreEmphasis,
    windowing: Windowing,
    transform: Mutex<Box<dyn SpectralTransform>>,
}

impl PowerSpectrum {
    /// Validate `params` and build the pipeline with the configured backend
    ///
    /// # Errors
    /// `InvalidConfiguration` for rejected parameters (checked before any
    /// buffer is allocated), `TransformBackend` if the transform cannot be
    /// created.
    pub fn new(params: FeatureParams) -> Result<Self, FeatureError> {
        params.validate()?;
        let transform = create_transform(params.backend, params.n_fft(), params.num_bins())?;
        Ok(Self::assemble(params, transform))
    }

    /// Build the pipeline around a caller-supplied transform
    ///
    /// `params.backend` is ignored; the transform length and bin count must
    /// match `params.n_fft()` and `params.num_bins()`.
    pub fn with_transform(
        params: FeatureParams,
        transform: Box<dyn SpectralTransform>,
    ) -> Result<Self, FeatureError> {
        params.validate()?;
        if transform.len() != params.n_fft() || transform.num_bins() != params.num_bins() {
            return Err(FeatureError::invalid_config(format!(
                "transform {} is {}-point with {} bins, params need {}-point with {} bins",
                transform.name(),
                transform.len(),
                transform.num_bins(),
                params.n_fft(),
                params.num_bins()
            )));
        }
        Ok(Self::assemble(params, transform))
    }

    fn assemble(params: FeatureParams, transform: Box<dyn SpectralTransform>) -> Self {
        let windowing = Windowing::new(params.samples_per_frame(), params.window_type);
        info!(
            "[PowerSpectrum] {} Hz, frame {} samples, stride {} samples, {:?} window, n_fft {}, {} bins, backend {}",
            params.sampling_freq,
            params.samples_per_frame(),
            params.samples_per_stride(),
            windowing.window_type(),
            params.n_fft(),
            params.num_bins(),
            transform.name()
        );

        Self {
            dither: Dither::new(params.dither, params.dither_seed),
            pre_emphasis: PreEmphasis::new(params.preem_coef),
            windowing,
            transform: Mutex::new(transform),
            params,
        }
    }

    pub fn feature_params(&self) -> &FeatureParams {
        &self.params
    }

    /// Number of output values `apply` produces for `input_len` samples
    pub fn output_size(&self, input_len: usize) -> usize {
        self.params.num_bins() * self.params.num_frames(input_len)
    }

    /// Compute the power spectrum of one utterance
    ///
    /// A signal shorter than one frame yields an empty result.
    pub fn apply(&self, signal: &[f32]) -> Result<Vec<f32>, FeatureError> {
        let frames = frame_signal(signal, &self.params);
        if frames.is_empty() {
            return Ok(Vec::new());
        }
        self.power_spectrum_frames(frames)
    }

    /// Run every stage after framing on an already framed utterance
    ///
    /// Exposed so that feature types built on the power spectrum (filterbank
    /// energies, cepstra) can reuse the framing they already did.
    pub fn power_spectrum_frames(&self, mut frames: FrameMatrix) -> Result<Vec<f32>, FeatureError> {
        if frames.frame_len != self.params.samples_per_frame() {
            return Err(FeatureError::invalid_argument(format!(
                "frames hold {} samples, expected {}",
                frames.frame_len,
                self.params.samples_per_frame()
            )));
        }

        if self.dither.amplitude() != 0.0 {
            self.dither.apply_in_place(&mut frames.data);
        }
        if self.params.zero_mean_frame {
            remove_frame_mean(&mut frames);
        }
        if self.pre_emphasis.coef() != 0.0 {
            self.pre_emphasis.apply_in_place(&mut frames);
        }
        self.windowing.apply_in_place(&mut frames.data);

        let num_bins = self.params.num_bins();
        let mut power = vec![0.0_f32; num_bins * frames.num_frames()];
        for (frame, out) in frames
            .data
            .chunks_exact(frames.frame_len)
            .zip(power.chunks_exact_mut(num_bins))
        {
            let mut transform = self
                .transform
                .lock()
                .map_err(|_| FeatureError::LockPoisoned {
                    component: "SpectralTransform".to_string(),
                })?;
            transform.power_spectrum(frame, out)?;
        }
        Ok(power)
    }
}

/// Subtract each frame's mean from its samples and from its pre-emphasis
/// history, so the history stays in the same domain as the frame
fn remove_frame_mean(frames: &mut FrameMatrix) {
    let frame_len = frames.frame_len;
    for (frame, prev) in frames
        .data
        .chunks_exact_mut(frame_len)
        .zip(frames.history.iter_mut())
    {
        let mean = frame.iter().map(|&s| f64::from(s)).sum::<f64>() / frame.len() as f64;
        let mean = mean as f32;
        for sample in frame.iter_mut() {
            *sample -= mean;
        }
        *prev -= mean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendKind, WindowType};
    use crate::features::test_support::{plain_params, sine, ScriptedTransform};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_invalid_params_rejected_at_construction() {
        let params = FeatureParams {
            frame_stride_ms: 0.0,
            ..FeatureParams::default()
        };
        assert!(matches!(
            PowerSpectrum::new(params),
            Err(FeatureError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_short_signal_returns_empty() {
        let ps = PowerSpectrum::new(FeatureParams::default()).unwrap();
        assert_eq!(ps.output_size(399), 0);
        assert!(ps.apply(&[0.1; 399]).unwrap().is_empty());
        assert!(ps.apply(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_one_second_of_silence() {
        let ps = PowerSpectrum::new(plain_params()).unwrap();
        let output = ps.apply(&vec![0.0; 16000]).unwrap();
        assert_eq!(ps.output_size(16000), 25186);
        assert_eq!(output.len(), 25186);
        assert!(output.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_output_size_matches_apply() {
        let ps = PowerSpectrum::new(FeatureParams::default()).unwrap();
        for len in [400, 401, 559, 560, 1234, 4800] {
            let signal = sine(len, 440.0, 16000);
            assert_eq!(ps.apply(&signal).unwrap().len(), ps.output_size(len));
        }
    }

    #[test]
    fn test_zero_mean_removes_dc() {
        let params = FeatureParams {
            zero_mean_frame: true,
            ..plain_params()
        };
        let ps = PowerSpectrum::new(params).unwrap();
        let output = ps.apply(&vec![0.75; 800]).unwrap();
        assert!(output.iter().all(|&v| v.abs() < 1e-6));

        let ps = PowerSpectrum::new(plain_params()).unwrap();
        let output = ps.apply(&vec![0.75; 800]).unwrap();
        // DC bin of a constant 400-sample frame: (0.75 * 400)^2
        assert!((output[0] - 90000.0).abs() < 1.0);
    }

    #[test]
    fn test_default_stages_silence_constant_signal() {
        // zero-mean and pre-emphasis both on, as shipped by default
        let params = FeatureParams::default();
        assert!(params.zero_mean_frame);
        assert!(params.preem_coef != 0.0);
        let ps = PowerSpectrum::new(params).unwrap();

        let output = ps.apply(&vec![0.75; 1600]).unwrap();
        assert_eq!(output.len(), 257 * 8);
        for (f, frame) in output.chunks_exact(257).enumerate() {
            let energy: f32 = frame.iter().sum();
            assert!(energy < 1e-6, "frame {} energy {}", f, energy);
        }
    }

    #[test]
    fn test_mean_removal_shifts_history() {
        let mut frames = FrameMatrix {
            data: vec![1.0, 3.0, 5.0, 7.0],
            history: vec![0.0, 3.0],
            frame_len: 2,
        };
        remove_frame_mean(&mut frames);
        assert_eq!(frames.data, vec![-1.0, 1.0, -1.0, 1.0]);
        assert_eq!(frames.history, vec![-2.0, -3.0]);
    }

    #[test]
    fn test_sinusoid_peak_bin() {
        // 1 kHz at 16 kHz with a 512-point transform lands on bin 32
        for backend in [BackendKind::RustFft, BackendKind::RealFft, BackendKind::Dft] {
            let params = FeatureParams {
                backend,
                ..plain_params()
            };
            let ps = PowerSpectrum::new(params).unwrap();
            let output = ps.apply(&sine(400, 1000.0, 16000)).unwrap();
            assert_eq!(output.len(), 257);
            let peak = output
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(k, _)| k)
                .unwrap();
            assert!((31..=33).contains(&peak), "{:?} peak at {}", backend, peak);
        }
    }

    #[test]
    fn test_with_transform_checks_dimensions() {
        let params = plain_params();
        let err = PowerSpectrum::with_transform(params.clone(), Box::new(ScriptedTransform::new(256, 129)))
            .err()
            .unwrap();
        assert!(matches!(err, FeatureError::InvalidConfiguration { .. }));

        assert!(
            PowerSpectrum::with_transform(params, Box::new(ScriptedTransform::new(512, 257))).is_ok()
        );
    }

    #[test]
    fn test_transform_failure_propagates() {
        let ps =
            PowerSpectrum::with_transform(plain_params(), Box::new(ScriptedTransform::new(512, 257)))
                .unwrap();
        let mut signal = vec![0.0; 800];
        signal[500] = ScriptedTransform::FAIL_SAMPLE;
        assert!(matches!(
            ps.apply(&signal),
            Err(FeatureError::TransformBackend { .. })
        ));
        // The pipeline stays usable afterwards
        assert_eq!(ps.apply(&vec![0.0; 800]).unwrap().len(), 257 * 3);
    }

    #[test]
    fn test_poisoned_transform_lock_is_reported() {
        let ps =
            PowerSpectrum::with_transform(plain_params(), Box::new(ScriptedTransform::new(512, 257)))
                .unwrap();
        let mut signal = vec![0.0; 400];
        signal[0] = ScriptedTransform::PANIC_SAMPLE;
        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| ps.apply(&signal)));
        assert!(panicked.is_err());

        assert!(matches!(
            ps.apply(&vec![0.0; 400]),
            Err(FeatureError::LockPoisoned { .. })
        ));
    }

    #[test]
    fn test_frame_length_mismatch_rejected() {
        let ps = PowerSpectrum::new(plain_params()).unwrap();
        let frames = FrameMatrix {
            data: vec![0.0; 10],
            history: vec![0.0],
            frame_len: 10,
        };
        assert!(matches!(
            ps.power_spectrum_frames(frames),
            Err(FeatureError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_concurrent_apply_matches_serial() {
        let params = FeatureParams {
            dither: 0.01,
            window_type: WindowType::Povey,
            ..FeatureParams::default()
        };
        let ps = Arc::new(PowerSpectrum::new(params).unwrap());
        let signals: Vec<Vec<f32>> = (0..8)
            .map(|i| sine(3200, 200.0 + 150.0 * i as f32, 16000))
            .collect();
        let serial: Vec<Vec<f32>> = signals.iter().map(|s| ps.apply(s).unwrap()).collect();

        let handles: Vec<_> = signals
            .into_iter()
            .map(|signal| {
                let ps = Arc::clone(&ps);
                thread::spawn(move || ps.apply(&signal).unwrap())
            })
            .collect();
        for (handle, expected) in handles.into_iter().zip(serial) {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
