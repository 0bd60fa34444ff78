//! Feature parameter configuration
//!
//! `FeatureParams` is the single configuration surface of the pipeline. It is
//! an immutable value: a [`PowerSpectrum`](crate::features::PowerSpectrum)
//! validates it once at construction and keeps its own copy for its lifetime.
//! Parameters can be loaded from JSON so that front-end settings can be tuned
//! without recompilation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::FeatureError;

/// Seed used for dithering when none is configured explicitly
pub const DEFAULT_DITHER_SEED: u64 = 123_456;

/// Analysis window applied to every frame before the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    #[default]
    Hamming,
    Hanning,
    Rectangular,
    Blackman,
    /// Hanning window raised to the power 0.85
    Povey,
}

/// Spectral transform implementation backing the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Complex FFT from `rustfft`
    #[default]
    RustFft,
    /// Real-to-complex FFT from `realfft`
    RealFft,
    /// Direct O(N*K) transform, used as a numerical reference
    Dft,
}

/// Feature extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureParams {
    /// Sampling rate of the input waveform in Hz
    pub sampling_freq: u32,
    /// Frame length in milliseconds
    pub frame_size_ms: f32,
    /// Distance between consecutive frame starts in milliseconds
    pub frame_stride_ms: f32,
    /// Transform length; `None` selects the next power of two >= frame length
    pub n_fft: Option<usize>,
    /// Number of retained spectral bins; `None` keeps n_fft / 2 + 1
    pub num_bins: Option<usize>,
    /// Dither amplitude (0 disables dithering)
    pub dither: f32,
    /// Dither RNG seed
    ///
    /// The generator is re-seeded on every `apply`, so utterances of the same
    /// length receive the same noise sequence. `None` seeds from OS entropy
    /// on every call for independent noise per utterance.
    pub dither_seed: Option<u64>,
    /// Pre-emphasis coefficient (0 disables pre-emphasis)
    pub preem_coef: f32,
    pub window_type: WindowType,
    /// Subtract the per-frame mean before pre-emphasis
    pub zero_mean_frame: bool,
    pub backend: BackendKind,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            sampling_freq: 16000,
            frame_size_ms: 25.0,
            frame_stride_ms: 10.0,
            n_fft: None,
            num_bins: None,
            dither: 0.0,
            dither_seed: Some(DEFAULT_DITHER_SEED),
            preem_coef: 0.97,
            window_type: WindowType::Hamming,
            zero_mean_frame: true,
            backend: BackendKind::RustFft,
        }
    }
}

impl FeatureParams {
    /// Number of samples in one frame
    pub fn samples_per_frame(&self) -> usize {
        ms_to_samples(self.frame_size_ms, self.sampling_freq)
    }

    /// Number of samples between consecutive frame starts
    pub fn samples_per_stride(&self) -> usize {
        ms_to_samples(self.frame_stride_ms, self.sampling_freq)
    }

    /// Transform length
    pub fn n_fft(&self) -> usize {
        self.n_fft
            .unwrap_or_else(|| self.samples_per_frame().max(1).next_power_of_two())
    }

    /// Number of spectral bins per frame (K), which is also the output
    /// feature size per frame
    pub fn num_bins(&self) -> usize {
        self.num_bins.unwrap_or_else(|| self.n_fft() / 2 + 1)
    }

    /// Number of complete frames that fit in `input_len` samples
    ///
    /// A trailing partial frame is dropped, and a signal shorter than one
    /// frame yields zero frames.
    pub fn num_frames(&self, input_len: usize) -> usize {
        let frame = self.samples_per_frame();
        let stride = self.samples_per_stride();
        if frame == 0 || stride == 0 || input_len < frame {
            return 0;
        }
        (input_len - frame) / stride + 1
    }

    /// Check every parameter, returning the first violation found
    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.sampling_freq == 0 {
            return Err(FeatureError::invalid_config(
                "sampling_freq must be positive",
            ));
        }
        if self.frame_size_ms.is_nan() || self.frame_size_ms <= 0.0 {
            return Err(FeatureError::invalid_config(format!(
                "frame_size_ms must be positive (got {})",
                self.frame_size_ms
            )));
        }
        if self.frame_stride_ms.is_nan() || self.frame_stride_ms <= 0.0 {
            return Err(FeatureError::invalid_config(format!(
                "frame_stride_ms must be positive (got {})",
                self.frame_stride_ms
            )));
        }

        let frame = self.samples_per_frame();
        if frame == 0 {
            return Err(FeatureError::invalid_config(format!(
                "frame_size_ms {} is too low for {} Hz",
                self.frame_size_ms, self.sampling_freq
            )));
        }
        if self.samples_per_stride() == 0 {
            return Err(FeatureError::invalid_config(format!(
                "frame_stride_ms {} is too low for {} Hz",
                self.frame_stride_ms, self.sampling_freq
            )));
        }

        if let Some(n_fft) = self.n_fft {
            if !n_fft.is_power_of_two() {
                return Err(FeatureError::invalid_config(format!(
                    "n_fft must be a power of two (got {})",
                    n_fft
                )));
            }
            if n_fft < frame {
                return Err(FeatureError::invalid_config(format!(
                    "n_fft {} is shorter than the frame ({} samples)",
                    n_fft, frame
                )));
            }
        }

        let max_bins = self.n_fft() / 2 + 1;
        if let Some(bins) = self.num_bins {
            if bins == 0 || bins > max_bins {
                return Err(FeatureError::invalid_config(format!(
                    "num_bins must be in 1..={} (got {})",
                    max_bins, bins
                )));
            }
        }

        if !self.dither.is_finite() {
            return Err(FeatureError::invalid_config("dither must be finite"));
        }
        if !self.preem_coef.is_finite() {
            return Err(FeatureError::invalid_config("preem_coef must be finite"));
        }

        Ok(())
    }

    /// Parse parameters from a JSON document
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, FeatureError> {
        serde_json::from_str(json)
            .map_err(|err| FeatureError::invalid_config(format!("malformed JSON: {}", err)))
    }

    /// Load parameters from a JSON file
    ///
    /// # Returns
    /// The parsed parameters, or the defaults if the file cannot be read or
    /// parsed (a warning is logged in that case)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(params) => {
                    log::info!("[Config] Loaded feature params from {:?}", path.as_ref());
                    params
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}

fn ms_to_samples(ms: f32, sampling_freq: u32) -> usize {
    let samples = (1e-3 * f64::from(ms) * f64::from(sampling_freq)).round();
    // NaN and negative values saturate to 0
    samples as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangular_params() -> FeatureParams {
        FeatureParams {
            preem_coef: 0.0,
            window_type: WindowType::Rectangular,
            zero_mean_frame: false,
            ..FeatureParams::default()
        }
    }

    #[test]
    fn test_default_derived_quantities() {
        let params = FeatureParams::default();
        assert_eq!(params.samples_per_frame(), 400);
        assert_eq!(params.samples_per_stride(), 160);
        assert_eq!(params.n_fft(), 512);
        assert_eq!(params.num_bins(), 257);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_num_frames() {
        let params = rectangular_params();
        assert_eq!(params.num_frames(0), 0);
        assert_eq!(params.num_frames(399), 0);
        assert_eq!(params.num_frames(400), 1);
        assert_eq!(params.num_frames(559), 1);
        assert_eq!(params.num_frames(560), 2);
        assert_eq!(params.num_frames(16000), 98);
    }

    #[test]
    fn test_rejects_non_positive_durations() {
        let params = FeatureParams {
            sampling_freq: 0,
            ..FeatureParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(FeatureError::InvalidConfiguration { .. })
        ));

        for ms in [0.0, -25.0, f32::NAN] {
            let params = FeatureParams {
                frame_size_ms: ms,
                ..FeatureParams::default()
            };
            assert!(params.validate().is_err(), "frame_size_ms {} accepted", ms);

            let params = FeatureParams {
                frame_stride_ms: ms,
                ..FeatureParams::default()
            };
            assert!(params.validate().is_err(), "frame_stride_ms {} accepted", ms);
        }
    }

    #[test]
    fn test_rejects_frames_shorter_than_one_sample() {
        // 0.01 ms at 16 kHz rounds to 0 samples
        let params = FeatureParams {
            frame_size_ms: 0.01,
            ..FeatureParams::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("too low"));

        let params = FeatureParams {
            frame_stride_ms: 0.01,
            ..FeatureParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_transform_sizes() {
        let params = FeatureParams {
            n_fft: Some(500),
            ..FeatureParams::default()
        };
        assert!(params.validate().is_err());

        let params = FeatureParams {
            n_fft: Some(256),
            ..FeatureParams::default()
        };
        assert!(params.validate().is_err());

        let params = FeatureParams {
            num_bins: Some(258),
            ..FeatureParams::default()
        };
        assert!(params.validate().is_err());

        let params = FeatureParams {
            n_fft: Some(1024),
            num_bins: Some(80),
            ..FeatureParams::default()
        };
        assert!(params.validate().is_ok());
        assert_eq!(params.num_bins(), 80);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params =
            FeatureParams::from_json_str(r#"{"sampling_freq": 8000, "window_type": "hanning"}"#)
                .unwrap();
        assert_eq!(params.sampling_freq, 8000);
        assert_eq!(params.window_type, WindowType::Hanning);
        assert_eq!(params.frame_size_ms, 25.0);
        assert_eq!(params.samples_per_frame(), 200);
        assert_eq!(params.backend, BackendKind::RustFft);
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = FeatureParams::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, FeatureError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_load_from_file_falls_back_to_defaults() {
        let params = FeatureParams::load_from_file("/nonexistent/feature_params.json");
        assert_eq!(params, FeatureParams::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let written = FeatureParams {
            dither: 0.1,
            backend: BackendKind::RealFft,
            ..rectangular_params()
        };
        fs::write(&path, serde_json::to_string_pretty(&written).unwrap()).unwrap();

        let loaded = FeatureParams::load_from_file(&path);
        assert_eq!(loaded, written);
    }
}
