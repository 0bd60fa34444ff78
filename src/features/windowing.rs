// Windowing - taper each frame with a precomputed analysis window

use std::f64::consts::PI;

use crate::config::WindowType;

#[derive(Debug, Clone)]
pub struct Windowing {
    window_type: WindowType,
    coefficients: Vec<f32>,
}

impl Windowing {
    /// Precompute `frame_len` coefficients for `window_type`
    pub fn new(frame_len: usize, window_type: WindowType) -> Self {
        let denom = frame_len.saturating_sub(1) as f64;
        let coefficients = (0..frame_len)
            .map(|n| {
                if denom == 0.0 {
                    return 1.0;
                }
                let phase = 2.0 * PI * n as f64 / denom;
                let value = match window_type {
                    WindowType::Hamming => 0.54 - 0.46 * phase.cos(),
                    WindowType::Hanning => 0.5 - 0.5 * phase.cos(),
                    WindowType::Rectangular => 1.0,
                    WindowType::Blackman => 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos(),
                    WindowType::Povey => (0.5 - 0.5 * phase.cos()).max(0.0).powf(0.85),
                };
                value as f32
            })
            .collect();

        Self {
            window_type,
            coefficients,
        }
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    /// Multiply every frame of `frames` element-wise by the window
    ///
    /// `frames.len()` must be a multiple of the window length.
    pub fn apply_in_place(&self, frames: &mut [f32]) {
        debug_assert_eq!(frames.len() % self.coefficients.len().max(1), 0);
        for frame in frames.chunks_exact_mut(self.coefficients.len()) {
            for (sample, &w) in frame.iter_mut().zip(&self.coefficients) {
                *sample *= w;
            }
        }
    }
}
