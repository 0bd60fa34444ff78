// Dither - bounded pseudo-random noise to avoid exact digital silence
//
// Seeding policy: every call to `apply_in_place` starts a fresh `StdRng`
// from the configured seed, so the noise added to a buffer depends only on
// the seed and the buffer length. This keeps `PowerSpectrum::apply` a pure
// function of its input (and `batch_apply` identical to per-utterance
// `apply`) regardless of how calls are scheduled across threads. Without a
// seed, each call draws a new seed from OS entropy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Additive uniform noise in `[-amplitude, amplitude)`
#[derive(Debug, Clone)]
pub struct Dither {
    amplitude: f32,
    seed: Option<u64>,
}

impl Dither {
    pub fn new(amplitude: f32, seed: Option<u64>) -> Self {
        Self { amplitude, seed }
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Add noise to every sample of `samples`
    ///
    /// No-op when the amplitude is zero.
    pub fn apply_in_place(&self, samples: &mut [f32]) {
        if self.amplitude == 0.0 {
            return;
        }
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        for sample in samples.iter_mut() {
            *sample += self.amplitude * rng.gen_range(-1.0_f32..1.0);
        }
    }
}
