// Features module - power spectrum extraction pipeline
//
// Stages, in the order they are applied to one utterance:
// - framing: overlapping fixed-length frames, trailing partial frame dropped
// - dither: optional bounded noise (seeded, reproducible)
// - zero-mean: optional per-frame mean removal
// - preemphasis: optional first-order high-pass with per-frame history
// - windowing: analysis window, always applied
// - transform: |FFT|^2 of each frame through a `SpectralTransform`
//
// Module organization:
// - power_spectrum: PowerSpectrum coordinator (single utterance)
// - batch: parallel driver over equal-length utterances

mod batch;
mod dither;
mod framing;
mod power_spectrum;
mod preemphasis;
mod windowing;

pub use dither::Dither;
pub use framing::{frame_signal, FrameMatrix};
pub use power_spectrum::PowerSpectrum;
pub use preemphasis::PreEmphasis;
pub use windowing::Windowing;
