// Speech Features Core - power spectrum extraction for speech pipelines
// Deterministic frame-based spectral features with a parallel batch driver

// Module declarations
pub mod config;
pub mod error;
pub mod features;
pub mod transform;

// Re-exports for convenience
pub use config::{BackendKind, FeatureParams, WindowType};
pub use error::{ErrorCode, FeatureError};
pub use features::PowerSpectrum;
pub use transform::SpectralTransform;
