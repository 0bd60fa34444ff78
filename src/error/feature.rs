// Feature extraction error types and constants

use crate::error::ErrorCode;
use log::error;
use thiserror::Error;

/// Feature error code constants
///
/// Single source of truth for the numeric codes returned by
/// [`ErrorCode::code`] on [`FeatureError`].
///
/// Error code range: 3001-3005
pub struct FeatureErrorCodes;

impl FeatureErrorCodes {
    /// Feature parameters rejected at pipeline construction
    pub const INVALID_CONFIGURATION: i32 = 3001;

    /// Call-time input has the wrong shape
    pub const INVALID_ARGUMENT: i32 = 3002;

    /// A produced result disagrees with its statically predicted size
    pub const INTERNAL_INCONSISTENCY: i32 = 3003;

    /// The spectral transform backend failed to initialise or execute
    pub const TRANSFORM_BACKEND: i32 = 3004;

    /// Mutex guarding the transform was poisoned
    pub const LOCK_POISONED: i32 = 3005;
}

/// Log a feature error with structured context
///
/// Logs the error code, the failing component and the message on a single
/// line so that batch failures can be grepped out of worker logs.
pub fn log_feature_error(err: &FeatureError, context: &str) {
    error!(
        "Feature error in {}: code={}, component=PowerSpectrum, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Feature extraction errors
///
/// None of these are transient: every variant is a deterministic function of
/// the configuration or input, so callers should never retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Malformed feature parameters, detected once at construction
    #[error("Invalid feature configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// Malformed call-time input (batch size, waveform length)
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Output size differs from the size predicted by the parameters
    #[error("Internal inconsistency: expected {expected} values, got {actual}")]
    InternalInconsistency { expected: usize, actual: usize },

    /// Failure reported by the spectral transform backend
    #[error("Transform backend error: {details}")]
    TransformBackend { details: String },

    /// Mutex was poisoned by a panicking worker
    #[error("Lock poisoned on {component}")]
    LockPoisoned { component: String },
}

impl FeatureError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        FeatureError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        FeatureError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn backend(details: impl Into<String>) -> Self {
        FeatureError::TransformBackend {
            details: details.into(),
        }
    }
}

impl ErrorCode for FeatureError {
    fn code(&self) -> i32 {
        match self {
            FeatureError::InvalidConfiguration { .. } => FeatureErrorCodes::INVALID_CONFIGURATION,
            FeatureError::InvalidArgument { .. } => FeatureErrorCodes::INVALID_ARGUMENT,
            FeatureError::InternalInconsistency { .. } => {
                FeatureErrorCodes::INTERNAL_INCONSISTENCY
            }
            FeatureError::TransformBackend { .. } => FeatureErrorCodes::TRANSFORM_BACKEND,
            FeatureError::LockPoisoned { .. } => FeatureErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
