// Error types for the speech feature pipeline
//
// This module defines the error taxonomy surfaced by pipeline construction,
// per-call argument checks, post-condition checks and transform backends,
// with stable numeric codes for callers that report errors across a process
// or language boundary.

mod feature;

pub use feature::{log_feature_error, FeatureError, FeatureErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
