// Batch driver - run the pipeline over equal-length utterances in parallel
//
// Workers come from the rayon pool, one task per utterance. Each task owns
// its utterance's output slab, so a failing utterance cannot touch another
// utterance's slab. Every task runs to completion; the first failure in
// utterance order is reported.

use log::debug;
use rayon::prelude::*;

use super::power_spectrum::PowerSpectrum;
use crate::error::{log_feature_error, FeatureError};

impl PowerSpectrum {
    /// Compute the power spectrum of `batch_size` concatenated utterances
    ///
    /// `signal` holds the utterances back to back (utterance index is the
    /// slowest-varying dimension). The result holds each utterance's
    /// `output_size(signal.len() / batch_size)` values in the same order.
    ///
    /// # Errors
    /// `InvalidArgument` if `batch_size` is zero or does not divide
    /// `signal.len()`; otherwise the first per-utterance failure.
    pub fn batch_apply(&self, signal: &[f32], batch_size: usize) -> Result<Vec<f32>, FeatureError> {
        let utterance_len = check_batch_shape(signal.len(), batch_size)?;
        let mut features = vec![0.0_f32; self.output_size(utterance_len) * batch_size];
        self.batch_apply_into(signal, batch_size, &mut features)?;
        Ok(features)
    }

    /// Like [`batch_apply`](Self::batch_apply) but writes into a caller-owned
    /// buffer of exactly `batch_size * output_size(signal.len() / batch_size)`
    /// values
    ///
    /// If some utterances fail, the slabs of the ones that succeeded are
    /// still written to `output`.
    pub fn batch_apply_into(
        &self,
        signal: &[f32],
        batch_size: usize,
        output: &mut [f32],
    ) -> Result<(), FeatureError> {
        let utterance_len = check_batch_shape(signal.len(), batch_size)?;
        let slab_len = self.output_size(utterance_len);
        if output.len() != slab_len * batch_size {
            return Err(FeatureError::invalid_argument(format!(
                "output buffer holds {} values, batch needs {}",
                output.len(),
                slab_len * batch_size
            )));
        }

        debug!(
            "[PowerSpectrum] batch of {} utterances x {} samples -> {} values each",
            batch_size, utterance_len, slab_len
        );

        if slab_len == 0 {
            return Ok(());
        }

        let results: Vec<Result<(), FeatureError>> = output
            .par_chunks_mut(slab_len)
            .zip(signal.par_chunks(utterance_len))
            .map(|(slab, utterance)| -> Result<(), FeatureError> {
                let features = self.apply(utterance)?;
                if features.len() != slab.len() {
                    return Err(FeatureError::InternalInconsistency {
                        expected: slab.len(),
                        actual: features.len(),
                    });
                }
                slab.copy_from_slice(&features);
                Ok(())
            })
            .collect();

        for (index, result) in results.into_iter().enumerate() {
            if let Err(err) = result {
                log_feature_error(&err, &format!("batch_apply utterance {}", index));
                return Err(err);
            }
        }
        Ok(())
    }
}

/// Validate the batch shape and return the per-utterance length
fn check_batch_shape(signal_len: usize, batch_size: usize) -> Result<usize, FeatureError> {
    if batch_size == 0 {
        return Err(FeatureError::invalid_argument("batch size must be positive"));
    }
    if signal_len % batch_size != 0 {
        return Err(FeatureError::invalid_argument(format!(
            "input of {} samples is not divisible by batch size {}",
            signal_len, batch_size
        )));
    }
    Ok(signal_len / batch_size)
}
