// PreEmphasis - first-order high-pass filter y[i] = x[i] - coef * x[i-1]

use super::framing::FrameMatrix;

#[derive(Debug, Clone)]
pub struct PreEmphasis {
    coef: f32,
}

impl PreEmphasis {
    pub fn new(coef: f32) -> Self {
        Self { coef }
    }

    pub fn coef(&self) -> f32 {
        self.coef
    }

    /// Filter every frame in place
    ///
    /// The first sample of each frame is filtered against that frame's
    /// entry in `frames.history`, so overlapping frames see the same
    /// predecessor they had in the original signal. Frames are visited in
    /// signal order; within a frame samples are updated back to front so
    /// each `x[i-1]` is still unfiltered when it is read.
    pub fn apply_in_place(&self, frames: &mut FrameMatrix) {
        if self.coef == 0.0 {
            return;
        }
        let coef = self.coef;
        let history = std::mem::take(&mut frames.history);
        for (frame, &prev) in frames.frames_mut().zip(&history) {
            for i in (1..frame.len()).rev() {
                frame[i] -= coef * frame[i - 1];
            }
            frame[0] -= coef * prev;
        }
        frames.history = history;
    }
}
