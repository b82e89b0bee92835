//! Raw screen to canonical grayscale frame

use ndarray::{Array2, ArrayView3, Axis};

use crate::{AgentError, Frame, FrameSize, Result};

/// Converts raw screens into canonical frames
pub trait Perception: Send + Sync {
    /// `raw` is `(height, width, channels)`
    fn to_canonical_gray(&self, raw: ArrayView3<'_, u8>) -> Result<Frame>;
}

/// Nearest-neighbour resize followed by ITU-R BT.601 luma conversion.
///
/// Accepts single-channel, RGB and RGBA screens; alpha is ignored.
#[derive(Debug, Clone)]
pub struct GrayscaleResize {
    size: FrameSize,
}

impl GrayscaleResize {
    /// Create a transform producing frames of `size`
    #[must_use]
    pub fn new(size: FrameSize) -> Self {
        Self { size }
    }

    fn luma(pixel: &[u8]) -> u8 {
        match pixel {
            [gray] => *gray,
            [r, g, b, ..] => {
                let y = 0.299 * f32::from(*r) + 0.587 * f32::from(*g) + 0.114 * f32::from(*b);
                y.round().clamp(0.0, 255.0) as u8
            }
            _ => 0,
        }
    }
}

impl Perception for GrayscaleResize {
    fn to_canonical_gray(&self, raw: ArrayView3<'_, u8>) -> Result<Frame> {
        let (rows, cols, channels) = raw.dim();
        if rows == 0 || cols == 0 {
            return Err(AgentError::Perception(format!("empty screen {rows}x{cols}")));
        }
        if !matches!(channels, 1 | 3 | 4) {
            return Err(AgentError::Perception(format!(
                "unsupported channel count {channels}"
            )));
        }

        let (out_rows, out_cols) = self.size.shape();
        let mut frame = Array2::zeros((out_rows, out_cols));
        let mut pixel = [0u8; 4];
        for ((r, c), out) in frame.indexed_iter_mut() {
            let src_r = r * rows / out_rows;
            let src_c = c * cols / out_cols;
            let lane = raw.index_axis(Axis(0), src_r);
            let lane = lane.index_axis(Axis(0), src_c);
            for (dst, src) in pixel.iter_mut().zip(lane.iter()) {
                *dst = *src;
            }
            *out = Self::luma(&pixel[..channels]);
        }
        Ok(frame)
    }
}
