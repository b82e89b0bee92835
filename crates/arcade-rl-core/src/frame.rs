//! Grayscale frames and the rolling frame stack

use ndarray::{s, Array2, Array3, ArrayView2, Axis};

use crate::{AgentError, FrameSize, Result};

/// One canonical grayscale observation, shaped `(height, width)`
pub type Frame = Array2<u8>;

/// Fixed-depth stack of the most recent frames.
///
/// Frames live in a ring of `depth` slots; a push overwrites the oldest slot
/// and advances the head, so the stack never reallocates. Slot order is only
/// meaningful through [`FrameBuffer::frame`], which indexes chronologically
/// (0 = oldest).
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    /// Ring storage, shaped `(depth, height, width)`
    slots: Array3<u8>,
    /// Slot holding the oldest frame
    head: usize,
    size: FrameSize,
}

impl FrameBuffer {
    /// Create a zero-filled stack of `depth` frames
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    #[must_use]
    pub fn new(depth: usize, size: FrameSize) -> Self {
        assert!(depth > 0, "frame stack depth must be at least 1");
        Self {
            slots: Array3::zeros((depth, size.height, size.width)),
            head: 0,
            size,
        }
    }

    /// Number of frames in the stack (always the configured depth)
    #[must_use]
    pub fn depth(&self) -> usize {
        self.slots.len_of(Axis(0))
    }

    /// Frame size
    #[must_use]
    pub fn frame_size(&self) -> FrameSize {
        self.size
    }

    /// Shift a new frame in, dropping the oldest
    pub fn push(&mut self, frame: ArrayView2<'_, u8>) -> Result<()> {
        self.check_shape(&frame)?;
        self.slots.index_axis_mut(Axis(0), self.head).assign(&frame);
        self.head = (self.head + 1) % self.depth();
        Ok(())
    }

    /// Zero every frame
    pub fn reset(&mut self) {
        self.slots.fill(0);
        self.head = 0;
    }

    /// Frame at chronological position `index` (0 = oldest)
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<ArrayView2<'_, u8>> {
        if index >= self.depth() {
            return None;
        }
        let slot = (self.head + index) % self.depth();
        Some(self.slots.index_axis(Axis(0), slot))
    }

    /// Most recently pushed frame
    #[must_use]
    pub fn latest(&self) -> ArrayView2<'_, u8> {
        let slot = (self.head + self.depth() - 1) % self.depth();
        self.slots.index_axis(Axis(0), slot)
    }

    /// Iterate frames from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = ArrayView2<'_, u8>> + '_ {
        (0..self.depth()).filter_map(move |i| self.frame(i))
    }

    /// Whether every pixel of every frame is zero
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.slots.iter().all(|&p| p == 0)
    }

    /// Stack as the estimator consumes it: `(height, width, depth)`, channel 0 oldest
    #[must_use]
    pub fn stacked(&self) -> Array3<u8> {
        let mut out = Array3::zeros((self.size.height, self.size.width, self.depth()));
        for (channel, frame) in self.iter().enumerate() {
            out.slice_mut(s![.., .., channel]).assign(&frame);
        }
        out
    }

    /// The stack as it would be after pushing `next`, without mutating
    pub fn stacked_with(&self, next: ArrayView2<'_, u8>) -> Result<Array3<u8>> {
        self.check_shape(&next)?;
        let depth = self.depth();
        let mut out = Array3::zeros((self.size.height, self.size.width, depth));
        for (channel, frame) in self.iter().skip(1).enumerate() {
            out.slice_mut(s![.., .., channel]).assign(&frame);
        }
        out.slice_mut(s![.., .., depth - 1]).assign(&next);
        Ok(out)
    }

    fn check_shape(&self, frame: &ArrayView2<'_, u8>) -> Result<()> {
        let (rows, cols) = frame.dim();
        if (rows, cols) != self.size.shape() {
            return Err(AgentError::DimensionMismatch {
                expected: self.size.pixels(),
                actual: rows * cols,
            });
        }
        Ok(())
    }
}

/// An all-zero frame of the given size
#[must_use]
pub fn blank_frame(size: FrameSize) -> Frame {
    Array2::zeros(size.shape())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filled(size: FrameSize, value: u8) -> Frame {
        Array2::from_elem(size.shape(), value)
    }

    #[test]
    fn test_new_stack_is_blank() {
        let buffer = FrameBuffer::new(4, FrameSize::new(3, 2));
        assert_eq!(buffer.depth(), 4);
        assert!(buffer.is_blank());
        assert_eq!(buffer.stacked().dim(), (2, 3, 4));
    }

    #[test]
    fn test_push_keeps_last_frames_in_order() {
        let size = FrameSize::new(2, 2);
        let mut buffer = FrameBuffer::new(3, size);
        for value in 1..=5u8 {
            buffer.push(filled(size, value).view()).unwrap();
        }

        let firsts: Vec<u8> = buffer.iter().map(|f| f[[0, 0]]).collect();
        assert_eq!(firsts, vec![3, 4, 5]);
        assert_eq!(buffer.latest()[[1, 1]], 5);

        let stacked = buffer.stacked();
        assert_eq!(stacked[[0, 0, 0]], 3);
        assert_eq!(stacked[[1, 1, 2]], 5);
    }

    #[test]
    fn test_partial_fill_keeps_zero_prefix() {
        let size = FrameSize::new(2, 2);
        let mut buffer = FrameBuffer::new(4, size);
        buffer.push(filled(size, 9).view()).unwrap();

        let firsts: Vec<u8> = buffer.iter().map(|f| f[[0, 0]]).collect();
        assert_eq!(firsts, vec![0, 0, 0, 9]);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let size = FrameSize::new(2, 2);
        let mut buffer = FrameBuffer::new(2, size);
        buffer.push(filled(size, 7).view()).unwrap();
        buffer.push(filled(size, 8).view()).unwrap();
        buffer.reset();

        assert!(buffer.is_blank());
        assert_eq!(buffer.depth(), 2);
    }

    #[test]
    fn test_stacked_with_does_not_mutate() {
        let size = FrameSize::new(2, 1);
        let mut buffer = FrameBuffer::new(2, size);
        buffer.push(filled(size, 1).view()).unwrap();

        let preview = buffer.stacked_with(filled(size, 2).view()).unwrap();
        assert_eq!(preview[[0, 0, 0]], 1);
        assert_eq!(preview[[0, 0, 1]], 2);
        assert_eq!(buffer.latest()[[0, 0]], 1);

        buffer.push(filled(size, 2).view()).unwrap();
        assert_eq!(buffer.stacked(), preview);
    }

    #[test]
    fn test_depth_one_stack() {
        let size = FrameSize::new(1, 1);
        let mut buffer = FrameBuffer::new(1, size);
        buffer.push(filled(size, 4).view()).unwrap();
        buffer.push(filled(size, 6).view()).unwrap();
        assert_eq!(buffer.latest()[[0, 0]], 6);
        assert_eq!(buffer.stacked_with(filled(size, 8).view()).unwrap()[[0, 0, 0]], 8);
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let mut buffer = FrameBuffer::new(2, FrameSize::new(4, 4));
        let err = buffer.push(Array2::zeros((3, 4)).view()).unwrap_err();
        assert!(matches!(
            err,
            AgentError::DimensionMismatch { expected: 16, actual: 12 }
        ));
        assert!(buffer.is_blank());
    }

    proptest! {
        #[test]
        fn prop_stack_always_holds_depth_frames(
            depth in 1usize..6,
            values in proptest::collection::vec(any::<u8>(), 0..20),
            reset_at in proptest::option::of(0usize..20),
        ) {
            let size = FrameSize::new(2, 2);
            let mut buffer = FrameBuffer::new(depth, size);
            for (i, &value) in values.iter().enumerate() {
                if reset_at == Some(i) {
                    buffer.reset();
                    prop_assert!(buffer.is_blank());
                }
                buffer.push(filled(size, value).view()).unwrap();
                prop_assert_eq!(buffer.iter().count(), depth);
                prop_assert_eq!(buffer.latest()[[0, 0]], value);
            }
            prop_assert_eq!(buffer.stacked().dim(), (2, 2, depth));

            let start = reset_at.filter(|&r| r < values.len()).unwrap_or(0);
            let since_reset = &values[start..];
            if since_reset.len() >= depth {
                let expected = &since_reset[since_reset.len() - depth..];
                let actual: Vec<u8> = buffer.iter().map(|f| f[[0, 0]]).collect();
                prop_assert_eq!(actual.as_slice(), expected);
            }
        }
    }
}
