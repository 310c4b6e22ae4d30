//! Chunked render protocol
//!
//! Scripting hosts render long takes by handing the facade a caller-owned
//! buffer that holds a whole number of engine blocks per channel, laid out
//! channel-major (all of the left channel, then all of the right). The
//! facade validates the buffer's element size, dimensionality and shape
//! before any rendering starts, then fills it one engine block at a time;
//! a validation failure never leaves the buffer partially written.

use std::mem;

use bytemuck::Pod;

use crate::error::{SynthError, SynthResult};
use crate::synth::Synth;
use crate::types::{Sample, BLOCK_SIZE, N_OUTPUT_CHANNELS};

/// Size of one sample, the only element size the render walk accepts
pub const SAMPLE_BYTES: usize = mem::size_of::<Sample>();

/// A caller-owned render target
///
/// Mirrors the loosely typed arrays scripting hosts hand across the
/// boundary: raw sample words plus a declared element size and an explicit
/// shape vector. Nothing is validated at construction; the whole
/// precondition ladder runs inside [`Synth::process_multi_block`], so a
/// malformed buffer fails there with a descriptive error instead of here.
#[derive(Debug, Clone)]
pub struct RenderBuffer {
    /// Payload, carried as f32 words regardless of the declared element
    /// size; a non-f32 element size is rejected before any sample access
    data: Vec<Sample>,
    elem_size: usize,
    shape: Vec<usize>,
}

impl RenderBuffer {
    /// Zero-initialized buffer holding `block_capacity` blocks per channel,
    /// shaped `(2, block_capacity * BLOCK_SIZE)`. Pure allocation, no
    /// engine interaction.
    pub fn zeroed_blocks(block_capacity: usize) -> Self {
        let frames = block_capacity * BLOCK_SIZE;
        Self {
            data: vec![0.0; N_OUTPUT_CHANNELS * frames],
            elem_size: SAMPLE_BYTES,
            shape: vec![N_OUTPUT_CHANNELS, frames],
        }
    }

    /// Wrap host-provided elements with an explicit shape, recording the
    /// element size for later validation
    pub fn from_slice<T: Pod>(elements: &[T], shape: &[usize]) -> Self {
        let bytes: &[u8] = bytemuck::cast_slice(elements);
        let mut data = vec![0.0; bytes.len().div_ceil(SAMPLE_BYTES)];
        bytemuck::cast_slice_mut::<Sample, u8>(&mut data)[..bytes.len()].copy_from_slice(bytes);
        Self {
            data,
            elem_size: mem::size_of::<T>(),
            shape: shape.to_vec(),
        }
    }

    /// Declared element size in bytes
    pub fn elem_size(&self) -> usize {
        self.elem_size
    }

    /// Declared shape (dimension sizes)
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// All samples, channel-major
    pub fn samples(&self) -> &[Sample] {
        &self.data
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.data
    }

    /// One channel of a validated 2-dimensional buffer
    ///
    /// Panics on a buffer whose shape has not passed validation; intended
    /// for reading results back out of a buffer the render walk accepted.
    pub fn channel(&self, channel: usize) -> &[Sample] {
        assert_eq!(self.shape.len(), 2, "channel() needs a 2-dimensional buffer");
        let frames = self.shape[1];
        &self.data[channel * frames..(channel + 1) * frames]
    }
}

impl Synth {
    /// Allocate a zeroed buffer able to hold `block_capacity` blocks of
    /// rendering per channel. Convenience only; any buffer that passes
    /// validation works.
    pub fn create_buffer(&self, block_capacity: usize) -> RenderBuffer {
        RenderBuffer::zeroed_blocks(block_capacity)
    }

    /// Render into `buffer` one engine block at a time.
    ///
    /// Starts writing at block `start_block` (default 0) and renders
    /// `n_blocks` blocks, or through the end of the buffer when `n_blocks`
    /// is `None`. Preconditions, first failure wins:
    ///
    /// 1. elements are f32-sized, else `InvalidShape`;
    /// 2. the buffer is exactly 2-dimensional, else `InvalidShape`;
    /// 3. it is shaped `(2, m * BLOCK_SIZE)`, else `InvalidShape`;
    /// 4. `start_block` lies inside the buffer, else `OutOfRange`;
    /// 5. the requested window fits, else `OutOfRange`.
    ///
    /// All validation completes before the first render call, so an error
    /// never leaves the buffer partially written. Rendering itself runs
    /// synchronously on the calling thread and cannot fail.
    pub fn process_multi_block(
        &mut self,
        buffer: &mut RenderBuffer,
        start_block: usize,
        n_blocks: Option<usize>,
    ) -> SynthResult<()> {
        if buffer.elem_size() != SAMPLE_BYTES {
            return Err(SynthError::InvalidShape {
                reason: format!(
                    "buffer must hold f32 samples ({SAMPLE_BYTES} bytes each); \
                     element size is {} bytes",
                    buffer.elem_size()
                ),
            });
        }
        if buffer.shape().len() != 2 {
            return Err(SynthError::InvalidShape {
                reason: format!(
                    "buffer must have 2 dimensions (2, m*{BLOCK_SIZE}); it has {}",
                    buffer.shape().len()
                ),
            });
        }
        let channels = buffer.shape()[0];
        let frames = buffer.shape()[1];
        if channels != N_OUTPUT_CHANNELS || frames % BLOCK_SIZE != 0 {
            return Err(SynthError::InvalidShape {
                reason: format!(
                    "buffer must be shaped (2, m*{BLOCK_SIZE}); it is ({channels}, {frames})"
                ),
            });
        }
        if buffer.samples().len() != channels * frames {
            return Err(SynthError::InvalidShape {
                reason: format!(
                    "buffer holds {} samples but its shape ({channels}, {frames}) needs {}",
                    buffer.samples().len(),
                    channels * frames
                ),
            });
        }

        let max_blocks = frames / BLOCK_SIZE;
        if start_block >= max_blocks {
            return Err(SynthError::OutOfRange {
                reason: format!(
                    "start block {start_block} is beyond the end of a buffer with \
                     {max_blocks} blocks"
                ),
            });
        }
        let iterations = n_blocks.unwrap_or(max_blocks - start_block);
        if start_block + iterations > max_blocks {
            return Err(SynthError::OutOfRange {
                reason: format!(
                    "start block {start_block} plus {iterations} blocks is beyond the end \
                     of a buffer with {max_blocks} blocks"
                ),
            });
        }

        let data = buffer.samples_mut();
        for i in 0..iterations {
            self.engine_mut().process_block();
            let out = self.engine_mut().output_block();
            let base = (start_block + i) * BLOCK_SIZE;
            for channel in 0..N_OUTPUT_CHANNELS {
                let offset = channel * frames + base;
                data[offset..offset + BLOCK_SIZE].copy_from_slice(&out[channel]);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::ScriptedEngine;

    fn synth() -> Synth {
        Synth::new(Box::new(ScriptedEngine::new()), 48000.0)
    }

    #[test]
    fn test_create_buffer_is_zeroed_and_shaped() {
        let s = synth();
        let buf = s.create_buffer(3);
        assert_eq!(buf.shape(), &[2, 3 * BLOCK_SIZE]);
        assert_eq!(buf.elem_size(), SAMPLE_BYTES);
        assert!(buf.samples().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rejects_non_f32_elements() {
        let mut s = synth();
        let doubles = vec![0.0f64; 2 * BLOCK_SIZE];
        let mut buf = RenderBuffer::from_slice(&doubles, &[2, BLOCK_SIZE]);
        let err = s.process_multi_block(&mut buf, 0, None).unwrap_err();
        assert!(matches!(err, SynthError::InvalidShape { .. }));
        assert!(err.to_string().contains("8 bytes"));
    }

    #[test]
    fn test_rejects_wrong_dimensionality() {
        let mut s = synth();
        let samples = vec![0.0f32; 2 * BLOCK_SIZE];
        let mut buf = RenderBuffer::from_slice(&samples, &[2, BLOCK_SIZE, 1]);
        let err = s.process_multi_block(&mut buf, 0, None).unwrap_err();
        assert!(matches!(err, SynthError::InvalidShape { .. }));
        assert!(err.to_string().contains("3"));
    }

    #[test]
    fn test_rejects_bad_shape() {
        let mut s = synth();

        // Wrong channel count
        let samples = vec![0.0f32; 3 * BLOCK_SIZE];
        let mut buf = RenderBuffer::from_slice(&samples, &[3, BLOCK_SIZE]);
        assert!(matches!(
            s.process_multi_block(&mut buf, 0, None),
            Err(SynthError::InvalidShape { .. })
        ));

        // Frame count not a whole number of blocks
        let samples = vec![0.0f32; 2 * (BLOCK_SIZE + 1)];
        let mut buf = RenderBuffer::from_slice(&samples, &[2, BLOCK_SIZE + 1]);
        assert!(matches!(
            s.process_multi_block(&mut buf, 0, None),
            Err(SynthError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_windows() {
        let mut s = synth();
        let mut buf = s.create_buffer(3);

        let err = s.process_multi_block(&mut buf, 3, None).unwrap_err();
        assert!(matches!(err, SynthError::OutOfRange { .. }));

        let err = s.process_multi_block(&mut buf, 0, Some(4)).unwrap_err();
        assert!(matches!(err, SynthError::OutOfRange { .. }));

        let err = s.process_multi_block(&mut buf, 2, Some(2)).unwrap_err();
        assert!(matches!(err, SynthError::OutOfRange { .. }));

        // A failed call never writes
        assert!(buf.samples().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_partial_window_touches_only_its_blocks() {
        let mut s = synth();
        let mut buf = s.create_buffer(3);

        // Render exactly one block into the middle of the buffer
        s.process_multi_block(&mut buf, 1, Some(1)).unwrap();

        let left = buf.channel(0);
        let right = buf.channel(1);

        // Block 1 carries the stub's first render (1.0 left, 1.5 right)
        assert!(left[BLOCK_SIZE..2 * BLOCK_SIZE].iter().all(|&v| v == 1.0));
        assert!(right[BLOCK_SIZE..2 * BLOCK_SIZE].iter().all(|&v| v == 1.5));

        // Blocks 0 and 2 stay untouched in both channels
        assert!(left[..BLOCK_SIZE].iter().all(|&v| v == 0.0));
        assert!(left[2 * BLOCK_SIZE..].iter().all(|&v| v == 0.0));
        assert!(right[..BLOCK_SIZE].iter().all(|&v| v == 0.0));
        assert!(right[2 * BLOCK_SIZE..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_full_render_walks_every_block_in_order() {
        let mut s = synth();
        let mut buf = s.create_buffer(3);
        s.process_multi_block(&mut buf, 0, None).unwrap();

        let left = buf.channel(0);
        let right = buf.channel(1);
        for block in 0..3 {
            let expected = (block + 1) as Sample;
            let window = block * BLOCK_SIZE..(block + 1) * BLOCK_SIZE;
            assert!(left[window.clone()].iter().all(|&v| v == expected));
            assert!(right[window].iter().all(|&v| v == expected + 0.5));
        }
    }

    #[test]
    fn test_tail_render_from_start_block() {
        let mut s = synth();
        let mut buf = s.create_buffer(3);

        // None means "through the end": blocks 1 and 2
        s.process_multi_block(&mut buf, 1, None).unwrap();

        let left = buf.channel(0);
        assert!(left[..BLOCK_SIZE].iter().all(|&v| v == 0.0));
        assert!(left[BLOCK_SIZE..2 * BLOCK_SIZE].iter().all(|&v| v == 1.0));
        assert!(left[2 * BLOCK_SIZE..].iter().all(|&v| v == 2.0));
    }
}
