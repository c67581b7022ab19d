//! Whole-buffer slice operations, parallelized over fixed-size chunks.
//!
//! The remap engine clears the destination extent before every unpack and
//! the solver clears its scratch before every solve; both walk buffers of
//! tens of megabytes, so the loops are split into `chunk_size` tasks.

use rayon::prelude::*;

/// Overwrites every element with `value`.
pub fn set_value<T: Copy + Send + Sync>(buf: &mut [T], value: T, chunk_size: usize) {
    buf.par_chunks_mut(chunk_size)
        .for_each(|chunk| chunk.fill(value));
}

/// Multiplies every element by `factor` in place.
pub fn scale(buf: &mut [f64], factor: f64, chunk_size: usize) {
    buf.par_chunks_mut(chunk_size).for_each(|chunk| {
        for v in chunk {
            *v *= factor;
        }
    });
}
