pub mod indexing;
pub mod special;

mod bbox;
pub use bbox::*;

/// Alignment in bytes of every buffer handed to a transform, and of the
/// start of every pencil inside such a buffer.
pub const ALIGNMENT: usize = 32;

pub type Coord3 = nalgebra::Vector3<i64>;

pub fn is_aligned<T>(ptr: *const T) -> bool {
    (ptr as usize) % ALIGNMENT == 0
}

/// Pads an element count so that `count * nf` doubles occupy a whole number
/// of `ALIGNMENT`-byte lines. `nf` is 1 for real data and 2 for interleaved
/// complex data.
pub fn pad_to_alignment(count: usize, nf: usize) -> usize {
    let bytes_per_elem = nf * std::mem::size_of::<f64>();
    debug_assert!(ALIGNMENT % bytes_per_elem == 0);
    let modulo = (count * bytes_per_elem) % ALIGNMENT;
    if modulo == 0 {
        count
    } else {
        count + (ALIGNMENT - modulo) / bytes_per_elem
    }
}

/// Reflects a global index across `symstart` on an unbounded direction and
/// returns the equivalent non-negative coordinate (in grid-spacing units).
///
/// Indices past the reflection point fold back as `|2 symstart - i|`. The
/// result is clamped away from zero so that kernel evaluations at the
/// padding cells never see a zero radius; the true origin keeps its
/// analytic limit elsewhere.
pub fn sym_coordinate(ig: i64, symstart: f64) -> f64 {
    let x = ig as f64;
    if symstart == 0.0 || x <= symstart {
        x
    } else {
        (2.0 * symstart - x).abs().max(1.0)
    }
}

/// Reflects a global index across `symstart` on a spectral direction,
/// mapping modes above the reflection point onto negative wave numbers.
pub fn sym_wavenumber(ig: i64, symstart: f64) -> f64 {
    let k = ig as f64;
    if symstart == 0.0 || k <= symstart {
        k
    } else {
        (-2.0 * symstart + k).min(-1.0)
    }
}
