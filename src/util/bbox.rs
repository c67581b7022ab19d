use crate::util::Coord3;

/// Bounds of a half-open index box, one row per dimension: `[lo, hi)`.
pub type Bounds3 = nalgebra::SMatrix<i64, 3, 2>;

/// Half-open 3D index box in global coordinates. Signed so that shifted
/// boxes may temporarily dip below zero during intersection.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct IndexBox {
    pub bounds: Bounds3,
}

impl IndexBox {
    pub fn new(lo: Coord3, hi: Coord3) -> Self {
        IndexBox {
            bounds: Bounds3::from_columns(&[lo, hi]),
        }
    }

    pub fn lo(&self) -> Coord3 {
        self.bounds.column(0).into_owned()
    }

    pub fn hi(&self) -> Coord3 {
        self.bounds.column(1).into_owned()
    }

    /// Extent per dimension, clamped at zero for empty boxes.
    pub fn extent(&self) -> Coord3 {
        let mut e = self.hi() - self.lo();
        for d in 0..3 {
            e[d] = e[d].max(0);
        }
        e
    }

    pub fn is_empty(&self) -> bool {
        let e = self.extent();
        e.iter().any(|&n| n == 0)
    }

    pub fn volume(&self) -> usize {
        let e = self.extent();
        (e[0] * e[1] * e[2]) as usize
    }

    pub fn intersection(&self, other: &IndexBox) -> IndexBox {
        let mut lo = self.lo();
        let mut hi = self.hi();
        for d in 0..3 {
            lo[d] = lo[d].max(other.bounds[(d, 0)]);
            hi[d] = hi[d].min(other.bounds[(d, 1)]);
        }
        IndexBox::new(lo, hi)
    }

    pub fn shifted(&self, shift: Coord3) -> IndexBox {
        IndexBox::new(self.lo() + shift, self.hi() + shift)
    }
}
