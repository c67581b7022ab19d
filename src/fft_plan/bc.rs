use crate::error::{Result, SolverError};

/// Boundary condition on one side of one direction.
///
/// The numeric values are the wire encoding; the sum of the two sides of a
/// direction selects the transform family and its processing priority.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum BoundaryType {
    /// Even symmetry (zero flux).
    Even = 0,
    /// Odd symmetry (zero value).
    Odd = 1,
    /// Periodic.
    Per = 3,
    /// Unbounded (free space).
    Unb = 4,
}

/// Transform family of one direction, from the sum of its two boundary
/// codes. The associated value is the processing priority: real-to-real
/// first (sizes unchanged), then padded real-to-real, then the DFT
/// directions, then padded DFT, so that intermediate buffers grow as late
/// as possible.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlanCategory {
    /// Two symmetry conditions: DCT / DST.
    SymSym = 2,
    /// Unbounded on one side, symmetry on the other: zero-pad to twice the
    /// size and apply a real-to-real transform.
    MixUnb = 5,
    /// Periodic: real-to-complex DFT (complex-to-complex once the data
    /// already carries an imaginary part).
    PerPer = 6,
    /// Unbounded on both sides: zero-pad to twice the size and apply a
    /// real-to-complex DFT.
    UnbUnb = 8,
    /// Degenerate direction, skipped. Reserved for 2D problems.
    Empty = 18,
}

impl PlanCategory {
    /// Classifies a boundary pair. Periodic may only pair with periodic.
    pub fn from_pair(dim: usize, left: BoundaryType, right: BoundaryType) -> Result<Self> {
        use BoundaryType::*;
        if (left == Per) != (right == Per) {
            return Err(SolverError::BoundaryPair { dim, left, right });
        }
        Ok(match left as u8 + right as u8 {
            0..=2 => PlanCategory::SymSym,
            4 | 5 => PlanCategory::MixUnb,
            6 => PlanCategory::PerPer,
            8 => PlanCategory::UnbUnb,
            _ => unreachable!("per/per mismatch is rejected above"),
        })
    }
}

/// The sort key of a direction: the raw sum of its boundary codes. Sums
/// never cross category boundaries, so sorting by the sum also sorts by
/// category priority while keeping, e.g., even-even ahead of odd-odd.
pub fn bc_sum(bc: &[BoundaryType; 2]) -> usize {
    bc[0] as usize + bc[1] as usize
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use BoundaryType::*;

    #[test]
    fn category_from_pair() {
        assert_eq!(PlanCategory::from_pair(0, Even, Even).unwrap(), PlanCategory::SymSym);
        assert_eq!(PlanCategory::from_pair(0, Even, Odd).unwrap(), PlanCategory::SymSym);
        assert_eq!(PlanCategory::from_pair(0, Odd, Odd).unwrap(), PlanCategory::SymSym);
        assert_eq!(PlanCategory::from_pair(0, Unb, Even).unwrap(), PlanCategory::MixUnb);
        assert_eq!(PlanCategory::from_pair(0, Odd, Unb).unwrap(), PlanCategory::MixUnb);
        assert_eq!(PlanCategory::from_pair(0, Per, Per).unwrap(), PlanCategory::PerPer);
        assert_eq!(PlanCategory::from_pair(0, Unb, Unb).unwrap(), PlanCategory::UnbUnb);
    }

    #[test]
    fn periodic_only_pairs_with_periodic() {
        assert!(PlanCategory::from_pair(1, Per, Even).is_err());
        assert!(PlanCategory::from_pair(1, Odd, Per).is_err());
        assert!(PlanCategory::from_pair(1, Unb, Per).is_err());
    }

    #[test]
    fn priorities_are_ordered() {
        assert!((PlanCategory::SymSym as usize) < (PlanCategory::MixUnb as usize));
        assert!((PlanCategory::MixUnb as usize) < (PlanCategory::PerPer as usize));
        assert!((PlanCategory::PerPer as usize) < (PlanCategory::UnbUnb as usize));
        assert!((PlanCategory::UnbUnb as usize) < (PlanCategory::Empty as usize));
    }
}
