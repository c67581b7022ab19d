use crate::fft_plan::PlanDim;

/// Orders the three directional plans by non-decreasing boundary-code sum,
/// breaking ties by the original direction index. Real-to-real directions
/// therefore run first (they keep sizes and realness), padded and complex
/// directions last, which keeps the intermediate buffers as small as
/// possible for as long as possible.
pub fn sort_plans(plans: &mut [PlanDim; 3]) {
    plans.sort_by_key(|p| (p.bc_sum(), p.dim()));
    debug_assert!(plans[0].bc_sum() <= plans[1].bc_sum());
    debug_assert!(plans[1].bc_sum() <= plans[2].bc_sum());
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::fft_plan::{BoundaryType::*, TransformSign};

    fn plans(bcs: [[crate::fft_plan::BoundaryType; 2]; 3]) -> [PlanDim; 3] {
        let h = [0.1; 3];
        let l = [1.0; 3];
        let mut out = Vec::new();
        for (dim, bc) in bcs.into_iter().enumerate() {
            out.push(PlanDim::new(dim, &h, &l, bc, TransformSign::Forward, false).unwrap());
        }
        out.try_into().map_err(|_| ()).unwrap()
    }

    #[test]
    fn mixed_configuration_orders_by_priority() {
        // unbounded-unbounded, even-odd, periodic: the symmetric direction
        // first, then the periodic one, the fully unbounded one last
        let mut p = plans([[Unb, Unb], [Even, Odd], [Per, Per]]);
        sort_plans(&mut p);
        assert_eq!([p[0].dim(), p[1].dim(), p[2].dim()], [1, 2, 0]);
        assert_eq!([p[0].bc_sum(), p[1].bc_sum(), p[2].bc_sum()], [1, 6, 8]);
    }

    #[test]
    fn ties_keep_the_direction_order() {
        let mut p = plans([[Per, Per], [Per, Per], [Per, Per]]);
        sort_plans(&mut p);
        assert_eq!([p[0].dim(), p[1].dim(), p[2].dim()], [0, 1, 2]);
    }

    #[test]
    fn even_even_precedes_odd_odd() {
        let mut p = plans([[Odd, Odd], [Even, Even], [Even, Odd]]);
        sort_plans(&mut p);
        assert_eq!([p[0].dim(), p[1].dim(), p[2].dim()], [1, 2, 0]);
    }
}
