//! Per-direction transform plans: boundary-condition analysis, sizing,
//! normalization, correction steps and execution over pencils.

mod bc;
mod plan_dim;
mod plan_flag;
mod sort;

pub use bc::*;
pub use plan_dim::*;
pub use plan_flag::*;
pub use sort::*;
