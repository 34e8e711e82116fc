pub mod admission_policy;
pub mod motion_heuristic;
