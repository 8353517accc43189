#[allow(clippy::module_inception)]
pub mod planner;

pub use planner::Planner;
