pub mod category;
pub mod path_generator;
pub mod conflict_detector;
pub mod planner;

pub use category::category_for_extension;
pub use path_generator::PathGenerator;
pub use conflict_detector::ConflictDetector;
pub use planner::MigrationPlanner;
