pub mod similarity;
pub mod detector;

pub use detector::DuplicateDetector;
