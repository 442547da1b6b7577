use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::plan::OperationType;

pub const DEFAULT_NAMING_TEMPLATE: &str = "{Year}/{Month}/{Name}.{Extension}";
pub const DEFAULT_MAX_PATH_LENGTH: usize = 260;

/// 移行計画の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub target_root_path: PathBuf,
    pub default_naming_template: String,
    pub detect_conflicts: bool,
    pub max_path_length: usize,
    pub default_operation_type: OperationType,
}

impl PlanConfig {
    pub fn new(target_root_path: PathBuf) -> Self {
        Self {
            target_root_path,
            default_naming_template: DEFAULT_NAMING_TEMPLATE.to_string(),
            detect_conflicts: true,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            default_operation_type: OperationType::Move,
        }
    }

    pub fn with_template(mut self, template: &str) -> Self {
        self.default_naming_template = template.to_string();
        self
    }

    pub fn with_max_path_length(mut self, max: usize) -> Self {
        self.max_path_length = max;
        self
    }

    pub fn with_operation_type(mut self, op: OperationType) -> Self {
        self.default_operation_type = op;
        self
    }
}

/// 重複検出の設定。各戦略は個別に有効・無効を切り替えられる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub minimum_file_size: u64,
    pub use_exact_hash: bool,
    pub use_partial_hash: bool,
    pub use_name_similarity: bool,
    pub use_size_and_date: bool,
    pub name_similarity_threshold: f64,
    pub max_size_difference_percent: f64,
    pub max_date_difference_hours: f64,
    pub group_by_date: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            minimum_file_size: 1024,
            use_exact_hash: true,
            use_partial_hash: true,
            use_name_similarity: true,
            use_size_and_date: true,
            name_similarity_threshold: 0.8,
            max_size_difference_percent: 0.1,
            max_date_difference_hours: 24.0,
            group_by_date: true,
        }
    }
}
