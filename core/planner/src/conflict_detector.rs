use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;
use tidydrive_types::{ConflictType, MigrationOperation, PathConflict};
use crate::path_generator::PathGenerator;

/// 操作集合全体に対するパス衝突の検出。
/// 衝突は例外ではなくデータとして記録し、呼び出し側へ返す。
pub struct ConflictDetector;

impl ConflictDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(
        &self,
        operations: &[MigrationOperation],
        generator: &PathGenerator,
    ) -> Vec<PathConflict> {
        let mut conflicts = Vec::new();

        // 個別パスの検証
        for op in operations {
            let validation = generator.validate_path(&op.target_path);
            if validation.is_valid {
                continue;
            }
            for error in validation.errors {
                let conflict_type = if error.contains("maximum length") {
                    ConflictType::PathTooLong
                } else {
                    ConflictType::InvalidPath
                };
                conflicts.push(PathConflict {
                    path: op.target_path.clone(),
                    conflict_type,
                    description: error,
                    source_operations: vec![op.operation_id],
                });
            }
        }

        // 同一移動先の検出: 2回以上使われたパスは、その全操作が衝突になる
        let mut by_target: HashMap<&PathBuf, Vec<&MigrationOperation>> = HashMap::new();
        for op in operations {
            by_target.entry(&op.target_path).or_default().push(op);
        }

        for (path, group) in by_target {
            if group.len() < 2 {
                continue;
            }
            debug!("Duplicate target {} used by {} operations", path.display(), group.len());
            conflicts.push(PathConflict {
                path: (*path).clone(),
                conflict_type: ConflictType::DuplicateTarget,
                description: format!(
                    "Target path is used by {} operations",
                    group.len()
                ),
                source_operations: group.iter().map(|op| op.operation_id).collect(),
            });
        }

        conflicts
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}
