use std::path::PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Copy,
    Move,
    Skip,
}

/// 計画された1操作。返却後は不変で、衝突解決は新しい値を生成する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationOperation {
    pub operation_id: Uuid,
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub operation_type: OperationType,
    pub size_bytes: u64,
    pub has_conflict: bool,
    pub conflict_description: Option<String>,
    pub applied_rule: Option<String>,
}

impl MigrationOperation {
    pub fn new(
        source_path: PathBuf,
        target_path: PathBuf,
        operation_type: OperationType,
        size_bytes: u64,
    ) -> Self {
        Self {
            operation_id: Uuid::new_v4(),
            source_path,
            target_path,
            operation_type,
            size_bytes,
            has_conflict: false,
            conflict_description: None,
            applied_rule: None,
        }
    }

    pub fn with_applied_rule(mut self, rule_name: &str) -> Self {
        self.applied_rule = Some(rule_name.to_string());
        self
    }

    /// 衝突フラグを立てた新しい操作を返す
    pub fn flagged(&self, description: &str) -> Self {
        let mut op = self.clone();
        op.has_conflict = true;
        op.conflict_description = Some(description.to_string());
        op
    }

    /// 移動先を差し替え、衝突を解消した新しい操作を返す
    pub fn retargeted(&self, target_path: PathBuf) -> Self {
        let mut op = self.clone();
        op.target_path = target_path;
        op.has_conflict = false;
        op.conflict_description = None;
        op
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictType {
    PathExists,
    PathTooLong,
    InvalidPath,
    DuplicateTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConflict {
    pub path: PathBuf,
    pub conflict_type: ConflictType,
    pub description: String,
    pub source_operations: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub plan_id: Uuid,
    pub scan_id: Uuid,
    pub operations: Vec<MigrationOperation>,
    pub total_size_bytes: u64,
    pub conflict_count: usize,
    pub conflicts: Vec<PathConflict>,
    pub is_valid: bool,
    pub validation_errors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl MigrationPlan {
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    pub fn conflicted_operations(&self) -> impl Iterator<Item = &MigrationOperation> {
        self.operations.iter().filter(|op| op.has_conflict)
    }
}

/// validate_path の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl PathValidation {
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self { is_valid: false, errors }
    }
}
