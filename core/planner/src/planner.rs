use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;
use tidydrive_types::{
    Item, MigrationOperation, MigrationPlan, PlanConfig, TargetSuggestion, TidyDriveError,
};
use crate::conflict_detector::ConflictDetector;
use crate::path_generator::PathGenerator;

/// アイテム集合から実行可能な移行計画を組み立てるプランナ。
/// ファイルI/Oは一切行わず、操作の記述だけを返す。
pub struct MigrationPlanner {
    generator: PathGenerator,
    detector: ConflictDetector,
}

impl MigrationPlanner {
    pub fn new(config: PlanConfig) -> Result<Self, TidyDriveError> {
        Ok(Self {
            generator: PathGenerator::new(config)?,
            detector: ConflictDetector::new(),
        })
    }

    pub fn generator(&self) -> &PathGenerator {
        &self.generator
    }

    /// 全ファイルアイテムに対し1操作ずつ生成する。フォルダは対象外。
    pub fn create_plan(
        &self,
        scan_id: Uuid,
        items: &[Item],
    ) -> Result<MigrationPlan, TidyDriveError> {
        info!("Creating migration plan for {} items", items.len());

        let mut operations = Vec::new();
        for item in items.iter().filter(|i| i.is_file()) {
            let target = self.generator.generate_target_path(item)?;
            operations.push(MigrationOperation::new(
                item.path.clone(),
                target,
                self.generator.config().default_operation_type,
                item.size,
            ));
        }

        Ok(self.finalize(scan_id, operations))
    }

    /// ルールエンジンで事前分類済みのアイテムから計画を作る。
    /// 提案があればその移動先と適用ルール名を使い、無ければ既定の生成に退避する。
    pub fn create_plan_with_suggestions(
        &self,
        scan_id: Uuid,
        classified: &[(Item, Option<TargetSuggestion>)],
    ) -> Result<MigrationPlan, TidyDriveError> {
        let mut operations = Vec::new();
        for (item, suggestion) in classified.iter().filter(|(i, _)| i.is_file()) {
            let operation = match suggestion {
                Some(s) => MigrationOperation::new(
                    item.path.clone(),
                    s.target_path.join(&s.target_name),
                    self.generator.config().default_operation_type,
                    item.size,
                )
                .with_applied_rule(&s.rule_name),
                None => MigrationOperation::new(
                    item.path.clone(),
                    self.generator.generate_target_path(item)?,
                    self.generator.config().default_operation_type,
                    item.size,
                ),
            };
            operations.push(operation);
        }

        Ok(self.finalize(scan_id, operations))
    }

    /// 衝突した各操作に一意なパスを割り当て直し、再検証した新しい計画を返す。
    /// 元の計画は変更しない。
    pub fn optimize_plan(&self, plan: &MigrationPlan) -> Result<MigrationPlan, TidyDriveError> {
        info!(
            "Optimizing plan {} with {} conflicts",
            plan.plan_id, plan.conflict_count
        );

        let mut used: HashSet<PathBuf> = plan
            .operations
            .iter()
            .filter(|op| !op.has_conflict)
            .map(|op| op.target_path.clone())
            .collect();

        let mut resolved = Vec::with_capacity(plan.operations.len());
        for operation in &plan.operations {
            if operation.has_conflict {
                let unique = self
                    .generator
                    .generate_unique_path(&operation.target_path, &used)?;
                used.insert(unique.clone());
                resolved.push(operation.retargeted(unique));
            } else {
                resolved.push(operation.clone());
            }
        }

        let mut optimized = self.finalize(plan.scan_id, resolved);
        optimized.plan_id = plan.plan_id;
        Ok(optimized)
    }

    /// 衝突検出と集計を通して計画値を組み立てる
    fn finalize(&self, scan_id: Uuid, operations: Vec<MigrationOperation>) -> MigrationPlan {
        let conflicts = if self.generator.config().detect_conflicts {
            self.detector.detect(&operations, &self.generator)
        } else {
            Vec::new()
        };

        // 操作ID → 衝突説明。最初に見つかった説明を採用する。
        let mut descriptions: HashMap<Uuid, &str> = HashMap::new();
        for conflict in &conflicts {
            for op_id in &conflict.source_operations {
                descriptions.entry(*op_id).or_insert(&conflict.description);
            }
        }

        let operations: Vec<MigrationOperation> = operations
            .into_iter()
            .map(|op| match descriptions.get(&op.operation_id) {
                Some(description) => op.flagged(description),
                None => op,
            })
            .collect();

        let total_size_bytes = operations.iter().map(|op| op.size_bytes).sum();
        let validation_errors: Vec<String> = conflicts
            .iter()
            .map(|c| format!("{}: {}", c.path.display(), c.description))
            .collect();

        debug!(
            "Plan finalized: {} operations, {} conflicts",
            operations.len(),
            conflicts.len()
        );

        MigrationPlan {
            plan_id: Uuid::new_v4(),
            scan_id,
            total_size_bytes,
            conflict_count: conflicts.len(),
            is_valid: conflicts.is_empty(),
            conflicts,
            operations,
            validation_errors,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tidydrive_types::{ConflictPolicy, ItemType, OperationType};

    fn dated_item(path: &str, name: &str, size: u64) -> Item {
        let modified = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        Item::new(PathBuf::from(path), name.to_string(), ItemType::File, size)
            .with_timestamps(modified, modified)
    }

    fn planner() -> MigrationPlanner {
        MigrationPlanner::new(PlanConfig::new(PathBuf::from("/archive"))).unwrap()
    }

    #[test]
    fn test_create_plan_basic() {
        let items = vec![
            dated_item("/scan/a.pdf", "a.pdf", 100),
            dated_item("/scan/b.pdf", "b.pdf", 200),
        ];

        let plan = planner().create_plan(Uuid::new_v4(), &items).unwrap();

        assert_eq!(plan.operation_count(), 2);
        assert_eq!(plan.total_size_bytes, 300);
        assert!(plan.is_valid);
        assert_eq!(plan.conflict_count, 0);
        assert_eq!(
            plan.operations[0].target_path,
            PathBuf::from("/archive/2025/03/a.pdf")
        );
        assert_eq!(plan.operations[0].operation_type, OperationType::Move);
    }

    #[test]
    fn test_folders_are_excluded() {
        let mut folder = dated_item("/scan/dir", "dir", 0);
        folder.item_type = ItemType::Folder;
        let items = vec![folder, dated_item("/scan/a.pdf", "a.pdf", 100)];

        let plan = planner().create_plan(Uuid::new_v4(), &items).unwrap();
        assert_eq!(plan.operation_count(), 1);
    }

    #[test]
    fn test_duplicate_targets_flag_both_operations() {
        // 異なるディレクトリの同名ファイル、同じ更新月 → 同一移動先
        let items = vec![
            dated_item("/scan/x/report.pdf", "report.pdf", 100),
            dated_item("/scan/y/report.pdf", "report.pdf", 150),
        ];

        let plan = planner().create_plan(Uuid::new_v4(), &items).unwrap();

        assert!(!plan.is_valid);
        assert_eq!(plan.conflict_count, 1);
        assert!(plan.operations.iter().all(|op| op.has_conflict));
        assert!(!plan.validation_errors.is_empty());
    }

    #[test]
    fn test_optimize_plan_resolves_all_conflicts() {
        let items = vec![
            dated_item("/scan/x/report.pdf", "report.pdf", 100),
            dated_item("/scan/y/report.pdf", "report.pdf", 150),
            dated_item("/scan/z/report.pdf", "report.pdf", 200),
        ];

        let planner = planner();
        let plan = planner.create_plan(Uuid::new_v4(), &items).unwrap();
        assert!(!plan.is_valid);

        let optimized = planner.optimize_plan(&plan).unwrap();

        assert_eq!(optimized.conflict_count, 0);
        assert!(optimized.is_valid);
        assert!(optimized.operations.iter().all(|op| !op.has_conflict));

        // 結果の移動先は互いに異なる
        let targets: HashSet<_> = optimized
            .operations
            .iter()
            .map(|op| op.target_path.clone())
            .collect();
        assert_eq!(targets.len(), optimized.operations.len());

        // 操作IDは元の計画から引き継がれる
        let original_ids: HashSet<_> =
            plan.operations.iter().map(|op| op.operation_id).collect();
        let optimized_ids: HashSet<_> =
            optimized.operations.iter().map(|op| op.operation_id).collect();
        assert_eq!(original_ids, optimized_ids);
    }

    #[test]
    fn test_optimize_valid_plan_keeps_targets() {
        let items = vec![
            dated_item("/scan/a.pdf", "a.pdf", 100),
            dated_item("/scan/b.pdf", "b.pdf", 200),
        ];

        let planner = planner();
        let plan = planner.create_plan(Uuid::new_v4(), &items).unwrap();
        let optimized = planner.optimize_plan(&plan).unwrap();

        let before: Vec<_> = plan.operations.iter().map(|op| &op.target_path).collect();
        let after: Vec<_> = optimized.operations.iter().map(|op| &op.target_path).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_conflict_detection_can_be_disabled() {
        let config = PlanConfig {
            detect_conflicts: false,
            ..PlanConfig::new(PathBuf::from("/archive"))
        };
        let planner = MigrationPlanner::new(config).unwrap();

        let items = vec![
            dated_item("/scan/x/report.pdf", "report.pdf", 100),
            dated_item("/scan/y/report.pdf", "report.pdf", 150),
        ];

        let plan = planner.create_plan(Uuid::new_v4(), &items).unwrap();
        assert!(plan.is_valid);
        assert_eq!(plan.conflict_count, 0);
    }

    #[test]
    fn test_plan_with_suggestions_records_applied_rule() {
        let suggestion = TargetSuggestion {
            target_path: PathBuf::from("/archive/docs"),
            target_name: "invoice.pdf".to_string(),
            rule_name: "documents".to_string(),
            confidence: 0.90,
            reasons: vec!["Matched extension: .pdf".to_string()],
            conflict_policy: ConflictPolicy::VersionSuffix,
        };

        let classified = vec![
            (dated_item("/scan/invoice.pdf", "invoice.pdf", 100), Some(suggestion)),
            (dated_item("/scan/other.pdf", "other.pdf", 50), None),
        ];

        let plan = planner()
            .create_plan_with_suggestions(Uuid::new_v4(), &classified)
            .unwrap();

        assert_eq!(plan.operation_count(), 2);
        assert_eq!(
            plan.operations[0].target_path,
            PathBuf::from("/archive/docs/invoice.pdf")
        );
        assert_eq!(plan.operations[0].applied_rule.as_deref(), Some("documents"));

        // 提案が無いアイテムは既定のテンプレートで生成される
        assert_eq!(
            plan.operations[1].target_path,
            PathBuf::from("/archive/2025/03/other.pdf")
        );
        assert!(plan.operations[1].applied_rule.is_none());
    }

    #[test]
    fn test_scan_id_and_plan_id_are_stable_through_optimize() {
        let items = vec![dated_item("/scan/a.pdf", "a.pdf", 100)];
        let planner = planner();
        let scan_id = Uuid::new_v4();

        let plan = planner.create_plan(scan_id, &items).unwrap();
        let optimized = planner.optimize_plan(&plan).unwrap();

        assert_eq!(plan.scan_id, scan_id);
        assert_eq!(optimized.scan_id, scan_id);
        assert_eq!(optimized.plan_id, plan.plan_id);
    }
}
