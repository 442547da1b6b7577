use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// 名前衝突時の解決方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictPolicy {
    VersionSuffix,
    TimestampSuffix,
    Overwrite,
    Skip,
}

/// ルールのマッチ条件。少なくとも1つは設定されていること。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MatchCriteria {
    pub path_pattern: Option<String>,
    pub case_sensitive: bool,
    pub extensions: Option<Vec<String>>,
    pub min_age_days: Option<i64>,
    pub max_age_days: Option<i64>,
}

impl MatchCriteria {
    pub fn is_empty(&self) -> bool {
        self.path_pattern.is_none()
            && self.extensions.is_none()
            && self.min_age_days.is_none()
            && self.max_age_days.is_none()
    }
}

/// ユーザー定義の振り分けルール（設定レコード）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRuleConfig {
    pub name: String,
    pub priority: i32,
    pub match_criteria: MatchCriteria,
    pub target_location: PathBuf,
    pub naming_template: Option<String>,
    pub conflict_policy: ConflictPolicy,
}

impl MappingRuleConfig {
    pub fn new(name: &str, priority: i32, target_location: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            priority,
            match_criteria: MatchCriteria::default(),
            target_location,
            naming_template: None,
            conflict_policy: ConflictPolicy::VersionSuffix,
        }
    }

    pub fn with_path_pattern(mut self, pattern: &str) -> Self {
        self.match_criteria.path_pattern = Some(pattern.to_string());
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.match_criteria.case_sensitive = true;
        self
    }

    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.match_criteria.extensions =
            Some(extensions.iter().map(|e| e.to_string()).collect());
        self
    }

    pub fn with_age_window(mut self, min_days: Option<i64>, max_days: Option<i64>) -> Self {
        self.match_criteria.min_age_days = min_days;
        self.match_criteria.max_age_days = max_days;
        self
    }

    pub fn with_template(mut self, template: &str) -> Self {
        self.naming_template = Some(template.to_string());
        self
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }
}

/// ルール評価の結果: 1アイテムに対する移動先の提案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSuggestion {
    pub target_path: PathBuf,
    pub target_name: String,
    pub rule_name: String,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub conflict_policy: ConflictPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_criteria_detection() {
        let config = MappingRuleConfig::new("docs", 10, PathBuf::from("/archive/docs"));
        assert!(config.match_criteria.is_empty());

        let config = config.with_extensions(&["pdf"]);
        assert!(!config.match_criteria.is_empty());
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = MappingRuleConfig::new("old-reports", 20, PathBuf::from("/archive/reports"))
            .with_path_pattern(r"report_\d{4}")
            .with_age_window(Some(30), Some(365))
            .with_template("{Year}/{Name}.{Extension}")
            .with_policy(ConflictPolicy::TimestampSuffix);

        let json = serde_json::to_string(&config).unwrap();
        let back: MappingRuleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_unknown_conflict_policy_rejected() {
        let result = serde_json::from_str::<ConflictPolicy>("\"RenameRandomly\"");
        assert!(result.is_err());
    }
}
