use std::collections::HashSet;
use chrono::{DateTime, Utc};
use regex::Regex;
use tidydrive_types::Item;

/// 実行可能ルール。バリアントごとの固定信頼度を持つタグ付き列挙で、
/// ディスパッチはパターンマッチで行う。
#[derive(Debug, Clone)]
pub enum CompiledRule {
    PathPattern { pattern: String, regex: Regex },
    Extension { extensions: HashSet<String> },
    AgeWindow { min_days: Option<i64>, max_days: Option<i64> },
    Composite { children: Vec<CompiledRule>, require_all: bool },
}

impl CompiledRule {
    pub fn matches(&self, item: &Item, now: DateTime<Utc>) -> bool {
        match self {
            Self::PathPattern { regex, .. } => {
                regex.is_match(&item.path.to_string_lossy())
            }
            Self::Extension { extensions } => {
                // 空集合は決してマッチしない
                !extensions.is_empty() && extensions.contains(&item.extension())
            }
            Self::AgeWindow { min_days, max_days } => {
                let age = age_in_days(item, now);
                min_days.map_or(true, |min| age >= min)
                    && max_days.map_or(true, |max| age <= max)
            }
            Self::Composite { children, require_all } => {
                // 空の子リスト: AND は恒真、OR は恒偽
                if *require_all {
                    children.iter().all(|c| c.matches(item, now))
                } else {
                    children.iter().any(|c| c.matches(item, now))
                }
            }
        }
    }

    /// バリアント固定の信頼度
    pub fn confidence(&self) -> f64 {
        match self {
            Self::PathPattern { .. } => 0.95,
            Self::Extension { .. } => 0.90,
            Self::AgeWindow { .. } => 0.85,
            Self::Composite { .. } => 0.88,
        }
    }

    /// マッチ理由の文字列。Composite はマッチした子の理由を子順で連結する。
    pub fn reasons(&self, item: &Item, now: DateTime<Utc>) -> Vec<String> {
        match self {
            Self::PathPattern { pattern, .. } => {
                vec![format!("Matched regex pattern: {}", pattern)]
            }
            Self::Extension { .. } => {
                vec![format!("Matched extension: .{}", item.extension())]
            }
            Self::AgeWindow { .. } => {
                vec![format!("File age: {} days", age_in_days(item, now))]
            }
            Self::Composite { children, .. } => children
                .iter()
                .filter(|c| c.matches(item, now))
                .flat_map(|c| c.reasons(item, now))
                .collect(),
        }
    }
}

fn age_in_days(item: &Item, now: DateTime<Utc>) -> i64 {
    (now - item.modified_at).num_days()
}
