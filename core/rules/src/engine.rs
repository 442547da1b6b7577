use std::collections::HashSet;
use std::path::PathBuf;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use tidydrive_types::{ConflictPolicy, Item, MappingRuleConfig, TargetSuggestion, TidyDriveError};
use tidydrive_template::{TemplateContext, TemplateEngine};
use crate::compile::RuleFactory;
use crate::rule::CompiledRule;

/// コンパイル済みルールと、提案の組み立てに必要な設定情報の組
#[derive(Debug)]
pub struct EngineRule {
    pub name: String,
    pub priority: i32,
    pub target_location: PathBuf,
    pub naming_template: Option<String>,
    pub conflict_policy: ConflictPolicy,
    pub matcher: CompiledRule,
}

impl EngineRule {
    pub fn matches(&self, item: &Item, now: DateTime<Utc>) -> bool {
        self.matcher.matches(item, now)
    }

    /// マッチ済みアイテムに対する提案を組み立てる。評価は決して失敗しない:
    /// テンプレート展開に失敗した場合は元のファイル名に退避する。
    pub fn map(&self, item: &Item, now: DateTime<Utc>, engine: &TemplateEngine) -> TargetSuggestion {
        let target_name = match &self.naming_template {
            Some(template) => {
                let context = TemplateContext::from_item(item);
                match engine.process(template, &context) {
                    Ok(name) => name,
                    Err(e) => {
                        debug!("Template '{}' failed for rule '{}': {}", template, self.name, e);
                        item.name.clone()
                    }
                }
            }
            None => item.name.clone(),
        };

        TargetSuggestion {
            target_path: self.target_location.clone(),
            target_name,
            rule_name: self.name.clone(),
            confidence: self.matcher.confidence(),
            reasons: self.matcher.reasons(item, now),
            conflict_policy: self.conflict_policy,
        }
    }
}

/// 優先度方式のルールエンジン。
/// マッチした全ルールから数値的に最高の priority を選び、
/// 同値の場合は先に登録されたルールが勝つ（明示的な方針）。
pub struct RuleEngine {
    rules: Vec<EngineRule>,
    template_engine: TemplateEngine,
}

impl RuleEngine {
    pub fn new(configs: &[MappingRuleConfig]) -> Result<Self, TidyDriveError> {
        Self::with_factory(configs, &RuleFactory::new())
    }

    pub fn with_factory(
        configs: &[MappingRuleConfig],
        factory: &RuleFactory,
    ) -> Result<Self, TidyDriveError> {
        let mut seen_names = HashSet::new();
        let mut rules = Vec::with_capacity(configs.len());

        for config in configs {
            if !seen_names.insert(config.name.clone()) {
                return Err(TidyDriveError::Config {
                    message: format!("Duplicate rule name: '{}'", config.name),
                });
            }

            let matcher = factory.compile(config)?;
            rules.push(EngineRule {
                name: config.name.clone(),
                priority: config.priority,
                target_location: config.target_location.clone(),
                naming_template: config.naming_template.clone(),
                conflict_policy: config.conflict_policy,
                matcher,
            });
        }

        info!("Rule engine compiled {} rules", rules.len());
        Ok(Self {
            rules,
            template_engine: TemplateEngine::new(),
        })
    }

    pub fn evaluate(&self, item: &Item) -> Option<TargetSuggestion> {
        self.evaluate_at(item, Utc::now())
    }

    /// 評価時刻を注入できる版（年齢ルールの決定的なテスト用）
    pub fn evaluate_at(&self, item: &Item, now: DateTime<Utc>) -> Option<TargetSuggestion> {
        let mut best: Option<&EngineRule> = None;

        // 登録順に走査し、priority が厳密に大きいときだけ置き換える。
        // 同値なら先に登録された方が残る。
        for rule in &self.rules {
            if !rule.matches(item, now) {
                continue;
            }
            match best {
                Some(current) if rule.priority <= current.priority => {}
                _ => best = Some(rule),
            }
        }

        let selected = best?;
        debug!(
            "Item '{}' matched rule '{}' (priority {})",
            item.name, selected.name, selected.priority
        );
        Some(selected.map(item, now, &self.template_engine))
    }

    /// マッチする全ルールを優先度付きで返す（レポートツール向け）
    pub fn rules_matching(&self, item: &Item) -> Vec<(&str, i32)> {
        let now = Utc::now();
        self.rules
            .iter()
            .filter(|r| r.matches(item, now))
            .map(|r| (r.name.as_str(), r.priority))
            .collect()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
