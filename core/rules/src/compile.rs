use regex::RegexBuilder;
use tidydrive_types::{MappingRuleConfig, TidyDriveError};
use crate::rule::CompiledRule;

/// 基準1つ分のコンパイラ。担当外の設定には `None` を返す。
pub type CriterionCompiler =
    Box<dyn Fn(&MappingRuleConfig) -> Result<Option<CompiledRule>, TidyDriveError> + Send + Sync>;

/// バリアント登録表。新しいルール種別は `register` で追加する。
pub struct RuleFactory {
    compilers: Vec<(String, CriterionCompiler)>,
}

impl RuleFactory {
    /// 組み込みバリアント（path / extension / age）入りのファクトリ
    pub fn new() -> Self {
        let mut factory = Self { compilers: Vec::new() };

        factory.register("path_pattern", |config| {
            let Some(pattern) = &config.match_criteria.path_pattern else {
                return Ok(None);
            };
            // 大文字小文字の扱いはルール側の宣言に従う。インライン修飾子には頼らない。
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(!config.match_criteria.case_sensitive)
                .build()
                .map_err(|e| TidyDriveError::Rule {
                    rule: config.name.clone(),
                    message: format!("Invalid path pattern '{}': {}", pattern, e),
                })?;
            Ok(Some(CompiledRule::PathPattern {
                pattern: pattern.clone(),
                regex,
            }))
        });

        factory.register("extension", |config| {
            let Some(extensions) = &config.match_criteria.extensions else {
                return Ok(None);
            };
            // ドットを落として小文字に正規化
            let set = extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect();
            Ok(Some(CompiledRule::Extension { extensions: set }))
        });

        factory.register("age_window", |config| {
            let criteria = &config.match_criteria;
            if criteria.min_age_days.is_none() && criteria.max_age_days.is_none() {
                return Ok(None);
            }
            Ok(Some(CompiledRule::AgeWindow {
                min_days: criteria.min_age_days,
                max_days: criteria.max_age_days,
            }))
        });

        factory
    }

    pub fn register<F>(&mut self, variant: &str, compiler: F)
    where
        F: Fn(&MappingRuleConfig) -> Result<Option<CompiledRule>, TidyDriveError>
            + Send
            + Sync
            + 'static,
    {
        self.compilers.push((variant.to_string(), Box::new(compiler)));
    }

    /// 設定レコードを実行可能ルールにコンパイルする。
    /// 複数基準は AND の Composite に、単一基準はそのバリアント単体になる。
    pub fn compile(&self, config: &MappingRuleConfig) -> Result<CompiledRule, TidyDriveError> {
        if config.priority <= 0 {
            return Err(TidyDriveError::Rule {
                rule: config.name.clone(),
                message: format!("Priority must be positive, got {}", config.priority),
            });
        }

        if config.target_location.as_os_str().is_empty() {
            return Err(TidyDriveError::Rule {
                rule: config.name.clone(),
                message: "Target location must not be empty".to_string(),
            });
        }

        let mut children = Vec::new();
        for (_, compiler) in &self.compilers {
            if let Some(rule) = compiler(config)? {
                children.push(rule);
            }
        }

        if children.is_empty() {
            Err(TidyDriveError::Rule {
                rule: config.name.clone(),
                message: "At least one match criterion must be set".to_string(),
            })
        } else if children.len() == 1 {
            Ok(children.remove(0))
        } else {
            Ok(CompiledRule::Composite { children, require_all: true })
        }
    }
}

impl Default for RuleFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// 既定ファクトリでのコンパイル
pub fn compile_rule(config: &MappingRuleConfig) -> Result<CompiledRule, TidyDriveError> {
    RuleFactory::new().compile(config)
}
