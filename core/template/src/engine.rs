use std::collections::HashMap;
use chrono::{DateTime, Utc};
use tracing::debug;
use tidydrive_types::{Item, ItemType, TidyDriveError};
use crate::functions::FunctionRegistry;
use crate::parser::{parse, TemplateSegment};

/// 1アイテム分の変数解決コンテキスト
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub name: String,
    pub extension: String,
    pub item_type: String,
    pub provider: String,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    pub counter: u64,
    pub custom: HashMap<String, String>,
}

impl TemplateContext {
    pub fn new(name: &str, extension: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            extension: extension.to_string(),
            item_type: "File".to_string(),
            provider: String::new(),
            category: String::new(),
            timestamp,
            counter: 1,
            custom: HashMap::new(),
        }
    }

    /// アイテムからコンテキストを組み立てる。名前は拡張子を除いた部分。
    pub fn from_item(item: &Item) -> Self {
        let stem = item
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&item.name)
            .to_string();

        Self {
            name: stem,
            extension: item.extension(),
            item_type: match item.item_type {
                ItemType::File => "File".to_string(),
                ItemType::Folder => "Folder".to_string(),
            },
            provider: item.provider.clone(),
            category: String::new(),
            timestamp: item.modified_at,
            counter: 1,
            custom: HashMap::new(),
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn with_counter(mut self, counter: u64) -> Self {
        self.counter = counter;
        self
    }

    pub fn with_custom(mut self, key: &str, value: &str) -> Self {
        self.custom.insert(key.to_lowercase(), value.to_string());
        self
    }
}

/// テンプレート文字列をコンテキストに対して評価するエンジン。
/// 未知の変数は空文字に、未知の関数と関数の失敗は素通しになる。
pub struct TemplateEngine {
    registry: FunctionRegistry,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self { registry: FunctionRegistry::new() }
    }

    pub fn with_registry(registry: FunctionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    pub fn process(
        &self,
        template: &str,
        context: &TemplateContext,
    ) -> Result<String, TidyDriveError> {
        let segments = parse(template)?;
        let mut output = String::new();

        for segment in &segments {
            match segment {
                TemplateSegment::Literal(text) => output.push_str(text),
                TemplateSegment::Variable { name, format, function, args } => {
                    let mut value = self.resolve(name, format.as_deref(), context);

                    if let Some(func_name) = function {
                        value = match self.registry.apply(func_name, &value, args) {
                            Some(Ok(transformed)) => transformed,
                            Some(Err(e)) => {
                                // 関数の失敗はエンジン境界を越えない
                                debug!("Template function '{}' failed: {}", func_name, e);
                                value
                            }
                            None => {
                                debug!("Unknown template function '{}', passing through", func_name);
                                value
                            }
                        };
                    }

                    output.push_str(&value);
                }
            }
        }

        Ok(output)
    }

    /// テンプレートが参照する変数名を重複なしで返す（検証ツール向け）
    pub fn get_variables(&self, template: &str) -> Result<Vec<String>, TidyDriveError> {
        let segments = parse(template)?;
        let mut seen = Vec::new();
        let mut names = Vec::new();

        for segment in segments {
            if let TemplateSegment::Variable { name, .. } = segment {
                let key = name.to_lowercase();
                if !seen.contains(&key) {
                    seen.push(key);
                    names.push(name);
                }
            }
        }

        Ok(names)
    }

    fn resolve(&self, name: &str, format: Option<&str>, context: &TemplateContext) -> String {
        match name.to_lowercase().as_str() {
            "name" => context.name.clone(),
            "extension" => context.extension.clone(),
            "type" => context.item_type.clone(),
            "provider" => context.provider.clone(),
            "category" => context.category.clone(),
            "year" => self.format_date(context, format, "%Y"),
            "month" => self.format_date(context, format, "%m"),
            "day" => self.format_date(context, format, "%d"),
            "date" => self.format_date(context, format, "%Y-%m-%d"),
            "datetime" => self.format_date(context, format, "%Y-%m-%d_%H-%M-%S"),
            "time" => self.format_date(context, format, "%H-%M-%S"),
            "counter" => format_counter(context.counter, format),
            other => match context.custom.get(other) {
                Some(value) => value.clone(),
                None => {
                    debug!("Unknown template variable '{}', resolving to empty", name);
                    String::new()
                }
            },
        }
    }

    fn format_date(&self, context: &TemplateContext, format: Option<&str>, default: &str) -> String {
        context.timestamp.format(format.unwrap_or(default)).to_string()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// COUNTER の書式: `0` の並びはその幅へゼロ詰め、それ以外は無視
fn format_counter(counter: u64, format: Option<&str>) -> String {
    match format {
        Some(f) if !f.is_empty() && f.chars().all(|c| c == '0') => {
            format!("{:0width$}", counter, width = f.len())
        }
        _ => counter.to_string(),
    }
}
