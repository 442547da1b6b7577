use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use tidydrive_types::{Item, PathValidation, PlanConfig, TidyDriveError};
use tidydrive_template::{TemplateContext, TemplateEngine};
use crate::category::category_for_extension;

/// 一意パス生成の試行上限。超過は設定不良を示す致命的エラー。
const MAX_UNIQUE_ATTEMPTS: u32 = 999;

/// パスに使えない文字。`:` はドライブ区切り（2文字目）のみ許す。
const INVALID_PATH_CHARS: [char; 6] = ['<', '>', '"', '|', '?', '*'];

/// テンプレートエンジンの上に移動先パスを組み立てるジェネレータ
pub struct PathGenerator {
    config: PlanConfig,
    engine: TemplateEngine,
}

impl PathGenerator {
    pub fn new(config: PlanConfig) -> Result<Self, TidyDriveError> {
        if config.target_root_path.as_os_str().is_empty() {
            return Err(TidyDriveError::Config {
                message: "Target root path must not be empty".to_string(),
            });
        }
        Ok(Self { config, engine: TemplateEngine::new() })
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// 既定の命名テンプレートとカテゴリ表から移動先パスを生成する
    pub fn generate_target_path(&self, item: &Item) -> Result<PathBuf, TidyDriveError> {
        let context = TemplateContext::from_item(item)
            .with_category(category_for_extension(&item.extension()));
        let relative = self
            .engine
            .process(&self.config.default_naming_template, &context)?;
        Ok(self.config.target_root_path.join(relative))
    }

    /// 使用済み集合に無いパスが見つかるまでステムへ `_NNN` を付けていく。
    /// 上限まで尽きた場合は体系的な命名不良なので、静かに失敗せずエラーを返す。
    pub fn generate_unique_path(
        &self,
        path: &Path,
        used: &HashSet<PathBuf>,
    ) -> Result<PathBuf, TidyDriveError> {
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let extension = path.extension().and_then(|e| e.to_str());

        for attempt in 1..=MAX_UNIQUE_ATTEMPTS {
            let candidate_name = match extension {
                Some(ext) => format!("{}_{:03}.{}", stem, attempt, ext),
                None => format!("{}_{:03}", stem, attempt),
            };
            let candidate = parent.join(candidate_name);
            if !used.contains(&candidate) {
                debug!("Unique path for {}: {}", path.display(), candidate.display());
                return Ok(candidate);
            }
        }

        Err(TidyDriveError::PathGeneration {
            path: path.to_path_buf(),
            message: format!(
                "Could not generate unique path after {} attempts",
                MAX_UNIQUE_ATTEMPTS
            ),
        })
    }

    /// 単体のパス検証: 非空・最大長以内・無効文字なし・絶対パス
    pub fn validate_path(&self, path: &Path) -> PathValidation {
        let text = path.to_string_lossy();
        let mut errors = Vec::new();

        if text.is_empty() {
            errors.push("Path is empty".to_string());
            return PathValidation::invalid(errors);
        }

        if text.chars().count() > self.config.max_path_length {
            errors.push(format!(
                "Path exceeds maximum length of {} characters",
                self.config.max_path_length
            ));
        }

        for (idx, c) in text.chars().enumerate() {
            let drive_colon = c == ':' && idx == 1;
            if (INVALID_PATH_CHARS.contains(&c) || c.is_control() || c == ':') && !drive_colon {
                errors.push(format!("Path contains invalid character '{}'", c.escape_default()));
                break;
            }
        }

        if !is_absolute(&text) {
            errors.push("Path must be absolute".to_string());
        }

        if errors.is_empty() {
            PathValidation::valid()
        } else {
            PathValidation::invalid(errors)
        }
    }
}

/// Unix のルート、ドライブレター、UNC のいずれかで始まれば絶対とみなす。
/// プラットフォームに依存しない判定にするため文字列で見る。
fn is_absolute(text: &str) -> bool {
    if text.starts_with('/') || text.starts_with("\\\\") {
        return true;
    }
    let mut chars = text.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(drive), Some(':'), Some('\\' | '/')) if drive.is_ascii_alphabetic()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use tidydrive_types::ItemType;

    fn generator() -> PathGenerator {
        PathGenerator::new(PlanConfig::new(PathBuf::from("/archive"))).unwrap()
    }

    fn item(name: &str, size: u64) -> Item {
        let modified = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        Item::new(
            PathBuf::from(format!("/scan/{}", name)),
            name.to_string(),
            ItemType::File,
            size,
        )
        .with_timestamps(modified, modified)
    }

    #[test]
    fn test_empty_target_root_rejected() {
        let result = PathGenerator::new(PlanConfig::new(PathBuf::new()));
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_target_path_with_default_template() {
        let path = generator().generate_target_path(&item("Document.pdf", 100)).unwrap();
        assert_eq!(path, PathBuf::from("/archive/2025/01/Document.pdf"));
    }

    #[test]
    fn test_generate_target_path_with_category() {
        let config = PlanConfig::new(PathBuf::from("/archive"))
            .with_template("{Category}/{Name}.{Extension}");
        let generator = PathGenerator::new(config).unwrap();

        let path = generator.generate_target_path(&item("photo.jpg", 100)).unwrap();
        assert_eq!(path, PathBuf::from("/archive/Images/photo.jpg"));
    }

    #[test]
    fn test_generate_unique_path_skips_used() {
        let generator = generator();
        let mut used = HashSet::new();
        used.insert(PathBuf::from("/archive/a_001.txt"));
        used.insert(PathBuf::from("/archive/a_002.txt"));

        let unique = generator
            .generate_unique_path(Path::new("/archive/a.txt"), &used)
            .unwrap();
        assert_eq!(unique, PathBuf::from("/archive/a_003.txt"));
    }

    #[test]
    fn test_generate_unique_path_without_extension() {
        let generator = generator();
        let unique = generator
            .generate_unique_path(Path::new("/archive/README"), &HashSet::new())
            .unwrap();
        assert_eq!(unique, PathBuf::from("/archive/README_001"));
    }

    #[test]
    fn test_generate_unique_path_exhaustion_is_fatal() {
        let generator = generator();
        let mut used = HashSet::new();
        for n in 1..=999 {
            used.insert(PathBuf::from(format!("/archive/a_{:03}.txt", n)));
        }

        let result = generator.generate_unique_path(Path::new("/archive/a.txt"), &used);
        assert!(matches!(result, Err(TidyDriveError::PathGeneration { .. })));
    }

    #[test]
    fn test_validate_path_accepts_valid_absolute() {
        let validation = generator().validate_path(Path::new("/archive/2025/report.pdf"));
        assert!(validation.is_valid);
        assert!(validation.errors.is_empty());
    }

    #[test]
    fn test_validate_path_accepts_windows_drive() {
        let validation = generator().validate_path(Path::new("C:\\Archive\\report.pdf"));
        assert!(validation.is_valid, "errors: {:?}", validation.errors);
    }

    #[test]
    fn test_validate_path_rejects_relative() {
        let validation = generator().validate_path(Path::new("relative/report.pdf"));
        assert!(!validation.is_valid);
        assert!(validation.errors.iter().any(|e| e.contains("absolute")));
    }

    #[test]
    fn test_validate_path_rejects_invalid_characters() {
        let validation = generator().validate_path(Path::new("/archive/what?.pdf"));
        assert!(!validation.is_valid);
        assert!(validation.errors.iter().any(|e| e.contains("invalid character")));
    }

    #[test]
    fn test_validate_path_rejects_over_length() {
        let config = PlanConfig::new(PathBuf::from("/archive")).with_max_path_length(20);
        let generator = PathGenerator::new(config).unwrap();

        let validation =
            generator.validate_path(Path::new("/archive/a_very_long_subdirectory/report.pdf"));
        assert!(!validation.is_valid);
        assert!(validation.errors.iter().any(|e| e.contains("maximum length")));
    }

    #[test]
    fn test_validate_path_rejects_empty() {
        let validation = generator().validate_path(Path::new(""));
        assert!(!validation.is_valid);
        assert_eq!(validation.errors, vec!["Path is empty".to_string()]);
    }
}
