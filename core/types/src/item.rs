use std::path::PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    File,
    Folder,
}

/// コネクタ層が付与する検証上の注意コード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemIssue {
    MissingHash,
    FutureTimestamp,
    ZeroByte,
    PathTooDeep,
}

/// スキャンで発見された1エントリ。コネクタ層が生成し、コアは変更しない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub path: PathBuf,
    pub name: String,
    pub item_type: ItemType,
    pub size: u64,
    pub content_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub depth: u32,
    pub provider: String,
    pub issues: Vec<ItemIssue>,
}

impl Item {
    pub fn new(path: PathBuf, name: String, item_type: ItemType, size: u64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            path,
            name,
            item_type,
            size,
            content_hash: None,
            created_at: now,
            modified_at: now,
            depth: 0,
            provider: "local".to_string(),
            issues: Vec::new(),
        }
    }

    pub fn with_hash(mut self, hash: String) -> Self {
        self.content_hash = Some(hash);
        self
    }

    pub fn with_timestamps(mut self, created: DateTime<Utc>, modified: DateTime<Utc>) -> Self {
        self.created_at = created;
        self.modified_at = modified;
        self
    }

    pub fn with_provider(mut self, provider: &str) -> Self {
        self.provider = provider.to_string();
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_issue(mut self, issue: ItemIssue) -> Self {
        self.issues.push(issue);
        self
    }

    /// 拡張子を小文字・ドット無しで返す（無ければ空文字）
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default()
    }

    pub fn is_file(&self) -> bool {
        self.item_type == ItemType::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased_and_dotless() {
        let item = Item::new(
            PathBuf::from("/data/photos/IMG_0001.JPG"),
            "IMG_0001.JPG".to_string(),
            ItemType::File,
            2048,
        );
        assert_eq!(item.extension(), "jpg");
    }

    #[test]
    fn test_extension_empty_when_missing() {
        let item = Item::new(
            PathBuf::from("/data/notes/README"),
            "README".to_string(),
            ItemType::File,
            10,
        );
        assert_eq!(item.extension(), "");
    }

    #[test]
    fn test_builder_chain() {
        let item = Item::new(
            PathBuf::from("/data/a.txt"),
            "a.txt".to_string(),
            ItemType::File,
            1,
        )
        .with_provider("onedrive")
        .with_depth(3)
        .with_issue(ItemIssue::MissingHash);

        assert_eq!(item.provider, "onedrive");
        assert_eq!(item.depth, 3);
        assert_eq!(item.issues, vec![ItemIssue::MissingHash]);
    }
}
