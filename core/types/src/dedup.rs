use std::time::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionMethod {
    ExactHash,
    PartialHash,
    NameSimilarity,
    SizeAndDate,
}

/// 2アイテムが同一内容であるという、手法付き・スコア付きの主張。
/// ペアは順序を持たない: キーは常に正規化して比較する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    pub item_id_1: Uuid,
    pub item_id_2: Uuid,
    pub confidence: f64,
    pub method: DetectionMethod,
    pub details: String,
}

impl DuplicateMatch {
    pub fn new(
        item_id_1: Uuid,
        item_id_2: Uuid,
        confidence: f64,
        method: DetectionMethod,
        details: String,
    ) -> Self {
        Self { item_id_1, item_id_2, confidence, method, details }
    }

    /// 順序に依存しないペアキー
    pub fn pair_key(&self) -> (Uuid, Uuid) {
        if self.item_id_1 <= self.item_id_2 {
            (self.item_id_1, self.item_id_2)
        } else {
            (self.item_id_2, self.item_id_1)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateDetectionResult {
    pub matches: Vec<DuplicateMatch>,
    pub items_analyzed: usize,
    pub duration: Duration,
}
