use std::collections::HashMap;
use std::time::Instant;
use rayon::prelude::*;
use tracing::{debug, info};
use uuid::Uuid;
use tidydrive_types::{
    DetectionConfig, DetectionMethod, DuplicateDetectionResult, DuplicateMatch, Item,
};
use crate::similarity::{name_similarity, size_similarity, time_similarity};

/// 多戦略の重複検出器。各戦略は独立に走り、結果はプールしてから
/// ペア単位で重複排除する（最高信頼度のエントリが残る）。
pub struct DuplicateDetector {
    config: DetectionConfig,
}

impl DuplicateDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, items: &[Item]) -> DuplicateDetectionResult {
        let started = Instant::now();

        // 解析対象はサイズ下限を満たすファイルのみ
        let analyzed: Vec<&Item> = items
            .iter()
            .filter(|i| i.is_file() && i.size >= self.config.minimum_file_size)
            .collect();

        info!(
            "Duplicate detection over {} of {} items",
            analyzed.len(),
            items.len()
        );

        let mut pool: Vec<DuplicateMatch> = Vec::new();

        if self.config.use_exact_hash {
            pool.extend(self.exact_hash_matches(&analyzed));
        }
        if self.config.use_partial_hash {
            pool.extend(self.partial_hash_matches(&analyzed));
        }
        if self.config.use_name_similarity {
            pool.extend(self.name_similarity_matches(&analyzed));
        }
        if self.config.use_size_and_date {
            pool.extend(self.size_and_date_matches(&analyzed));
        }

        debug!("Pooled {} raw matches before deduplication", pool.len());

        let matches = deduplicate(pool);

        DuplicateDetectionResult {
            matches,
            items_analyzed: analyzed.len(),
            duration: started.elapsed(),
        }
    }

    /// 完全一致ハッシュ: 同一 contentHash のグループ内の全ペア、信頼度 1.0
    fn exact_hash_matches(&self, items: &[&Item]) -> Vec<DuplicateMatch> {
        let mut groups: HashMap<&str, Vec<&Item>> = HashMap::new();
        for item in items {
            if let Some(hash) = &item.content_hash {
                groups.entry(hash.as_str()).or_default().push(item);
            }
        }

        let mut matches = Vec::new();
        for (hash, group) in groups {
            if group.len() < 2 {
                continue;
            }
            for (idx, a) in group.iter().enumerate() {
                for b in &group[idx + 1..] {
                    matches.push(DuplicateMatch::new(
                        a.id,
                        b.id,
                        1.0,
                        DetectionMethod::ExactHash,
                        format!("Identical content hash {}", short_hash(hash)),
                    ));
                }
            }
        }
        matches
    }

    /// 部分ハッシュ: 先頭8文字が一致し、完全ハッシュは異なるペア、信頼度 0.9
    fn partial_hash_matches(&self, items: &[&Item]) -> Vec<DuplicateMatch> {
        let mut groups: HashMap<String, Vec<&Item>> = HashMap::new();
        for item in items {
            if let Some(hash) = &item.content_hash {
                let prefix: String = hash.chars().take(8).collect();
                groups.entry(prefix).or_default().push(item);
            }
        }

        let mut matches = Vec::new();
        for (prefix, group) in groups {
            if group.len() < 2 {
                continue;
            }
            for (idx, a) in group.iter().enumerate() {
                for b in &group[idx + 1..] {
                    // 完全一致は exact 戦略の領分なので報告し直さない
                    if a.content_hash == b.content_hash {
                        continue;
                    }
                    matches.push(DuplicateMatch::new(
                        a.id,
                        b.id,
                        0.9,
                        DetectionMethod::PartialHash,
                        format!("Shared hash prefix '{}'", prefix),
                    ));
                }
            }
        }
        matches
    }

    /// 名前類似: 粗いサイズバケット（size div 1024）内のペアだけを候補にし、
    /// 正規化名の類似度とサイズ比の両方が閾値を満たせば採用。
    fn name_similarity_matches(&self, items: &[&Item]) -> Vec<DuplicateMatch> {
        let mut buckets: HashMap<u64, Vec<&Item>> = HashMap::new();
        for item in items {
            buckets.entry(item.size / 1024).or_default().push(item);
        }

        let threshold = self.config.name_similarity_threshold;
        let min_size_sim = 1.0 - self.config.max_size_difference_percent;
        let buckets: Vec<Vec<&Item>> = buckets.into_values().filter(|b| b.len() > 1).collect();

        buckets
            .par_iter()
            .flat_map_iter(|bucket| {
                let mut found = Vec::new();
                for (idx, a) in bucket.iter().enumerate() {
                    for b in &bucket[idx + 1..] {
                        let name_sim = name_similarity(&a.name, &b.name);
                        if name_sim < threshold {
                            continue;
                        }
                        let size_sim = size_similarity(a.size, b.size);
                        if size_sim < min_size_sim {
                            continue;
                        }
                        found.push(DuplicateMatch::new(
                            a.id,
                            b.id,
                            (name_sim + size_sim) / 2.0,
                            DetectionMethod::NameSimilarity,
                            format!(
                                "Name similarity {:.2}, size similarity {:.2}",
                                name_sim, size_sim
                            ),
                        ));
                    }
                }
                found
            })
            .collect()
    }

    /// サイズ+日付: 完全一致サイズのグループ内で更新時刻の近さを評価。
    /// 日付グループ化が無効なら時刻類似度は 1.0 として扱う。
    fn size_and_date_matches(&self, items: &[&Item]) -> Vec<DuplicateMatch> {
        let mut groups: HashMap<u64, Vec<&Item>> = HashMap::new();
        for item in items {
            groups.entry(item.size).or_default().push(item);
        }

        let group_by_date = self.config.group_by_date;
        let max_hours = self.config.max_date_difference_hours;
        let groups: Vec<Vec<&Item>> = groups.into_values().filter(|g| g.len() > 1).collect();

        groups
            .par_iter()
            .flat_map_iter(|group| {
                let mut found = Vec::new();
                for (idx, a) in group.iter().enumerate() {
                    for b in &group[idx + 1..] {
                        let date_sim = if group_by_date {
                            time_similarity(a.modified_at, b.modified_at, max_hours)
                        } else {
                            1.0
                        };
                        if date_sim < 0.8 {
                            continue;
                        }
                        found.push(DuplicateMatch::new(
                            a.id,
                            b.id,
                            0.7 * date_sim,
                            DetectionMethod::SizeAndDate,
                            format!(
                                "Same size ({} bytes), date similarity {:.2}",
                                a.size, date_sim
                            ),
                        ));
                    }
                }
                found
            })
            .collect()
    }
}

/// プールした結果をペアキーで重複排除する。同一ペアに複数の手法が
/// 発火した場合、厳密に高い信頼度を持つエントリだけが置き換える。
/// 最終結果は信頼度の降順。
fn deduplicate(pool: Vec<DuplicateMatch>) -> Vec<DuplicateMatch> {
    let mut by_pair: HashMap<(Uuid, Uuid), DuplicateMatch> = HashMap::new();

    for candidate in pool {
        let key = candidate.pair_key();
        match by_pair.get(&key) {
            Some(existing) if existing.confidence >= candidate.confidence => {}
            _ => {
                by_pair.insert(key, candidate);
            }
        }
    }

    let mut matches: Vec<DuplicateMatch> = by_pair.into_values().collect();
    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.pair_key().cmp(&b.pair_key()))
    });
    matches
}

fn short_hash(hash: &str) -> String {
    hash.chars().take(8).collect()
}
