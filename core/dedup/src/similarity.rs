//! 類似度スコアの純粋関数群。編集距離ベースの文字列類似度、
//! サイズ比の類似度、更新時刻の近さの3系統を提供する。

use chrono::{DateTime, Utc};

/// 文字単位の Levenshtein 距離（2行DP）
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `1 − distance / max(len)`。両方空なら 1.0。
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// ファイル名を比較用に正規化する:
/// 小文字化、拡張子除去、`-`/`_`/`.` を空白に畳み、連続空白を1つに潰す。
pub fn normalize_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let stem = match lower.rfind('.') {
        Some(idx) if idx > 0 => &lower[..idx],
        _ => &lower,
    };

    let folded: String = stem
        .chars()
        .map(|c| if matches!(c, '-' | '_' | '.') { ' ' } else { c })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 正規化済みファイル名の類似度
pub fn name_similarity(name_a: &str, name_b: &str) -> f64 {
    string_similarity(&normalize_name(name_a), &normalize_name(name_b))
}

/// サイズ比の類似度 `1 − |s1−s2| / max(s1,s2)`。両方 0 なら 1.0。
pub fn size_similarity(size_a: u64, size_b: u64) -> f64 {
    let max = size_a.max(size_b);
    if max == 0 {
        return 1.0;
    }
    1.0 - size_a.abs_diff(size_b) as f64 / max as f64
}

/// 更新時刻の近さ `1 − Δhours / max_hours`、[0,1] にクランプ
pub fn time_similarity(a: DateTime<Utc>, b: DateTime<Utc>, max_hours: f64) -> f64 {
    if max_hours <= 0.0 {
        return 0.0;
    }
    let delta_hours = (a - b).num_seconds().abs() as f64 / 3600.0;
    (1.0 - delta_hours / max_hours).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_string_similarity_range() {
        assert_eq!(string_similarity("", ""), 1.0);
        assert_eq!(string_similarity("abcd", "abcd"), 1.0);
        assert_eq!(string_similarity("abcd", "wxyz"), 0.0);
        let sim = string_similarity("report", "reports");
        assert!(sim > 0.85 && sim < 1.0);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("My-Photo_2024.final.JPG"), "my photo 2024 final");
        assert_eq!(normalize_name("report__draft.pdf"), "report draft");
        // 先頭ドットは拡張子ではない
        assert_eq!(normalize_name(".gitignore"), "gitignore");
    }

    #[test]
    fn test_name_similarity_on_variants() {
        assert_eq!(name_similarity("vacation-photo.jpg", "vacation_photo.png"), 1.0);
        assert!(name_similarity("vacation_photo.jpg", "vacation_photo_2.jpg") > 0.8);
        assert!(name_similarity("invoice.pdf", "holiday.mp4") < 0.5);
    }

    #[test]
    fn test_size_similarity() {
        assert_eq!(size_similarity(0, 0), 1.0);
        assert_eq!(size_similarity(1000, 1000), 1.0);
        assert_eq!(size_similarity(1000, 500), 0.5);
        assert_eq!(size_similarity(0, 100), 0.0);
    }

    #[test]
    fn test_time_similarity_clamps() {
        let now = Utc::now();
        assert_eq!(time_similarity(now, now, 24.0), 1.0);
        assert_eq!(time_similarity(now, now + Duration::hours(12), 24.0), 0.5);
        // 窓の外は 0 で止まる
        assert_eq!(time_similarity(now, now + Duration::hours(100), 24.0), 0.0);
    }
}
