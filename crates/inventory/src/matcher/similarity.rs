//! 문자열 유사도 점수 (0-100)
//!
//! 두 가지 척도의 최댓값을 fuzzy 점수로 사용합니다.
//!
//! - [`partial_overlap`]: 짧은 문자열과 긴 문자열의 가장 비슷한 구간 비교
//! - [`token_set`]: 공백 단위 토큰 집합 비교 (단어 순서/중복 무시)
//!
//! 기본 척도는 `strsim::normalized_levenshtein`입니다.
//! 입력은 호출자가 미리 정규화(소문자화, trim)해야 합니다.

use std::collections::BTreeSet;

/// fuzzy 점수 `max(partial_overlap, token_set)`
///
/// 어느 한쪽이 비어 있거나, 공백 이외의 공통 문자가 하나도 없으면 0입니다.
pub fn similarity(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() || !shares_any_char(a, b) {
        return 0;
    }
    partial_overlap(a, b).max(token_set(a, b))
}

/// 짧은 쪽을 긴 쪽의 길이 `len`, `len + 1` 구간과 비교한 최고 점수
///
/// 짧은 쪽이 긴 쪽에 그대로 포함되면 100입니다.
pub fn partial_overlap(a: &str, b: &str) -> u8 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    if short.is_empty() {
        return 0;
    }
    if long.contains(short) {
        return 100;
    }

    let long_chars: Vec<char> = long.chars().collect();
    let width = short.chars().count();
    let mut best = 0.0_f64;
    for size in [width, width + 1] {
        if size > long_chars.len() {
            continue;
        }
        for window in long_chars.windows(size) {
            let candidate: String = window.iter().collect();
            best = best.max(strsim::normalized_levenshtein(short, &candidate));
        }
    }
    to_percent(best)
}

/// 토큰 집합 점수
///
/// 공통 토큰이 있고 한쪽에 남는 토큰이 없으면 100입니다. 그 외에는
/// `공통`, `공통 + A 나머지`, `공통 + B 나머지` 조합(각각 정렬) 간 최고 유사도입니다.
pub fn token_set(a: &str, b: &str) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let common = join(tokens_a.intersection(&tokens_b).copied());
    let rest_a = join(tokens_a.difference(&tokens_b).copied());
    let rest_b = join(tokens_b.difference(&tokens_a).copied());

    if common.is_empty() {
        return ratio(&rest_a, &rest_b);
    }
    if rest_a.is_empty() || rest_b.is_empty() {
        return 100;
    }

    let combined_a = format!("{common} {rest_a}");
    let combined_b = format!("{common} {rest_b}");
    ratio(&common, &combined_a)
        .max(ratio(&common, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

fn join<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

fn ratio(a: &str, b: &str) -> u8 {
    to_percent(strsim::normalized_levenshtein(a, b))
}

fn to_percent(value: f64) -> u8 {
    (value * 100.0).round().clamp(0.0, 100.0) as u8
}

fn shares_any_char(a: &str, b: &str) -> bool {
    let chars: BTreeSet<char> = a.chars().filter(|c| !c.is_whitespace()).collect();
    b.chars().any(|c| chars.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(similarity("google chrome", "google chrome"), 100);
        assert_eq!(similarity("7-zip", "7-zip"), 100);
    }

    #[test]
    fn disjoint_strings_score_0() {
        assert_eq!(similarity("abc", "xyz"), 0);
        assert_eq!(similarity("foo bar", "xyz qwe"), 0);
    }

    #[test]
    fn empty_input_scores_0() {
        assert_eq!(similarity("", "chrome"), 0);
        assert_eq!(similarity("chrome", ""), 0);
    }

    #[test]
    fn contained_substring_scores_100() {
        assert_eq!(partial_overlap("chrome", "google chrome google llc"), 100);
        assert_eq!(partial_overlap("google chrome google llc", "chrome"), 100);
    }

    #[test]
    fn typo_scores_through_longer_window() {
        // "chrme" vs window "chrome": 편집 1회 / 길이 6
        let score = partial_overlap("chrme", "google chrome");
        assert_eq!(score, 83);
        assert!(similarity("chrme", "google chrome") >= 70);
    }

    #[test]
    fn token_subset_scores_100() {
        assert_eq!(token_set("chrome google", "google chrome google llc"), 100);
    }

    #[test]
    fn token_order_is_ignored() {
        assert_eq!(token_set("reader acrobat adobe", "adobe acrobat reader"), 100);
    }

    #[test]
    fn partial_token_overlap_is_below_100() {
        let score = token_set("mozilla firefox", "mozilla thunderbird");
        assert!(score > 0 && score < 100, "score = {score}");
    }

    #[test]
    fn more_overlap_scores_higher() {
        let label = "visual studio code microsoft corporation";
        let weak = similarity("vsual", label);
        let strong = similarity("visual", label);
        assert!(strong >= weak);
        assert_eq!(strong, 100);
    }

    #[test]
    fn score_stays_in_range() {
        for (a, b) in [("a", "b"), ("ab", "ba"), ("x y z", "z"), ("long pattern here", "l")] {
            let score = similarity(a, b);
            assert!(score <= 100);
        }
    }
}
