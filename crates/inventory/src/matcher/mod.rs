//! 매칭 엔진 -- 다중 패턴 순위 검색
//!
//! [`MatchEngine`]은 정규화된 인벤토리에서 패턴 목록과 일치하는 항목을 찾아
//! 점수 순으로 반환합니다.
//!
//! # 처리 흐름
//!
//! 1. 빈 패턴 제거 (남는 패턴이 없으면 빈 결과)
//! 2. 패턴별로 모든 항목의 레이블 점수 계산 후 포함 여부 판정
//! 3. 패턴별 점수 내림차순 안정 정렬 후 상위 `cap`개만 유지
//! 4. 코퍼스 위치 기준으로 결과 병합 (최고 점수, 매칭된 패턴 누적)
//! 5. `(점수 내림차순, 정규화된 이름 오름차순)` 안정 정렬
//!
//! 엔진은 순수 동기 함수이며 공유 상태를 갖지 않습니다.

pub mod similarity;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use appwarden_core::config::{AuditConfig, SearchConfig};
use appwarden_core::metrics as m;

use crate::error::InventoryScannerError;
use crate::types::{Entry, normalize};

/// 기본 fuzzy 임계값
pub const DEFAULT_THRESHOLD: u8 = 70;

/// 기본 패턴당 후보 수
pub const DEFAULT_CAP: usize = 200;

/// 매칭 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// 유사도 점수 기반
    #[default]
    Fuzzy,
    /// 부분 문자열 포함 여부
    Substring,
}

impl MatchMode {
    /// 문자열에서 매칭 모드를 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fuzzy" => Some(Self::Fuzzy),
            "substring" | "contains" => Some(Self::Substring),
            _ => None,
        }
    }

    /// 모드 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fuzzy => "fuzzy",
            Self::Substring => "substring",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 검색 옵션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// 매칭 모드
    pub mode: MatchMode,
    /// fuzzy 모드 최소 점수 (substring 모드에서는 무시)
    pub threshold: u8,
    /// 패턴당 최대 후보 수 (0은 1로 취급)
    pub cap: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: MatchMode::Fuzzy,
            threshold: DEFAULT_THRESHOLD,
            cap: DEFAULT_CAP,
        }
    }
}

impl SearchOptions {
    /// core의 `SearchConfig`에서 옵션을 생성합니다.
    ///
    /// 알 수 없는 모드는 fuzzy로 취급합니다.
    pub fn from_core(core: &SearchConfig) -> Self {
        Self {
            mode: MatchMode::from_str_loose(&core.mode).unwrap_or_default(),
            threshold: core.threshold,
            cap: core.cap,
        }
    }

    /// core의 `AuditConfig`에서 감사용 옵션을 생성합니다.
    pub fn from_audit(core: &AuditConfig) -> Self {
        Self {
            mode: MatchMode::from_str_loose(&core.mode).unwrap_or_default(),
            threshold: core.threshold,
            cap: core.cap,
        }
    }

    /// 매칭 모드를 설정합니다.
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// 임계값을 설정합니다.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// 패턴당 최대 후보 수를 설정합니다.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// 옵션 값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), InventoryScannerError> {
        if self.threshold > 100 {
            return Err(InventoryScannerError::Config {
                field: "threshold".to_owned(),
                reason: format!("must be 0-100, got {}", self.threshold),
            });
        }
        if self.cap == 0 {
            return Err(InventoryScannerError::Config {
                field: "cap".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// 매칭 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// 매칭된 항목
    #[serde(flatten)]
    pub entry: Entry,
    /// 최고 점수 (0-100)
    pub score: u8,
    /// 이 항목과 매칭된 패턴 (처음 매칭된 순서, 중복 없음)
    pub matched_patterns: Vec<String>,
}

/// 다중 패턴 매칭 엔진
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEngine {
    options: SearchOptions,
}

impl MatchEngine {
    /// 새 엔진을 생성합니다.
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    /// 엔진 옵션
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// 패턴 목록으로 코퍼스를 검색합니다.
    ///
    /// 같은 항목의 식별은 코퍼스 내 위치로 합니다. 내용이 같은 두 항목도
    /// 별개의 결과가 됩니다.
    pub fn search<S: AsRef<str>>(&self, patterns: &[S], corpus: &[Entry]) -> Vec<MatchResult> {
        let mode = self.options.mode;
        metrics::counter!(m::SEARCH_QUERIES_TOTAL, m::LABEL_MODE => mode.as_str()).increment(1);

        let queries: Vec<&str> = patterns
            .iter()
            .map(AsRef::as_ref)
            .filter(|p| !p.trim().is_empty())
            .collect();
        if queries.is_empty() || corpus.is_empty() {
            return Vec::new();
        }

        let labels: Vec<String> = corpus.iter().map(label).collect();
        let cap = self.options.cap.max(1);

        let mut slots: HashMap<usize, usize> = HashMap::new();
        let mut results: Vec<MatchResult> = Vec::new();

        for query in queries {
            let needle = normalize(query);
            let mut scored: Vec<(u8, usize)> = labels
                .iter()
                .enumerate()
                .filter_map(|(position, label)| {
                    let score = self.score(&needle, label);
                    self.admits(score).then_some((score, position))
                })
                .collect();
            scored.sort_by(|a, b| b.0.cmp(&a.0));
            scored.truncate(cap);
            debug!(pattern = query, candidates = scored.len(), "pattern scored");

            for (score, position) in scored {
                match slots.get(&position) {
                    Some(&slot) => {
                        let result = &mut results[slot];
                        result.score = result.score.max(score);
                        if !result.matched_patterns.iter().any(|p| p == query) {
                            result.matched_patterns.push(query.to_owned());
                        }
                    }
                    None => {
                        slots.insert(position, results.len());
                        results.push(MatchResult {
                            entry: corpus[position].clone(),
                            score,
                            matched_patterns: vec![query.to_owned()],
                        });
                    }
                }
            }
        }

        results.sort_by(|a, b| {
            b.score.cmp(&a.score).then_with(|| {
                normalize(&a.entry.display_name).cmp(&normalize(&b.entry.display_name))
            })
        });

        metrics::counter!(m::SEARCH_MATCHES_TOTAL, m::LABEL_MODE => mode.as_str())
            .increment(results.len() as u64);
        results
    }

    fn score(&self, needle: &str, label: &str) -> u8 {
        match self.options.mode {
            MatchMode::Substring => {
                if label.contains(needle) {
                    100
                } else {
                    0
                }
            }
            MatchMode::Fuzzy => similarity::similarity(needle, label),
        }
    }

    fn admits(&self, score: u8) -> bool {
        match self.options.mode {
            MatchMode::Substring => score == 100,
            MatchMode::Fuzzy => score > 0 && score >= self.options.threshold,
        }
    }
}

/// 옵션을 지정해 한 번 검색합니다.
pub fn search<S: AsRef<str>>(
    patterns: &[S],
    corpus: &[Entry],
    options: SearchOptions,
) -> Vec<MatchResult> {
    MatchEngine::new(options).search(patterns, corpus)
}

/// 매칭 대상 레이블 `normalize(name) + " " + normalize(publisher)`
pub fn label(entry: &Entry) -> String {
    let name = normalize(&entry.display_name);
    let publisher = normalize(entry.publisher.as_deref().unwrap_or_default());
    format!("{name} {publisher}").trim().to_owned()
}
