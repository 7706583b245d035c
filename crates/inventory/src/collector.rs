//! 인벤토리 수집 오케스트레이터
//!
//! [`InventoryCollector`]는 소스 계획, 소스별 스캔, 필터, 중복 병합의 전체 흐름을
//! 관리하고 결과를 [`InventorySnapshot`]으로 반환합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! InventoryScannerConfig --> SourceScanner::plan --> [SourceSpec; N]
//!                                                        |
//!                               spawn_blocking x N (JoinSet) 또는 순차 실행
//!                                                        |
//!                                     계획 순서로 재정렬 (skip-and-log)
//!                                                        |
//!                                      filter --> dedup --> InventorySnapshot
//! ```
//!
//! 소스 스캔 완료 순서와 관계없이 결과는 항상 계획 순서로 합쳐집니다.

use std::sync::Arc;
use std::time::SystemTime;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use appwarden_core::metrics as m;

use crate::config::InventoryScannerConfig;
use crate::dedup::dedup;
use crate::error::InventoryScannerError;
use crate::filter::{FilterOptions, filter};
use crate::scanner::{SourceScanner, SourceSpec, absorb};
use crate::source::{
    IndirectStringLoader, NoIndirectStrings, PackageCatalog, RegistryAccess, RegistrySnapshot,
    UnavailableCatalog,
};
use crate::types::Entry;

/// 소스별 기여 (실패한 소스는 `None`)
type Contribution = Option<Vec<Entry>>;

/// 수집 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectStats {
    /// 계획된 소스 수
    pub sources_planned: usize,
    /// 스캔에 성공한 소스 수
    pub sources_scanned: usize,
    /// 건너뛴 소스 수
    pub sources_failed: usize,
    /// 필터 이전 원시 항목 수
    pub entries_collected: usize,
    /// 필터로 제외된 항목 수
    pub entries_filtered: usize,
    /// 중복 병합으로 제거된 항목 수
    pub duplicates_merged: usize,
}

/// 한 번의 수집 결과
#[derive(Debug, Clone, Serialize)]
pub struct InventorySnapshot {
    /// 수집 ID (UUID v4)
    pub scan_id: String,
    /// 수집 완료 시각
    pub collected_at: SystemTime,
    /// 정규화된 항목 목록
    pub entries: Vec<Entry>,
    /// 수집 통계
    pub stats: CollectStats,
}

/// 인벤토리 수집기
pub struct InventoryCollector {
    config: InventoryScannerConfig,
    scanner: Arc<SourceScanner>,
}

impl InventoryCollector {
    /// 수집기 설정
    pub fn config(&self) -> &InventoryScannerConfig {
        &self.config
    }

    /// 소스 스캐너
    pub fn scanner(&self) -> &SourceScanner {
        &self.scanner
    }

    /// 인벤토리를 수집합니다.
    ///
    /// 소스 접근은 blocking 호출이므로 tokio blocking 풀에서 실행됩니다.
    /// `concurrent`가 true이면 소스별로 병렬 실행합니다.
    ///
    /// # Errors
    ///
    /// 계획 단계 작업이 실패(panic)하면 `Task`. 개별 소스 실패는 에러가 아닙니다.
    pub async fn collect(&self) -> Result<InventorySnapshot, InventoryScannerError> {
        let plan = {
            let scanner = Arc::clone(&self.scanner);
            let config = self.config.clone();
            tokio::task::spawn_blocking(move || scanner.plan(&config))
                .await
                .map_err(|e| InventoryScannerError::Task(format!("spawn_blocking failed: {e}")))?
        };

        let contributions = if self.config.concurrent {
            self.scan_concurrent(&plan).await
        } else {
            let scanner = Arc::clone(&self.scanner);
            let specs = plan.clone();
            tokio::task::spawn_blocking(move || scan_sequential(&scanner, &specs))
                .await
                .map_err(|e| InventoryScannerError::Task(format!("spawn_blocking failed: {e}")))?
        };

        Ok(self.reduce(&plan, contributions))
    }

    /// 현재 스레드에서 순차적으로 수집합니다 (비동기 런타임 없이 사용).
    pub fn collect_blocking(&self) -> InventorySnapshot {
        let plan = self.scanner.plan(&self.config);
        let contributions = scan_sequential(&self.scanner, &plan);
        self.reduce(&plan, contributions)
    }

    async fn scan_concurrent(&self, plan: &[SourceSpec]) -> Vec<Contribution> {
        let mut tasks = JoinSet::new();
        for (position, spec) in plan.iter().cloned().enumerate() {
            let scanner = Arc::clone(&self.scanner);
            tasks.spawn_blocking(move || {
                let result = scanner.scan_source(&spec);
                (position, result)
            });
        }

        let mut slots: Vec<Contribution> = vec![None; plan.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, result)) => {
                    if let (Some(slot), Some(spec)) = (slots.get_mut(position), plan.get(position)) {
                        *slot = absorb(spec, result);
                    }
                }
                Err(e) => warn!(error = %e, "source scan task failed, skipping"),
            }
        }
        slots
    }

    fn reduce(&self, plan: &[SourceSpec], contributions: Vec<Contribution>) -> InventorySnapshot {
        let sources_scanned = contributions.iter().filter(|c| c.is_some()).count();
        let raw: Vec<Entry> = contributions.into_iter().flatten().flatten().collect();
        let entries_collected = raw.len();

        let filtered = filter(
            raw,
            FilterOptions {
                filter_system_components: self.config.filter_system_components,
            },
        );
        let entries_filtered = entries_collected - filtered.len();

        let before_dedup = filtered.len();
        let entries = if self.config.deduplicate {
            dedup(filtered)
        } else {
            filtered
        };
        let duplicates_merged = before_dedup - entries.len();

        let stats = CollectStats {
            sources_planned: plan.len(),
            sources_scanned,
            sources_failed: plan.len() - sources_scanned,
            entries_collected,
            entries_filtered,
            duplicates_merged,
        };

        metrics::counter!(m::INVENTORY_ENTRIES_COLLECTED_TOTAL).increment(entries_collected as u64);
        metrics::counter!(m::INVENTORY_DUPLICATES_MERGED_TOTAL).increment(duplicates_merged as u64);

        let scan_id = uuid::Uuid::new_v4().to_string();
        info!(
            scan_id = %scan_id,
            sources = stats.sources_planned,
            failed = stats.sources_failed,
            collected = stats.entries_collected,
            filtered = stats.entries_filtered,
            merged = stats.duplicates_merged,
            entries = entries.len(),
            "inventory collected"
        );

        InventorySnapshot {
            scan_id,
            collected_at: SystemTime::now(),
            entries,
            stats,
        }
    }
}

fn scan_sequential(scanner: &SourceScanner, plan: &[SourceSpec]) -> Vec<Contribution> {
    plan.iter()
        .map(|spec| {
            debug!(source = %spec, "scanning source");
            absorb(spec, scanner.scan_source(spec))
        })
        .collect()
}

/// 인벤토리 수집기 빌더
///
/// 레지스트리 백엔드는 필수이며, 패키지 카탈로그와 간접 문자열 로더는
/// 지정하지 않으면 "지원하지 않음" 구현을 사용합니다.
pub struct InventoryCollectorBuilder {
    config: InventoryScannerConfig,
    registry: Option<Arc<dyn RegistryAccess>>,
    catalog: Arc<dyn PackageCatalog>,
    strings: Arc<dyn IndirectStringLoader>,
}

impl InventoryCollectorBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: InventoryScannerConfig::default(),
            registry: None,
            catalog: Arc::new(UnavailableCatalog),
            strings: Arc::new(NoIndirectStrings),
        }
    }

    /// 수집 설정을 지정합니다.
    pub fn config(mut self, config: InventoryScannerConfig) -> Self {
        self.config = config;
        self
    }

    /// 레지스트리 백엔드를 지정합니다.
    pub fn registry(mut self, registry: Arc<dyn RegistryAccess>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 패키지 카탈로그를 지정합니다.
    pub fn catalog(mut self, catalog: Arc<dyn PackageCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// 간접 문자열 로더를 지정합니다.
    pub fn strings(mut self, strings: Arc<dyn IndirectStringLoader>) -> Self {
        self.strings = strings;
        self
    }

    /// 스냅샷 하나로 세 백엔드를 모두 지정합니다.
    pub fn snapshot(mut self, snapshot: Arc<RegistrySnapshot>) -> Self {
        let registry: Arc<dyn RegistryAccess> = snapshot.clone();
        self.registry = Some(registry);
        self.catalog = snapshot.clone();
        self.strings = snapshot;
        self
    }

    /// 네이티브 Windows 백엔드를 지정합니다.
    #[cfg(windows)]
    pub fn native(mut self) -> Self {
        self.registry = Some(Arc::new(crate::source::WindowsRegistry));
        self.catalog = Arc::new(UnavailableCatalog);
        self.strings = Arc::new(crate::source::ShellIndirectStrings);
        self
    }

    /// 수집기를 빌드합니다.
    ///
    /// # Errors
    ///
    /// 설정이 유효하지 않거나 레지스트리 백엔드가 없으면 `Config`
    pub fn build(self) -> Result<InventoryCollector, InventoryScannerError> {
        self.config.validate()?;
        let registry = self.registry.ok_or_else(|| InventoryScannerError::Config {
            field: "registry".to_owned(),
            reason: "no registry backend configured".to_owned(),
        })?;

        Ok(InventoryCollector {
            config: self.config,
            scanner: Arc::new(SourceScanner::new(registry, self.catalog, self.strings)),
        })
    }
}

impl Default for InventoryCollectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
