//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않은 경우 기록은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `appwarden_`
//! - 모듈명: `inventory_`, `search_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(appwarden_core::metrics::INVENTORY_SOURCES_SCANNED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 소스 레이블 키 (machine/64, current-user/32, packaged ...)
pub const LABEL_SOURCE: &str = "source";

/// 검색 모드 레이블 키 (fuzzy, substring)
pub const LABEL_MODE: &str = "mode";

// ─── Inventory 메트릭 ───────────────────────────────────────────────

/// Inventory: 스캔에 성공한 소스 수 (counter, label: source)
pub const INVENTORY_SOURCES_SCANNED_TOTAL: &str = "appwarden_inventory_sources_scanned_total";

/// Inventory: 접근 불가로 건너뛴 소스 수 (counter, label: source)
pub const INVENTORY_SOURCES_FAILED_TOTAL: &str = "appwarden_inventory_sources_failed_total";

/// Inventory: 수집된 원시 항목 수 (counter)
pub const INVENTORY_ENTRIES_COLLECTED_TOTAL: &str = "appwarden_inventory_entries_collected_total";

/// Inventory: 중복 병합으로 제거된 항목 수 (counter)
pub const INVENTORY_DUPLICATES_MERGED_TOTAL: &str = "appwarden_inventory_duplicates_merged_total";

// ─── Search 메트릭 ──────────────────────────────────────────────────

/// Search: 실행된 검색 수 (counter, label: mode)
pub const SEARCH_QUERIES_TOTAL: &str = "appwarden_search_queries_total";

/// Search: 반환된 매칭 결과 수 (counter, label: mode)
pub const SEARCH_MATCHES_TOTAL: &str = "appwarden_search_matches_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        INVENTORY_SOURCES_SCANNED_TOTAL,
        "Inventory sources scanned successfully"
    );
    describe_counter!(
        INVENTORY_SOURCES_FAILED_TOTAL,
        "Inventory sources skipped because they were unavailable"
    );
    describe_counter!(
        INVENTORY_ENTRIES_COLLECTED_TOTAL,
        "Raw software entries collected before filtering"
    );
    describe_counter!(
        INVENTORY_DUPLICATES_MERGED_TOTAL,
        "Entries removed by duplicate reconciliation"
    );
    describe_counter!(SEARCH_QUERIES_TOTAL, "Search calls executed");
    describe_counter!(SEARCH_MATCHES_TOTAL, "Match results returned by search");
}
