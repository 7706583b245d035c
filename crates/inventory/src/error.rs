//! 인벤토리 에러 타입
//!
//! [`InventoryScannerError`]는 인벤토리 수집과 검색 중 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<InventoryScannerError> for AppwardenError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **소스 접근**: `SourceUnavailable`, `CapabilityUnavailable`
//! - **이름 해석**: `ResolutionFailure`
//! - **입력 파일**: `Snapshot`, `PatternList`, `Io`
//! - **설정**: `Config`
//! - **작업 실행**: `Task`
//!
//! 소스 접근/이름 해석 에러는 수집 경계에서 로그만 남기고 빈 기여로 처리됩니다.

use appwarden_core::error::{AppwardenError, ConfigError, InventoryError};

/// 인벤토리 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum InventoryScannerError {
    /// 소스 네임스페이스가 없거나 접근 거부됨
    #[error("source unavailable: {source_name}: {reason}")]
    SourceUnavailable {
        /// 소스 식별자 (예: `HKLM\Software\...` (64))
        source_name: String,
        /// 실패 사유
        reason: String,
    },

    /// 간접 문자열 참조 해석 실패
    #[error("failed to resolve '{reference}': {reason}")]
    ResolutionFailure {
        /// 원본 참조 문자열 (`@file,-id`)
        reference: String,
        /// 실패 사유
        reason: String,
    },

    /// 이 플랫폼/빌드에서 사용할 수 없는 기능
    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// 레지스트리 스냅샷 로드/파싱 실패
    #[error("snapshot error: {path}: {reason}")]
    Snapshot {
        /// 스냅샷 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 제한 목록 파일 로드 실패
    #[error("pattern list error: {path}: {reason}")]
    PatternList {
        /// 목록 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 백그라운드 작업 실패 (join 에러)
    #[error("task error: {0}")]
    Task(String),
}

impl From<InventoryScannerError> for AppwardenError {
    fn from(err: InventoryScannerError) -> Self {
        match err {
            InventoryScannerError::Config { field, reason } => {
                AppwardenError::Config(ConfigError::InvalidValue { field, reason })
            }
            InventoryScannerError::Io { source, .. } => AppwardenError::Io(source),
            InventoryScannerError::Snapshot { path, reason } => AppwardenError::Inventory(
                InventoryError::Snapshot(format!("{path}: {reason}")),
            ),
            InventoryScannerError::PatternList { path, reason } => AppwardenError::Inventory(
                InventoryError::PatternList(format!("{path}: {reason}")),
            ),
            InventoryScannerError::Task(msg) => {
                AppwardenError::Inventory(InventoryError::CollectFailed(msg))
            }
            other @ (InventoryScannerError::SourceUnavailable { .. }
            | InventoryScannerError::ResolutionFailure { .. }
            | InventoryScannerError::CapabilityUnavailable(_)) => {
                AppwardenError::Inventory(InventoryError::SourceFailed(other.to_string()))
            }
        }
    }
}
