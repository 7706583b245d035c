//! 에러 타입 -- 도메인별 에러 정의

/// appwarden 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum AppwardenError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 인벤토리 수집 / 검색 에러
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 인벤토리 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// 데이터 소스 접근 실패
    #[error("source failed: {0}")]
    SourceFailed(String),

    /// 레지스트리 스냅샷 로드 실패
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// 검색 패턴 목록 로드 실패
    #[error("pattern list error: {0}")]
    PatternList(String),

    /// 수집 작업 실패
    #[error("collect failed: {0}")]
    CollectFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: AppwardenError = ConfigError::InvalidValue {
            field: "search.cap".to_owned(),
            reason: "must be at least 1".to_owned(),
        }
        .into();
        assert!(matches!(err, AppwardenError::Config(_)));
        assert!(err.to_string().contains("search.cap"));
    }

    #[test]
    fn inventory_error_display() {
        let err = InventoryError::Snapshot("missing hives".to_owned());
        assert_eq!(err.to_string(), "snapshot error: missing hives");

        let top: AppwardenError = err.into();
        assert!(top.to_string().starts_with("inventory error:"));
    }

    #[test]
    fn io_error_converts_to_top_level() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppwardenError = io_err.into();
        assert!(matches!(err, AppwardenError::Io(_)));
    }
}
