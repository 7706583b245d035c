//! 설정 관리 -- appwarden.toml 파싱 및 런타임 설정
//!
//! [`AppwardenConfig`]는 모든 섹션의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`APPWARDEN_SEARCH_THRESHOLD=80` 형식)
//! 3. 설정 파일 (`appwarden.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), appwarden_core::error::AppwardenError> {
//! use appwarden_core::config::AppwardenConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = AppwardenConfig::load("appwarden.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = AppwardenConfig::parse("[search]\nthreshold = 80")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppwardenError, ConfigError};

/// 허용되는 검색 모드
pub const VALID_MATCH_MODES: [&str; 2] = ["fuzzy", "substring"];

/// appwarden 통합 설정
///
/// `appwarden.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppwardenConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 인벤토리 수집 설정
    #[serde(default)]
    pub inventory: InventoryConfig,
    /// 검색 설정
    #[serde(default)]
    pub search: SearchConfig,
    /// 제한 소프트웨어 감사 설정
    #[serde(default)]
    pub audit: AuditConfig,
}

impl AppwardenConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AppwardenError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값에 환경변수만 적용하여 반환합니다.
    ///
    /// 파일이 존재하지만 파싱/검증에 실패하면 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, AppwardenError> {
        let path = path.as_ref();
        match Self::load(path).await {
            Err(AppwardenError::Config(ConfigError::FileNotFound { .. })) => {
                debug!(path = %path.display(), "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, AppwardenError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppwardenError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                AppwardenError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, AppwardenError> {
        toml::from_str(toml_str).map_err(|e| {
            AppwardenError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `APPWARDEN_{SECTION}_{FIELD}`
    /// 예: `APPWARDEN_INVENTORY_INCLUDE_PACKAGED=true`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "APPWARDEN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "APPWARDEN_GENERAL_LOG_FORMAT");

        // Inventory
        override_bool(
            &mut self.inventory.include_machine,
            "APPWARDEN_INVENTORY_INCLUDE_MACHINE",
        );
        override_bool(
            &mut self.inventory.include_current_user,
            "APPWARDEN_INVENTORY_INCLUDE_CURRENT_USER",
        );
        override_bool(
            &mut self.inventory.include_other_users,
            "APPWARDEN_INVENTORY_INCLUDE_OTHER_USERS",
        );
        override_bool(
            &mut self.inventory.include_packaged,
            "APPWARDEN_INVENTORY_INCLUDE_PACKAGED",
        );
        override_bool(
            &mut self.inventory.packaged_all_users,
            "APPWARDEN_INVENTORY_PACKAGED_ALL_USERS",
        );
        override_bool(
            &mut self.inventory.filter_system_components,
            "APPWARDEN_INVENTORY_FILTER_SYSTEM_COMPONENTS",
        );
        override_bool(
            &mut self.inventory.deduplicate,
            "APPWARDEN_INVENTORY_DEDUPLICATE",
        );
        override_bool(
            &mut self.inventory.concurrent,
            "APPWARDEN_INVENTORY_CONCURRENT",
        );
        override_string(
            &mut self.inventory.snapshot_path,
            "APPWARDEN_INVENTORY_SNAPSHOT_PATH",
        );

        // Search
        override_string(&mut self.search.mode, "APPWARDEN_SEARCH_MODE");
        override_u8(&mut self.search.threshold, "APPWARDEN_SEARCH_THRESHOLD");
        override_usize(&mut self.search.cap, "APPWARDEN_SEARCH_CAP");

        // Audit
        override_string(&mut self.audit.mode, "APPWARDEN_AUDIT_MODE");
        override_u8(&mut self.audit.threshold, "APPWARDEN_AUDIT_THRESHOLD");
        override_usize(&mut self.audit.cap, "APPWARDEN_AUDIT_CAP");
        override_bool(
            &mut self.audit.include_packaged,
            "APPWARDEN_AUDIT_INCLUDE_PACKAGED",
        );
        override_string(&mut self.audit.lists_dir, "APPWARDEN_AUDIT_LISTS_DIR");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AppwardenError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        validate_match_settings(
            "search",
            &self.search.mode,
            self.search.threshold,
            self.search.cap,
        )?;
        validate_match_settings(
            "audit",
            &self.audit.mode,
            self.audit.threshold,
            self.audit.cap,
        )?;

        // 스냅샷 경로: 지정된 경우 경로 순회 패턴 금지
        if !self.inventory.snapshot_path.is_empty()
            && Path::new(&self.inventory.snapshot_path)
                .components()
                .any(|c| c == std::path::Component::ParentDir)
        {
            return Err(ConfigError::InvalidValue {
                field: "inventory.snapshot_path".to_owned(),
                reason: "snapshot_path contains path traversal pattern '..'".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

fn validate_match_settings(
    section: &str,
    mode: &str,
    threshold: u8,
    cap: usize,
) -> Result<(), AppwardenError> {
    if !VALID_MATCH_MODES.contains(&mode) {
        return Err(ConfigError::InvalidValue {
            field: format!("{section}.mode"),
            reason: format!("must be one of: {}", VALID_MATCH_MODES.join(", ")),
        }
        .into());
    }

    if threshold > 100 {
        return Err(ConfigError::InvalidValue {
            field: format!("{section}.threshold"),
            reason: "must be 0-100".to_owned(),
        }
        .into());
    }

    if cap == 0 {
        return Err(ConfigError::InvalidValue {
            field: format!("{section}.cap"),
            reason: "must be at least 1".to_owned(),
        }
        .into());
    }

    Ok(())
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 인벤토리 수집 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// 머신 범위(HKLM) 스캔 여부
    pub include_machine: bool,
    /// 현재 사용자 범위(HKCU) 스캔 여부
    pub include_current_user: bool,
    /// 다른 로컬 사용자 프로필(HKU\<SID>) 스캔 여부
    pub include_other_users: bool,
    /// 패키지 앱 카탈로그 포함 여부
    pub include_packaged: bool,
    /// 패키지 카탈로그를 모든 사용자 기준으로 조회할지 여부
    pub packaged_all_users: bool,
    /// 시스템 구성요소 필터링 여부
    pub filter_system_components: bool,
    /// 중복 항목 병합 여부
    pub deduplicate: bool,
    /// 소스별 스캔을 동시에 실행할지 여부
    pub concurrent: bool,
    /// 레지스트리 스냅샷(JSON) 경로. 비어 있으면 네이티브 레지스트리 사용
    pub snapshot_path: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            include_machine: true,
            include_current_user: true,
            include_other_users: true,
            include_packaged: false,
            packaged_all_users: false,
            filter_system_components: true,
            deduplicate: true,
            concurrent: true,
            snapshot_path: String::new(),
        }
    }
}

/// 검색 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 매칭 모드 (fuzzy, substring)
    pub mode: String,
    /// fuzzy 모드 최소 점수 (0-100)
    pub threshold: u8,
    /// 패턴당 최대 후보 수
    pub cap: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: "fuzzy".to_owned(),
            threshold: 70,
            cap: 200,
        }
    }
}

/// 제한 소프트웨어 감사 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// 매칭 모드 (fuzzy, substring)
    pub mode: String,
    /// fuzzy 모드 최소 점수 (0-100)
    pub threshold: u8,
    /// 패턴당 최대 후보 수
    pub cap: usize,
    /// 감사 시 패키지 앱 카탈로그 포함 여부
    pub include_packaged: bool,
    /// 제한 목록(.txt) 디렉토리
    pub lists_dir: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            mode: "fuzzy".to_owned(),
            threshold: 81,
            cap: 200,
            include_packaged: false,
            lists_dir: "ProgramList".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u8(target: &mut u8, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u8>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u8 from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = AppwardenConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.log_format, "pretty");
        assert!(config.inventory.include_machine);
        assert!(!config.inventory.include_packaged);
        assert!(config.inventory.filter_system_components);
        assert_eq!(config.search.mode, "fuzzy");
        assert_eq!(config.search.threshold, 70);
        assert_eq!(config.search.cap, 200);
        assert_eq!(config.audit.threshold, 81);
    }

    #[test]
    fn default_config_passes_validation() {
        AppwardenConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = AppwardenConfig::parse("").unwrap();
        assert_eq!(config.search.threshold, 70);
        assert!(config.inventory.deduplicate);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[search]
mode = "substring"

[inventory]
include_packaged = true
"#;
        let config = AppwardenConfig::parse(toml).unwrap();
        assert_eq!(config.search.mode, "substring");
        // threshold는 기본값 유지
        assert_eq!(config.search.threshold, 70);
        assert!(config.inventory.include_packaged);
        assert!(config.inventory.include_machine);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = AppwardenConfig::parse("[search\nmode = 1").unwrap_err();
        assert!(matches!(
            err,
            AppwardenError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let mut config = AppwardenConfig::default();
        config.general.log_level = "verbose".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let mut config = AppwardenConfig::default();
        config.general.log_format = "xml".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_search_mode() {
        let mut config = AppwardenConfig::default();
        config.search.mode = "regex".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("search.mode"));
    }

    #[test]
    fn validate_rejects_threshold_above_100() {
        let mut config = AppwardenConfig::default();
        config.audit.threshold = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("audit.threshold"));
    }

    #[test]
    fn validate_rejects_zero_cap() {
        let mut config = AppwardenConfig::default();
        config.search.cap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_snapshot_path_traversal() {
        let mut config = AppwardenConfig::default();
        config.inventory.snapshot_path = "../../etc/snapshot.json".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_serialize_roundtrip_through_toml() {
        let config = AppwardenConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed = AppwardenConfig::parse(&text).unwrap();
        assert_eq!(parsed.audit.lists_dir, config.audit.lists_dir);
        assert_eq!(parsed.search.cap, config.search.cap);
    }
}
