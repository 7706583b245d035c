//! 인벤토리 수집 설정
//!
//! [`InventoryScannerConfig`]는 core의 [`InventoryConfig`](appwarden_core::config::InventoryConfig)에서
//! 소스 선택, 필터/병합 토글, 동시 실행 여부를 가져옵니다.
//!
//! # 사용 예시
//!
//! ```
//! use appwarden_inventory::InventoryScannerConfigBuilder;
//!
//! let config = InventoryScannerConfigBuilder::new()
//!     .include_packaged(true)
//!     .concurrent(false)
//!     .build()
//!     .unwrap();
//! assert!(config.include_packaged);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::InventoryScannerError;

/// 인벤토리 수집 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryScannerConfig {
    /// 머신 범위 스캔
    pub include_machine: bool,
    /// 현재 사용자 범위 스캔
    pub include_current_user: bool,
    /// 다른 로컬 사용자 프로필 스캔
    pub include_other_users: bool,
    /// 패키지 카탈로그 포함
    pub include_packaged: bool,
    /// 패키지 카탈로그를 모든 사용자 기준으로 조회
    pub packaged_all_users: bool,
    /// 시스템 구성요소 제외
    pub filter_system_components: bool,
    /// 중복 병합
    pub deduplicate: bool,
    /// 소스 스캔 동시 실행
    pub concurrent: bool,
}

impl Default for InventoryScannerConfig {
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
        }
    }
}

impl InventoryScannerConfig {
    /// core의 `InventoryConfig`에서 설정을 생성합니다.
    pub fn from_core(core: &appwarden_core::config::InventoryConfig) -> Self {
        Self {
            include_machine: core.include_machine,
            include_current_user: core.include_current_user,
            include_other_users: core.include_other_users,
            include_packaged: core.include_packaged,
            packaged_all_users: core.packaged_all_users,
            filter_system_components: core.filter_system_components,
            deduplicate: core.deduplicate,
            concurrent: core.concurrent,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// 최소 한 개의 소스가 선택되어야 합니다.
    pub fn validate(&self) -> Result<(), InventoryScannerError> {
        let any_source = self.include_machine
            || self.include_current_user
            || self.include_other_users
            || self.include_packaged;
        if !any_source {
            return Err(InventoryScannerError::Config {
                field: "inventory".to_owned(),
                reason: "at least one source must be enabled".to_owned(),
            });
        }
        Ok(())
    }
}

/// [`InventoryScannerConfig`] 빌더
#[derive(Default)]
pub struct InventoryScannerConfigBuilder {
    config: InventoryScannerConfig,
}

impl InventoryScannerConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 머신 범위 스캔 여부를 설정합니다.
    pub fn include_machine(mut self, enabled: bool) -> Self {
        self.config.include_machine = enabled;
        self
    }

    /// 현재 사용자 범위 스캔 여부를 설정합니다.
    pub fn include_current_user(mut self, enabled: bool) -> Self {
        self.config.include_current_user = enabled;
        self
    }

    /// 다른 사용자 프로필 스캔 여부를 설정합니다.
    pub fn include_other_users(mut self, enabled: bool) -> Self {
        self.config.include_other_users = enabled;
        self
    }

    /// 패키지 카탈로그 포함 여부를 설정합니다.
    pub fn include_packaged(mut self, enabled: bool) -> Self {
        self.config.include_packaged = enabled;
        self
    }

    /// 패키지 카탈로그 전체 사용자 조회 여부를 설정합니다.
    pub fn packaged_all_users(mut self, enabled: bool) -> Self {
        self.config.packaged_all_users = enabled;
        self
    }

    /// 시스템 구성요소 필터링 여부를 설정합니다.
    pub fn filter_system_components(mut self, enabled: bool) -> Self {
        self.config.filter_system_components = enabled;
        self
    }

    /// 중복 병합 여부를 설정합니다.
    pub fn deduplicate(mut self, enabled: bool) -> Self {
        self.config.deduplicate = enabled;
        self
    }

    /// 동시 실행 여부를 설정합니다.
    pub fn concurrent(mut self, enabled: bool) -> Self {
        self.config.concurrent = enabled;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `InventoryScannerError::Config` 반환
    pub fn build(self) -> Result<InventoryScannerConfig, InventoryScannerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
