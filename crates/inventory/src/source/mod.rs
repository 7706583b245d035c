//! 소스 백엔드 -- 레지스트리, 패키지 카탈로그, 간접 문자열 로더
//!
//! 스캐너는 플랫폼 API를 직접 호출하지 않고 이 모듈의 trait을 통해서만
//! 소스를 읽습니다. 구현체:
//!
//! - [`RegistrySnapshot`]: JSON 스냅샷 (모든 플랫폼, 테스트/오프라인 감사용)
//! - `WindowsRegistry`, `ShellIndirectStrings`: 네이티브 Windows API (`cfg(windows)`)
//! - [`UnavailableCatalog`], [`NoIndirectStrings`]: 기능이 없는 플랫폼용

pub mod snapshot;
#[cfg(windows)]
pub mod windows;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InventoryScannerError;
use crate::types::{PackageDescriptor, View};

pub use snapshot::{KeyNode, RegValue, RegistrySnapshot};
#[cfg(windows)]
pub use windows::{ShellIndirectStrings, WindowsRegistry};

/// Uninstall 레코드가 위치한 하위 키 경로
pub const UNINSTALL_PATH: &str = r"Software\Microsoft\Windows\CurrentVersion\Uninstall";

/// 레지스트리 하이브
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hive {
    /// HKEY_LOCAL_MACHINE
    LocalMachine,
    /// HKEY_CURRENT_USER
    CurrentUser,
    /// HKEY_USERS
    Users,
}

impl Hive {
    /// 짧은 하이브 이름 (HKLM, HKCU, HKU)
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::LocalMachine => "HKLM",
            Self::CurrentUser => "HKCU",
            Self::Users => "HKU",
        }
    }
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// 계층형 키/값 네임스페이스 읽기 인터페이스
///
/// 키가 없거나 접근이 거부되면 `SourceUnavailable`을 반환합니다.
/// 값이 없으면 에러가 아닌 `Ok(None)`입니다.
pub trait RegistryAccess: Send + Sync {
    /// 하위 키 이름 목록을 반환합니다.
    fn subkeys(&self, hive: Hive, view: View, path: &str)
    -> Result<Vec<String>, InventoryScannerError>;

    /// 문자열 값을 읽습니다.
    fn string_value(
        &self,
        hive: Hive,
        view: View,
        path: &str,
        name: &str,
    ) -> Result<Option<String>, InventoryScannerError>;

    /// DWORD 값을 읽습니다.
    fn dword_value(
        &self,
        hive: Hive,
        view: View,
        path: &str,
        name: &str,
    ) -> Result<Option<u32>, InventoryScannerError>;
}

/// 패키지 카탈로그 (Store/MSIX)
pub trait PackageCatalog: Send + Sync {
    /// 설치된 패키지 목록을 반환합니다.
    ///
    /// `all_users`가 true이면 모든 사용자의 패키지를 요청합니다 (권한 필요).
    fn packages(&self, all_users: bool) -> Result<Vec<PackageDescriptor>, InventoryScannerError>;
}

/// `@file,-id` 형식 간접 문자열 로더
pub trait IndirectStringLoader: Send + Sync {
    /// 간접 참조를 실제 문자열로 변환합니다.
    fn load(&self, reference: &str) -> Result<String, InventoryScannerError>;
}

/// 패키지 카탈로그를 사용할 수 없는 환경
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableCatalog;

impl PackageCatalog for UnavailableCatalog {
    fn packages(&self, _all_users: bool) -> Result<Vec<PackageDescriptor>, InventoryScannerError> {
        Err(InventoryScannerError::CapabilityUnavailable(
            "package catalog is not available on this platform".to_owned(),
        ))
    }
}

/// 간접 문자열 로딩을 지원하지 않는 환경
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndirectStrings;

impl IndirectStringLoader for NoIndirectStrings {
    fn load(&self, reference: &str) -> Result<String, InventoryScannerError> {
        Err(InventoryScannerError::ResolutionFailure {
            reference: reference.to_owned(),
            reason: "indirect string loading is not supported on this platform".to_owned(),
        })
    }
}
