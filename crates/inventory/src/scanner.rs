//! 소스 스캐너 -- 소스별 원시 레코드 수집
//!
//! [`SourceScanner`]는 스코프 x 뷰 조합의 Uninstall 네임스페이스와 패키지 카탈로그를
//! 읽어 [`Entry`] 목록을 만듭니다.
//!
//! # 소스 구성
//!
//! 1. 머신 범위 (64비트, 32비트 뷰)
//! 2. 현재 사용자 (64비트, 32비트 뷰)
//! 3. 다른 로컬 사용자 SID 각각 (64비트, 32비트 뷰)
//! 4. 패키지 카탈로그 (선택)
//!
//! 소스 단위 호출([`SourceScanner::scan_source`])은 `Result`를 반환하고,
//! 수집 경계([`SourceScanner::scan`], [`InventoryCollector`](crate::InventoryCollector))에서
//! 한 번만 skip-and-log 처리합니다.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, warn};

use appwarden_core::metrics as m;

use crate::config::InventoryScannerConfig;
use crate::error::InventoryScannerError;
use crate::resolver::NameResolver;
use crate::source::{Hive, IndirectStringLoader, PackageCatalog, RegistryAccess, UNINSTALL_PATH};
use crate::types::{Entry, EntryKind, PackageDescriptor, Scope, SourceKey, View, non_empty};

/// 로컬 사용자 SID 패턴
static USER_SID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^S-\d-\d+-(\d+-){1,14}\d+$").expect("valid SID pattern")
});

/// 사용자 하이브 중 `_Classes` 접미사를 가진 항목은 프로필이 아닙니다.
const CLASSES_SUFFIX: &str = "_Classes";

/// 하위 키 이름이 로컬 사용자 SID인지 판별합니다.
pub fn is_user_identity(name: &str) -> bool {
    !name.ends_with(CLASSES_SUFFIX) && USER_SID.is_match(name)
}

/// 스코프의 Uninstall 네임스페이스 위치 `(hive, path)`
fn uninstall_location(scope: &Scope) -> (Hive, String) {
    match scope {
        Scope::Machine => (Hive::LocalMachine, UNINSTALL_PATH.to_owned()),
        Scope::CurrentUser => (Hive::CurrentUser, UNINSTALL_PATH.to_owned()),
        Scope::OtherUser(sid) => (Hive::Users, format!("{sid}\\{UNINSTALL_PATH}")),
    }
}

/// 스캔할 단일 소스
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceSpec {
    /// 레지스트리 Uninstall 네임스페이스
    Registry {
        /// 설치 스코프
        scope: Scope,
        /// 레지스트리 뷰
        view: View,
    },
    /// 패키지 카탈로그
    PackageCatalog {
        /// 모든 사용자 기준 조회
        all_users: bool,
    },
}

impl SourceSpec {
    /// 레지스트리 위치 `(hive, path)`를 반환합니다. 패키지 소스는 `None`.
    pub fn registry_location(&self) -> Option<(Hive, String)> {
        match self {
            Self::Registry { scope, .. } => Some(uninstall_location(scope)),
            Self::PackageCatalog { .. } => None,
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry { scope, view } => write!(f, "{scope}/{view}"),
            Self::PackageCatalog { .. } => write!(f, "packaged"),
        }
    }
}

/// 소스 스캐너
///
/// 플랫폼 접근은 주입된 trait 객체를 통해서만 이루어집니다.
#[derive(Clone)]
pub struct SourceScanner {
    registry: Arc<dyn RegistryAccess>,
    catalog: Arc<dyn PackageCatalog>,
    strings: Arc<dyn IndirectStringLoader>,
}

impl SourceScanner {
    /// 새 스캐너를 생성합니다.
    pub fn new(
        registry: Arc<dyn RegistryAccess>,
        catalog: Arc<dyn PackageCatalog>,
        strings: Arc<dyn IndirectStringLoader>,
    ) -> Self {
        Self {
            registry,
            catalog,
            strings,
        }
    }

    /// 사용자 하이브 루트에서 로컬 사용자 SID 목록을 찾습니다.
    pub fn discover_user_identities(&self) -> Result<Vec<String>, InventoryScannerError> {
        let names = self.registry.subkeys(Hive::Users, View::Bits64, "")?;
        Ok(names
            .into_iter()
            .filter(|name| is_user_identity(name))
            .collect())
    }

    /// 설정에 따라 스캔할 소스 목록을 만듭니다.
    ///
    /// 사용자 SID 탐색에 실패하면 다른 사용자 소스 없이 계속합니다.
    pub fn plan(&self, config: &InventoryScannerConfig) -> Vec<SourceSpec> {
        let mut scopes = Vec::new();
        if config.include_machine {
            scopes.push(Scope::Machine);
        }
        if config.include_current_user {
            scopes.push(Scope::CurrentUser);
        }
        if config.include_other_users {
            match self.discover_user_identities() {
                Ok(sids) => scopes.extend(sids.into_iter().map(Scope::OtherUser)),
                Err(e) => warn!(error = %e, "failed to enumerate user profiles, skipping"),
            }
        }

        let mut plan: Vec<SourceSpec> = scopes
            .into_iter()
            .flat_map(|scope| {
                View::ALL.into_iter().map(move |view| SourceSpec::Registry {
                    scope: scope.clone(),
                    view,
                })
            })
            .collect();
        if config.include_packaged {
            plan.push(SourceSpec::PackageCatalog {
                all_users: config.packaged_all_users,
            });
        }
        debug!(sources = plan.len(), "source plan built");
        plan
    }

    /// 소스 목록을 순서대로 스캔합니다.
    ///
    /// 접근할 수 없는 소스는 로그를 남기고 건너뜁니다.
    pub fn scan(&self, specs: &[SourceSpec]) -> Vec<Entry> {
        specs
            .iter()
            .filter_map(|spec| absorb(spec, self.scan_source(spec)))
            .flatten()
            .collect()
    }

    /// 단일 소스를 스캔합니다.
    ///
    /// # Errors
    ///
    /// - 네임스페이스가 없거나 접근 불가: `SourceUnavailable`
    /// - 패키지 카탈로그 미지원: `CapabilityUnavailable`
    pub fn scan_source(&self, spec: &SourceSpec) -> Result<Vec<Entry>, InventoryScannerError> {
        match spec {
            SourceSpec::Registry { scope, view } => self.scan_registry(scope, *view),
            SourceSpec::PackageCatalog { all_users } => self.scan_packaged(*all_users),
        }
    }

    fn scan_registry(&self, scope: &Scope, view: View) -> Result<Vec<Entry>, InventoryScannerError> {
        let (hive, base) = uninstall_location(scope);
        let names = self.registry.subkeys(hive, view, &base)?;
        let resolver = NameResolver::new(self.strings.as_ref());

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let path = format!("{base}\\{name}");
            match self.read_record(scope, hive, view, &path, &resolver) {
                Ok(Some(mut entry)) => {
                    entry.extra.insert("RegistryKeyName".to_owned(), name);
                    entries.push(entry);
                }
                Ok(None) => debug!(hive = %hive, path = %path, "record has no display name, skipping"),
                Err(e) => debug!(hive = %hive, path = %path, error = %e, "failed to read record, skipping"),
            }
        }
        debug!(scope = %scope, view = %view, entries = entries.len(), "registry source scanned");
        Ok(entries)
    }

    /// 단일 Uninstall 레코드를 읽습니다. 표시 이름이 없으면 `None`.
    fn read_record(
        &self,
        scope: &Scope,
        hive: Hive,
        view: View,
        path: &str,
        resolver: &NameResolver<'_>,
    ) -> Result<Option<Entry>, InventoryScannerError> {
        let read = |name: &str| -> Result<Option<String>, InventoryScannerError> {
            Ok(non_empty(self.registry.string_value(hive, view, path, name)?))
        };

        let raw_name = match read("DisplayName")? {
            Some(name) => Some(name),
            None => read("DisplayNameResource")?,
        };
        let Some(raw_name) = raw_name else {
            return Ok(None);
        };
        let display_name = resolver.resolve(&raw_name);
        if display_name.is_empty() {
            return Ok(None);
        }

        let is_system_component =
            self.registry.dword_value(hive, view, path, "SystemComponent")? == Some(1);

        Ok(Some(Entry {
            kind: EntryKind::Native,
            display_name,
            version: read("DisplayVersion")?,
            publisher: read("Publisher")?,
            install_location: read("InstallLocation")?,
            uninstall_command: read("UninstallString")?,
            source: SourceKey::registry(scope.clone(), view, format!("{hive}\\{path}")),
            is_system_component,
            extra: BTreeMap::new(),
        }))
    }

    fn scan_packaged(&self, all_users: bool) -> Result<Vec<Entry>, InventoryScannerError> {
        let packages = self.catalog.packages(all_users)?;
        let resolver = NameResolver::new(self.strings.as_ref());
        let entries: Vec<Entry> = packages
            .into_iter()
            .filter_map(|package| package_entry(package, &resolver))
            .collect();
        debug!(all_users, entries = entries.len(), "package catalog scanned");
        Ok(entries)
    }
}

/// 패키지 정보를 항목으로 변환합니다. 이름이 없으면 `None`.
fn package_entry(package: PackageDescriptor, resolver: &NameResolver<'_>) -> Option<Entry> {
    let family_name = non_empty(package.family_name);
    let full_name = non_empty(package.full_name);
    let raw_name = non_empty(package.name).or_else(|| family_name.clone())?;
    let display_name = resolver.resolve(&raw_name);
    if display_name.is_empty() {
        return None;
    }

    let mut extra = BTreeMap::new();
    if let Some(family) = &family_name {
        extra.insert("PackageFamilyName".to_owned(), family.clone());
    }
    if let Some(full) = &full_name {
        extra.insert("PackageFullName".to_owned(), full.clone());
    }
    extra.insert("IsFramework".to_owned(), package.is_framework.to_string());

    let path = full_name.or(family_name).unwrap_or_else(|| display_name.clone());
    Some(Entry {
        kind: EntryKind::Packaged,
        display_name,
        version: non_empty(package.version),
        publisher: non_empty(package.publisher),
        install_location: non_empty(package.install_location),
        uninstall_command: None,
        source: SourceKey::package(path),
        is_system_component: false,
        extra,
    })
}

/// 소스 스캔 결과에 skip-and-log 정책을 적용합니다.
///
/// 성공하면 항목을, 실패하면 `None`을 반환합니다.
pub(crate) fn absorb(
    spec: &SourceSpec,
    result: Result<Vec<Entry>, InventoryScannerError>,
) -> Option<Vec<Entry>> {
    let label = spec.to_string();
    match result {
        Ok(entries) => {
            metrics::counter!(m::INVENTORY_SOURCES_SCANNED_TOTAL, m::LABEL_SOURCE => label)
                .increment(1);
            Some(entries)
        }
        Err(InventoryScannerError::CapabilityUnavailable(reason)) => {
            info!(source = %label, reason = %reason, "source capability unavailable, skipping");
            metrics::counter!(m::INVENTORY_SOURCES_FAILED_TOTAL, m::LABEL_SOURCE => label)
                .increment(1);
            None
        }
        Err(e) => {
            warn!(source = %label, error = %e, "source unavailable, skipping");
            metrics::counter!(m::INVENTORY_SOURCES_FAILED_TOTAL, m::LABEL_SOURCE => label)
                .increment(1);
            None
        }
    }
}
