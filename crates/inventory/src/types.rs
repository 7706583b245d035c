//! 도메인 타입 -- 인벤토리 전용 데이터 구조
//!
//! 설치 항목, 소스 키, 스코프/뷰 등 인벤토리 핵심 타입을 정의합니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 설치 항목 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// 레지스트리 Uninstall 레코드
    Native,
    /// 패키지 카탈로그 (Store/MSIX) 항목
    Packaged,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Packaged => write!(f, "packaged"),
        }
    }
}

/// 설치 스코프
///
/// 중복 병합 시 우선순위는 `Machine > CurrentUser > OtherUser` 입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// 머신 전체 (HKLM)
    Machine,
    /// 현재 사용자 (HKCU)
    CurrentUser,
    /// 다른 사용자 프로파일 (HKU\<SID>)
    OtherUser(String),
}

impl Scope {
    /// 중복 병합 우선순위 (높을수록 우선)
    pub fn rank(&self) -> i8 {
        match self {
            Self::Machine => 2,
            Self::CurrentUser => 1,
            Self::OtherUser(_) => 0,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Machine => write!(f, "machine"),
            Self::CurrentUser => write!(f, "current-user"),
            Self::OtherUser(sid) => write!(f, "user:{sid}"),
        }
    }
}

/// 레지스트리 뷰 (WOW64 리다이렉션)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum View {
    /// 32비트 뷰
    #[serde(rename = "32")]
    Bits32,
    /// 64비트 뷰
    #[serde(rename = "64")]
    Bits64,
}

impl View {
    /// 스캔 순서 (64비트 뷰 먼저)
    pub const ALL: [View; 2] = [View::Bits64, View::Bits32];

    /// 중복 병합 우선순위 (64비트 우선)
    pub fn rank(&self) -> i8 {
        match self {
            Self::Bits64 => 1,
            Self::Bits32 => 0,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bits32 => write!(f, "32"),
            Self::Bits64 => write!(f, "64"),
        }
    }
}

/// 항목이 수집된 소스의 종류
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceOrigin {
    /// 레지스트리 Uninstall 네임스페이스
    Registry {
        /// 설치 스코프
        scope: Scope,
        /// 레지스트리 뷰
        view: View,
    },
    /// 패키지 카탈로그
    PackageCatalog,
}

/// 항목의 출처 (소스 + 레코드 경로)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceKey {
    /// 소스 종류
    pub origin: SourceOrigin,
    /// 레코드 경로 (레지스트리 키 경로 또는 패키지 full name)
    pub path: String,
}

impl SourceKey {
    /// 레지스트리 레코드 소스 키를 생성합니다.
    pub fn registry(scope: Scope, view: View, path: impl Into<String>) -> Self {
        Self {
            origin: SourceOrigin::Registry { scope, view },
            path: path.into(),
        }
    }

    /// 패키지 카탈로그 소스 키를 생성합니다.
    pub fn package(path: impl Into<String>) -> Self {
        Self {
            origin: SourceOrigin::PackageCatalog,
            path: path.into(),
        }
    }

    /// 중복 병합 우선순위 튜플 `(scope, view)`
    ///
    /// 사전식 비교에서 큰 값이 이깁니다. 패키지 항목은 `(-1, 0)`으로
    /// 어떤 레지스트리 항목보다 낮습니다.
    pub fn rank(&self) -> (i8, i8) {
        match &self.origin {
            SourceOrigin::Registry { scope, view } => (scope.rank(), view.rank()),
            SourceOrigin::PackageCatalog => (-1, 0),
        }
    }

    /// 짧은 소스 레이블 (로그/메트릭 용)
    pub fn label(&self) -> String {
        match &self.origin {
            SourceOrigin::Registry { scope, view } => format!("{scope}/{view}"),
            SourceOrigin::PackageCatalog => "packaged".to_owned(),
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.label())
    }
}

/// 설치 소프트웨어 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// 항목 종류
    pub kind: EntryKind,
    /// 해석된 표시 이름 (비어 있지 않음)
    pub display_name: String,
    /// 버전
    pub version: Option<String>,
    /// 게시자
    pub publisher: Option<String>,
    /// 설치 경로
    pub install_location: Option<String>,
    /// 제거 명령
    pub uninstall_command: Option<String>,
    /// 출처
    pub source: SourceKey,
    /// 시스템 구성요소 여부 (SystemComponent == 1)
    pub is_system_component: bool,
    /// 소스별 부가 정보
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Entry {
    /// 중복 판별용 식별 키를 계산합니다.
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            name: normalize(&self.display_name),
            version: normalize(self.version.as_deref().unwrap_or_default()),
            publisher: normalize(self.publisher.as_deref().unwrap_or_default()),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)?;
        if let Some(version) = &self.version {
            write!(f, " {version}")?;
        }
        if let Some(publisher) = &self.publisher {
            write!(f, " ({publisher})")?;
        }
        Ok(())
    }
}

/// 정규화된 `(name, version, publisher)` 식별 키
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    /// 정규화된 이름
    pub name: String,
    /// 정규화된 버전 (없으면 빈 문자열)
    pub version: String,
    /// 정규화된 게시자 (없으면 빈 문자열)
    pub publisher: String,
}

/// 패키지 카탈로그가 보고하는 패키지 정보
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageDescriptor {
    /// 표시 이름
    pub name: Option<String>,
    /// 패키지 패밀리 이름
    pub family_name: Option<String>,
    /// 패키지 full name
    pub full_name: Option<String>,
    /// 버전
    pub version: Option<String>,
    /// 게시자
    pub publisher: Option<String>,
    /// 설치 경로
    pub install_location: Option<String>,
    /// 프레임워크 패키지 여부
    pub is_framework: bool,
}

/// 비교용 문자열 정규화 (소문자화 후 앞뒤 공백 제거)
pub fn normalize(s: &str) -> String {
    s.to_lowercase().trim().to_owned()
}

/// 앞뒤 공백을 제거하고, 비어 있으면 `None`을 반환합니다.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}
