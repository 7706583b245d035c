//! JSON 레지스트리 스냅샷 백엔드
//!
//! 레지스트리 트리, 패키지 카탈로그, 간접 문자열 리소스를 하나의 JSON 문서로
//! 제공합니다. 테스트와 오프라인 감사(다른 머신에서 수집한 스냅샷)에 사용됩니다.
//!
//! ```json
//! {
//!   "hives": {
//!     "local_machine": {
//!       "64": {
//!         "subkeys": {
//!           "Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall": {
//!             "subkeys": {
//!               "7-Zip": { "values": { "DisplayName": "7-Zip 23.01", "SystemComponent": 0 } }
//!             }
//!           }
//!         }
//!       }
//!     }
//!   },
//!   "packages": [ { "name": "Windows Terminal", "version": "1.19" } ],
//!   "resources": { "@%SystemRoot%\\system32\\shell32.dll,-22067": "Windows Mail" }
//! }
//! ```
//!
//! 하위 키 이름에 `\`가 포함되면 중첩 경로로 펼쳐집니다.
//! 키/값 이름 비교는 대소문자를 구분하지 않습니다.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Hive, IndirectStringLoader, PackageCatalog, RegistryAccess};
use crate::error::InventoryScannerError;
use crate::types::{PackageDescriptor, View};

/// 스냅샷 파일 최대 크기 (64 MB)
pub const MAX_SNAPSHOT_SIZE: u64 = 64 * 1024 * 1024;

/// 레지스트리 값 (DWORD 또는 문자열)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegValue {
    /// 정수 값
    Dword(u32),
    /// 문자열 값
    String(String),
}

impl RegValue {
    fn as_string(&self) -> String {
        match self {
            Self::Dword(n) => n.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    fn as_dword(&self) -> Option<u32> {
        match self {
            Self::Dword(n) => Some(*n),
            Self::String(s) => s.trim().parse().ok(),
        }
    }
}

impl From<&str> for RegValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<u32> for RegValue {
    fn from(value: u32) -> Self {
        Self::Dword(value)
    }
}

/// 레지스트리 키 노드
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyNode {
    /// 값 이름 → 값
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, RegValue>,
    /// 하위 키 이름 → 노드
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subkeys: BTreeMap<String, KeyNode>,
}

impl KeyNode {
    /// 값을 설정합니다.
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<RegValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    fn child(&self, name: &str) -> Option<&KeyNode> {
        self.subkeys
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, node)| node)
    }

    fn child_entry(&mut self, name: &str) -> &mut KeyNode {
        let key = self
            .subkeys
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned()
            .unwrap_or_else(|| name.to_owned());
        self.subkeys.entry(key).or_default()
    }

    fn value(&self, name: &str) -> Option<&RegValue> {
        self.values
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// `A\B\C` 형태의 하위 키 이름을 중첩 노드로 펼칩니다.
    fn expand(self) -> KeyNode {
        let mut out = KeyNode {
            values: self.values,
            subkeys: BTreeMap::new(),
        };
        for (name, child) in self.subkeys {
            let child = child.expand();
            let mut segs: Vec<&str> = segments(&name).collect();
            let Some(last) = segs.pop() else {
                continue;
            };
            let mut cursor = &mut out;
            for seg in segs {
                cursor = cursor.child_entry(seg);
            }
            cursor.child_entry(last).merge(child);
        }
        out
    }

    fn merge(&mut self, other: KeyNode) {
        self.values.extend(other.values);
        for (name, child) in other.subkeys {
            self.child_entry(&name).merge(child);
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('\\').filter(|seg| !seg.is_empty())
}

fn missing_key(hive: Hive, view: View, path: &str) -> InventoryScannerError {
    InventoryScannerError::SourceUnavailable {
        source_name: format!("{hive}\\{path} ({view})"),
        reason: "key not found in snapshot".to_owned(),
    }
}

/// JSON 레지스트리 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    hives: BTreeMap<Hive, BTreeMap<View, KeyNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    packages: Option<Vec<PackageDescriptor>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    resources: BTreeMap<String, String>,
}

impl RegistrySnapshot {
    /// 빈 스냅샷을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON 문자열에서 스냅샷을 파싱합니다.
    ///
    /// `origin`은 에러 메시지에 표시할 출처(파일 경로 등)입니다.
    pub fn from_json(content: &str, origin: &str) -> Result<Self, InventoryScannerError> {
        let raw: Self =
            serde_json::from_str(content).map_err(|e| InventoryScannerError::Snapshot {
                path: origin.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(raw.expanded())
    }

    /// 파일에서 스냅샷을 로드합니다.
    pub fn load(path: &Path) -> Result<Self, InventoryScannerError> {
        let shown = path.display().to_string();
        let metadata = std::fs::metadata(path).map_err(|e| InventoryScannerError::Io {
            path: shown.clone(),
            source: e,
        })?;
        if metadata.len() > MAX_SNAPSHOT_SIZE {
            return Err(InventoryScannerError::Snapshot {
                path: shown,
                reason: format!(
                    "file size {} exceeds limit {}",
                    metadata.len(),
                    MAX_SNAPSHOT_SIZE
                ),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| InventoryScannerError::Io {
            path: shown.clone(),
            source: e,
        })?;
        let snapshot = Self::from_json(&content, &shown)?;
        tracing::debug!(path = %shown, hives = snapshot.hives.len(), "registry snapshot loaded");
        Ok(snapshot)
    }

    /// 키 노드를 반환합니다. 경로상의 키가 없으면 생성합니다.
    pub fn key_mut(&mut self, hive: Hive, view: View, path: &str) -> &mut KeyNode {
        let mut cursor = self
            .hives
            .entry(hive)
            .or_default()
            .entry(view)
            .or_default();
        for seg in segments(path) {
            cursor = cursor.child_entry(seg);
        }
        cursor
    }

    /// 패키지 카탈로그 내용을 설정합니다.
    pub fn set_packages(&mut self, packages: Vec<PackageDescriptor>) {
        self.packages = Some(packages);
    }

    /// 간접 문자열 리소스를 등록합니다.
    pub fn insert_resource(&mut self, reference: impl Into<String>, text: impl Into<String>) {
        self.resources.insert(reference.into(), text.into());
    }

    fn expanded(mut self) -> Self {
        for views in self.hives.values_mut() {
            for node in views.values_mut() {
                *node = std::mem::take(node).expand();
            }
        }
        self
    }

    fn node(&self, hive: Hive, view: View, path: &str) -> Result<&KeyNode, InventoryScannerError> {
        let mut node = self
            .hives
            .get(&hive)
            .and_then(|views| views.get(&view))
            .ok_or_else(|| missing_key(hive, view, path))?;
        for seg in segments(path) {
            node = node.child(seg).ok_or_else(|| missing_key(hive, view, path))?;
        }
        Ok(node)
    }
}

impl RegistryAccess for RegistrySnapshot {
    fn subkeys(
        &self,
        hive: Hive,
        view: View,
        path: &str,
    ) -> Result<Vec<String>, InventoryScannerError> {
        Ok(self.node(hive, view, path)?.subkeys.keys().cloned().collect())
    }

    fn string_value(
        &self,
        hive: Hive,
        view: View,
        path: &str,
        name: &str,
    ) -> Result<Option<String>, InventoryScannerError> {
        Ok(self.node(hive, view, path)?.value(name).map(RegValue::as_string))
    }

    fn dword_value(
        &self,
        hive: Hive,
        view: View,
        path: &str,
        name: &str,
    ) -> Result<Option<u32>, InventoryScannerError> {
        Ok(self.node(hive, view, path)?.value(name).and_then(RegValue::as_dword))
    }
}

impl PackageCatalog for RegistrySnapshot {
    fn packages(&self, _all_users: bool) -> Result<Vec<PackageDescriptor>, InventoryScannerError> {
        self.packages.clone().ok_or_else(|| {
            InventoryScannerError::CapabilityUnavailable(
                "snapshot does not contain a package catalog".to_owned(),
            )
        })
    }
}

impl IndirectStringLoader for RegistrySnapshot {
    fn load(&self, reference: &str) -> Result<String, InventoryScannerError> {
        self.resources
            .get(reference.trim())
            .cloned()
            .ok_or_else(|| InventoryScannerError::ResolutionFailure {
                reference: reference.to_owned(),
                reason: "resource not present in snapshot".to_owned(),
            })
    }
}
