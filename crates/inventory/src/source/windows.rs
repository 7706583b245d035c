//! 네이티브 Windows 레지스트리 백엔드
//!
//! `winreg`로 Uninstall 키를 읽고, `SHLoadIndirectString`으로 `@file,-id`
//! 참조를 해석합니다. 모든 접근은 `KEY_READ` 권한의 읽기 전용입니다.

use std::ffi::{OsStr, c_void};
use std::io;
use std::os::windows::ffi::OsStrExt;

use winreg::RegKey;
use winreg::enums::{
    HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_READ, KEY_WOW64_32KEY,
    KEY_WOW64_64KEY,
};

use super::{Hive, IndirectStringLoader, RegistryAccess};
use crate::error::InventoryScannerError;
use crate::types::View;

/// 간접 문자열 출력 버퍼 크기 (UTF-16 code unit)
const INDIRECT_BUF_LEN: u32 = 1024;

#[link(name = "shlwapi")]
unsafe extern "system" {
    fn SHLoadIndirectString(
        psz_source: *const u16,
        psz_out_buf: *mut u16,
        cch_out_buf: u32,
        ppv_reserved: *mut *mut c_void,
    ) -> i32;
}

/// winreg 기반 레지스트리 접근
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsRegistry;

impl WindowsRegistry {
    fn open(&self, hive: Hive, view: View, path: &str) -> Result<RegKey, InventoryScannerError> {
        let root = RegKey::predef(match hive {
            Hive::LocalMachine => HKEY_LOCAL_MACHINE,
            Hive::CurrentUser => HKEY_CURRENT_USER,
            Hive::Users => HKEY_USERS,
        });
        let flags = KEY_READ
            | match view {
                View::Bits64 => KEY_WOW64_64KEY,
                View::Bits32 => KEY_WOW64_32KEY,
            };
        root.open_subkey_with_flags(path, flags)
            .map_err(|e| InventoryScannerError::SourceUnavailable {
                source_name: format!("{hive}\\{path} ({view})"),
                reason: e.to_string(),
            })
    }
}

fn read_failure(path: &str, name: &str, err: io::Error) -> InventoryScannerError {
    InventoryScannerError::SourceUnavailable {
        source_name: format!("{path}\\{name}"),
        reason: err.to_string(),
    }
}

impl RegistryAccess for WindowsRegistry {
    fn subkeys(
        &self,
        hive: Hive,
        view: View,
        path: &str,
    ) -> Result<Vec<String>, InventoryScannerError> {
        let key = self.open(hive, view, path)?;
        let names = key
            .enum_keys()
            .filter_map(|name| match name {
                Ok(name) => Some(name),
                Err(e) => {
                    tracing::debug!(hive = %hive, path, error = %e, "failed to enumerate subkey");
                    None
                }
            })
            .collect();
        Ok(names)
    }

    fn string_value(
        &self,
        hive: Hive,
        view: View,
        path: &str,
        name: &str,
    ) -> Result<Option<String>, InventoryScannerError> {
        let key = self.open(hive, view, path)?;
        match key.get_value::<String, _>(name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            // REG_DWORD 등 문자열이 아닌 값은 텍스트로 변환
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                Ok(key.get_value::<u32, _>(name).ok().map(|n| n.to_string()))
            }
            Err(e) => Err(read_failure(path, name, e)),
        }
    }

    fn dword_value(
        &self,
        hive: Hive,
        view: View,
        path: &str,
        name: &str,
    ) -> Result<Option<u32>, InventoryScannerError> {
        let key = self.open(hive, view, path)?;
        match key.get_value::<u32, _>(name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => Ok(key
                .get_value::<String, _>(name)
                .ok()
                .and_then(|s| s.trim().parse().ok())),
            Err(e) => Err(read_failure(path, name, e)),
        }
    }
}

/// `SHLoadIndirectString` 기반 간접 문자열 로더
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellIndirectStrings;

impl IndirectStringLoader for ShellIndirectStrings {
    fn load(&self, reference: &str) -> Result<String, InventoryScannerError> {
        let source: Vec<u16> = OsStr::new(reference)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();
        let mut buf = vec![0u16; INDIRECT_BUF_LEN as usize];

        // SAFETY: source는 NUL 종료 UTF-16 버퍼이고, buf 길이는 INDIRECT_BUF_LEN과 같습니다.
        let hr = unsafe {
            SHLoadIndirectString(
                source.as_ptr(),
                buf.as_mut_ptr(),
                INDIRECT_BUF_LEN,
                std::ptr::null_mut(),
            )
        };
        if hr != 0 {
            return Err(InventoryScannerError::ResolutionFailure {
                reference: reference.to_owned(),
                reason: format!("SHLoadIndirectString failed: HRESULT 0x{:08X}", hr as u32),
            });
        }

        let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        Ok(String::from_utf16_lossy(&buf[..len]))
    }
}
