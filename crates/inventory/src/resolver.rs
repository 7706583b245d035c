//! 표시 이름 해석기
//!
//! `@file,-id` 형식의 간접 리소스 참조를 실제 문자열로 바꿉니다.
//! 해석은 절대 실패하지 않으며, 실패 시 원본(trim된) 문자열을 그대로 사용합니다.

use crate::source::IndirectStringLoader;

/// 간접 참조 접두사
pub const INDIRECT_PREFIX: char = '@';

/// 간접 문자열 참조 해석기
pub struct NameResolver<'a> {
    loader: &'a dyn IndirectStringLoader,
}

impl<'a> NameResolver<'a> {
    /// 새 해석기를 생성합니다.
    pub fn new(loader: &'a dyn IndirectStringLoader) -> Self {
        Self { loader }
    }

    /// 원시 이름을 해석합니다.
    pub fn resolve(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if !trimmed.starts_with(INDIRECT_PREFIX) {
            return trimmed.to_owned();
        }

        match self.loader.load(trimmed) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
            Ok(_) => {
                tracing::debug!(reference = trimmed, "indirect string resolved to empty text");
                trimmed.to_owned()
            }
            Err(e) => {
                tracing::debug!(reference = trimmed, error = %e, "indirect string not resolved");
                trimmed.to_owned()
            }
        }
    }
}
