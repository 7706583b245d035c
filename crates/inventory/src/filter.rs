//! 시스템 구성요소 필터

use crate::types::Entry;

/// 필터 옵션
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    /// true이면 `is_system_component` 항목을 제외
    pub filter_system_components: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            filter_system_components: true,
        }
    }
}

/// 옵션에 따라 항목을 걸러냅니다. 순서는 유지됩니다.
pub fn filter(entries: Vec<Entry>, options: FilterOptions) -> Vec<Entry> {
    if !options.filter_system_components {
        return entries;
    }
    entries
        .into_iter()
        .filter(|entry| !entry.is_system_component)
        .collect()
}
