//! 중복 병합
//!
//! 같은 `(name, version, publisher)` 식별 키를 가진 항목 중 소스 우선순위가
//! 가장 높은 하나만 남깁니다. 우선순위는 [`SourceKey::rank`](crate::types::SourceKey::rank)
//! 튜플의 사전식 비교이며, 동률이면 먼저 나온 항목이 남습니다.
//!
//! 출력 순서는 각 식별 키가 처음 등장한 순서입니다.

use std::collections::HashMap;

use crate::types::{Entry, IdentityKey};

/// 식별 키 기준으로 중복 항목을 병합합니다.
pub fn dedup(entries: Vec<Entry>) -> Vec<Entry> {
    let mut slots: HashMap<IdentityKey, usize> = HashMap::with_capacity(entries.len());
    let mut survivors: Vec<Entry> = Vec::with_capacity(entries.len());

    for entry in entries {
        let key = entry.identity_key();
        match slots.get(&key) {
            Some(&slot) => {
                if entry.source.rank() > survivors[slot].source.rank() {
                    survivors[slot] = entry;
                }
            }
            None => {
                slots.insert(key, survivors.len());
                survivors.push(entry);
            }
        }
    }

    survivors
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::types::{EntryKind, Scope, SourceKey, View};

    fn entry(name: &str, scope: Scope, view: View, path: &str) -> Entry {
        Entry {
            kind: EntryKind::Native,
            display_name: name.to_owned(),
            version: Some("1".to_owned()),
            publisher: Some("P".to_owned()),
            install_location: None,
            uninstall_command: None,
            source: SourceKey::registry(scope, view, path),
            is_system_component: false,
            extra: BTreeMap::new(),
        }
    }

    fn other_user() -> Scope {
        Scope::OtherUser("S-1-5-21-1-2-3-1001".to_owned())
    }

    #[test]
    fn machine_64_beats_other_user_32_in_any_order() {
        let a = entry("X", Scope::Machine, View::Bits64, "a");
        let b = entry("X", other_user(), View::Bits32, "b");

        let forward = dedup(vec![a.clone(), b.clone()]);
        let backward = dedup(vec![b, a.clone()]);
        assert_eq!(forward, vec![a.clone()]);
        assert_eq!(backward, vec![a]);
    }

    #[test]
    fn scope_outranks_view() {
        let cu64 = entry("X", Scope::CurrentUser, View::Bits64, "cu");
        let m32 = entry("X", Scope::Machine, View::Bits32, "m");
        let out = dedup(vec![cu64, m32.clone()]);
        assert_eq!(out, vec![m32]);
    }

    #[test]
    fn view_breaks_tie_within_scope() {
        let cu32 = entry("X", Scope::CurrentUser, View::Bits32, "32");
        let cu64 = entry("X", Scope::CurrentUser, View::Bits64, "64");
        let out = dedup(vec![cu32, cu64.clone()]);
        assert_eq!(out, vec![cu64]);
    }

    #[test]
    fn equal_rank_keeps_first_encountered() {
        let first = entry("X", Scope::Machine, View::Bits64, "first");
        let second = entry("X", Scope::Machine, View::Bits64, "second");
        let out = dedup(vec![first.clone(), second]);
        assert_eq!(out, vec![first]);
    }

    #[test]
    fn identity_is_normalized() {
        let a = entry("Notepad++", Scope::CurrentUser, View::Bits32, "a");
        let mut b = entry(" NOTEPAD++ ", Scope::Machine, View::Bits64, "b");
        b.publisher = Some(" p ".to_owned());
        let out = dedup(vec![a, b.clone()]);
        assert_eq!(out, vec![b]);
    }

    #[test]
    fn different_versions_are_distinct() {
        let a = entry("X", Scope::Machine, View::Bits64, "a");
        let mut b = entry("X", Scope::Machine, View::Bits64, "b");
        b.version = Some("2".to_owned());
        assert_eq!(dedup(vec![a, b]).len(), 2);
    }

    #[test]
    fn output_follows_first_appearance() {
        let x = entry("X", other_user(), View::Bits32, "x");
        let y = entry("Y", Scope::Machine, View::Bits64, "y");
        let x_better = entry("X", Scope::Machine, View::Bits64, "x2");
        let out = dedup(vec![x, y.clone(), x_better.clone()]);
        assert_eq!(out, vec![x_better, y]);
    }

    #[test]
    fn packaged_loses_to_registry() {
        let registry = entry("Terminal", other_user(), View::Bits32, "r");
        let mut packaged = entry("Terminal", Scope::Machine, View::Bits64, "p");
        packaged.kind = EntryKind::Packaged;
        packaged.source = SourceKey::package("Microsoft.WindowsTerminal");
        let out = dedup(vec![packaged, registry.clone()]);
        assert_eq!(out, vec![registry]);
    }

    #[test]
    fn empty_input() {
        assert!(dedup(Vec::new()).is_empty());
    }
}
