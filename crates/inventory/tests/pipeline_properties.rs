//! 파이프라인 단계별 성질 테스트
//!
//! filter / dedup / MatchEngine의 결정성, 경계값, 정렬 안정성을 검증합니다.

use std::collections::BTreeMap;

use appwarden_inventory::{
    Entry, EntryKind, FilterOptions, MatchMode, Scope, SearchOptions, SourceKey, View, dedup,
    filter, search,
};

fn entry(name: &str, scope: Scope, view: View) -> Entry {
    Entry {
        kind: EntryKind::Native,
        display_name: name.to_owned(),
        version: Some("1".to_owned()),
        publisher: Some("P".to_owned()),
        install_location: None,
        uninstall_command: None,
        source: SourceKey::registry(scope, view, format!("HKLM\\test\\{name}")),
        is_system_component: false,
        extra: BTreeMap::new(),
    }
}

fn named(name: &str) -> Entry {
    Entry {
        publisher: None,
        ..entry(name, Scope::Machine, View::Bits64)
    }
}

fn substring() -> SearchOptions {
    SearchOptions::default().with_mode(MatchMode::Substring)
}

#[test]
fn dedup_is_order_independent() {
    let a = entry("X", Scope::Machine, View::Bits64);
    let b = entry("X", Scope::OtherUser("S-1-5-21-7-8-9-1001".to_owned()), View::Bits32);

    assert_eq!(dedup(vec![a.clone(), b.clone()]), vec![a.clone()]);
    assert_eq!(dedup(vec![b, a.clone()]), vec![a]);
}

#[test]
fn dedup_permutations_produce_same_set() {
    let entries = vec![
        entry("X", Scope::CurrentUser, View::Bits32),
        entry("X", Scope::Machine, View::Bits32),
        entry("Y", Scope::OtherUser("S-1-5-21-1-2-3-1001".to_owned()), View::Bits64),
        entry("X", Scope::CurrentUser, View::Bits64),
        entry("Y", Scope::CurrentUser, View::Bits32),
    ];
    let mut expected = dedup(entries.clone());
    expected.sort_by(|a, b| a.display_name.cmp(&b.display_name));

    let mut reversed: Vec<Entry> = entries.iter().rev().cloned().collect();
    reversed = dedup(reversed);
    reversed.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    assert_eq!(expected, reversed);

    let mut rotated = entries.clone();
    rotated.rotate_left(2);
    let mut rotated = dedup(rotated);
    rotated.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    assert_eq!(expected, rotated);

    assert_eq!(expected[0].source.rank(), (2, 0));
    assert_eq!(expected[1].source.rank(), (1, 0));
}

#[test]
fn filter_toggle() {
    let mut system = named("Runtime");
    system.is_system_component = true;
    let entries = vec![named("App"), system];

    assert_eq!(filter(entries.clone(), FilterOptions::default()).len(), 1);
    assert_eq!(
        filter(
            entries,
            FilterOptions {
                filter_system_components: false
            }
        )
        .len(),
        2
    );
}

#[test]
fn substring_exactness() {
    let corpus = vec![named("Google Chrome")];
    let results = search(&["chrome"], &corpus, substring());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 100);
}

#[test]
fn fuzzy_threshold_boundary_at_default() {
    let corpus = vec![named("Google Chrome")];
    let results = search(&["chrme"], &corpus, SearchOptions::default());
    assert_eq!(results.len(), 1);
    assert!(results[0].score >= 70);

    let identical = search(&["google chrome"], &corpus, SearchOptions::default());
    assert_eq!(identical[0].score, 100);

    let disjoint = search(&["xyz"], &[named("abc")], SearchOptions::default().with_threshold(0));
    assert!(disjoint.is_empty());
}

#[test]
fn multi_pattern_union() {
    let corpus = vec![named("Google Chrome"), named("Mozilla Firefox")];
    let results = search(&["chrome", "firefox"], &corpus, SearchOptions::default());
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.matched_patterns.len() == 1));
}

#[test]
fn cap_limits_candidates_per_pattern() {
    // 편집 거리 1 → 90점, 2 → 80점
    let corpus = vec![named("abcdefghxy"), named("abcdefghix")];
    let uncapped = search(&["abcdefghij"], &corpus, SearchOptions::default());
    let scores: Vec<u8> = uncapped.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![90, 80]);

    let capped = search(&["abcdefghij"], &corpus, SearchOptions::default().with_cap(1));
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].entry.display_name, "abcdefghix");
    assert_eq!(capped[0].score, 90);
}

#[test]
fn cap_applies_per_pattern_not_overall() {
    let corpus = vec![named("Chrome"), named("Firefox")];
    let results = search(&["chrome", "firefox"], &corpus, substring().with_cap(1));
    assert_eq!(results.len(), 2);
}

#[test]
fn sort_is_stable_by_name_on_ties() {
    let corpus = vec![named("Beta"), named("Alpha")];
    let results = search(&["a"], &corpus, substring());
    let names: Vec<&str> = results.iter().map(|r| r.entry.display_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
}

#[test]
fn empty_inputs() {
    let no_patterns: Vec<String> = Vec::new();
    assert!(search(&no_patterns, &[named("x")], substring()).is_empty());
    assert!(search(&["x"], &[], SearchOptions::default()).is_empty());
    assert!(dedup(Vec::new()).is_empty());
    assert!(filter(Vec::new(), FilterOptions::default()).is_empty());
}
