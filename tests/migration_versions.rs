#[path = "../src/model.rs"]
mod model;
#[path = "../src/migrate.rs"]
mod migrate;

use migrate::LoadedFrom;
use proptest::prelude::*;
use serde_json::json;

#[test]
fn legacy_scores_split_into_bonus_and_minus() {
    let legacy = json!([
        {
            "id": "c1",
            "name": "Class 1A",
            "students": [
                { "id": "a", "name": "Ann", "score": -3 },
                { "id": "b", "name": "Ben", "score": 5 },
                { "id": "c", "name": "Cy", "score": 0 }
            ]
        }
    ]);
    let roster = migrate::migrate_legacy(&legacy).expect("migrate legacy");
    let s = &roster[0].students;
    assert_eq!((s[0].bonus, s[0].minus), (0, 3));
    assert_eq!((s[1].bonus, s[1].minus), (5, 0));
    assert_eq!((s[2].bonus, s[2].minus), (0, 0));
    assert_eq!(
        s.iter().map(|x| x.number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(s[1].name, "Ben");
}

#[test]
fn backfill_numbers_only_fills_missing() {
    let current = json!([
        {
            "id": "c1",
            "name": "Class 1A",
            "students": [
                { "id": "a", "name": "Ann", "bonus": 1, "minus": 0 },
                { "id": "b", "name": "Ben", "number": 9, "bonus": 0, "minus": 2 },
                { "id": "c", "name": "Cy", "number": "x", "bonus": 0, "minus": 0 }
            ]
        },
        { "id": "c2", "name": "Empty", "students": [] }
    ]);
    let roster = migrate::backfill_numbers(&current).expect("backfill");
    let numbers: Vec<i64> = roster[0].students.iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![1, 9, 3]);
    assert_eq!(roster[0].students[1].minus, 2);
    assert!(roster[1].students.is_empty());
}

#[test]
fn current_snapshot_wins_over_legacy() {
    let current = json!([{ "id": "new", "name": "New", "students": [] }]);
    let legacy = json!([{ "id": "old", "name": "Old", "students": [] }]);
    let loaded = migrate::load_versioned(Some(&current), Some(&legacy));
    assert_eq!(loaded.loaded_from, LoadedFrom::Current);
    assert_eq!(loaded.roster[0].id, "new");
}

#[test]
fn malformed_current_snapshot_falls_back_to_legacy() {
    let current = json!({ "not": "an array" });
    let legacy = json!([{ "id": "old", "name": "Old", "students": [{ "id": "s", "name": "S", "score": 2 }] }]);
    let loaded = migrate::load_versioned(Some(&current), Some(&legacy));
    assert_eq!(loaded.loaded_from, LoadedFrom::Legacy);
    assert_eq!(loaded.roster[0].students[0].bonus, 2);
}

#[test]
fn nothing_stored_yields_seed_roster() {
    let loaded = migrate::load_versioned(None, None);
    assert_eq!(loaded.loaded_from, LoadedFrom::Seed);
    assert_eq!(loaded.roster, model::seed_roster());
    assert_eq!(loaded.roster.len(), 2);
}

#[test]
fn legacy_migration_is_idempotent_on_migrated_data() {
    let legacy = json!([
        { "id": "c1", "name": "A", "students": [
            { "id": "a", "name": "Ann", "score": -7 },
            { "id": "b", "name": "Ben", "score": 4 }
        ]}
    ]);
    let once = migrate::migrate_legacy(&legacy).expect("first pass");
    let again = migrate::migrate_legacy(&serde_json::to_value(&once).expect("to value"))
        .expect("second pass");
    assert_eq!(once, again);
}

#[test]
fn legacy_records_without_ids_are_kept() {
    let legacy = json!([
        { "name": "No id class", "students": [
            { "id": "a", "name": "Ann", "score": 2 },
            { "name": "x", "score": 3 }
        ]},
        { "id": "c2", "name": "B", "students": [{ "name": "y", "score": -1 }] }
    ]);
    let roster = migrate::migrate_legacy(&legacy).expect("migrate legacy");
    assert_eq!(roster.len(), 2);
    assert!(!roster[0].id.is_empty());
    assert_ne!(roster[0].id, roster[1].id);
    assert_eq!(roster[0].students.len(), 2);
    let x = &roster[0].students[1];
    assert!(!x.id.is_empty());
    assert_ne!(x.id, "a");
    assert_eq!((x.name.as_str(), x.number, x.bonus, x.minus), ("x", 2, 3, 0));
    assert_eq!(roster[1].students[0].minus, 1);

    let loaded = migrate::load_versioned(None, Some(&legacy));
    assert_eq!(loaded.loaded_from, LoadedFrom::Legacy);
    assert_eq!(loaded.roster[0].name, "No id class");

    let again = migrate::migrate_legacy(&serde_json::to_value(&roster).expect("to value"))
        .expect("second pass");
    assert_eq!(again, roster);
}

#[test]
fn current_snapshot_keeps_partial_records() {
    let current = json!([
        { "id": "c1", "students": [
            { "name": "No id", "bonus": 4 },
            "junk",
            { "id": "b", "name": "Ben", "number": 7 }
        ]},
        { "id": "c2", "name": "No list" }
    ]);
    let loaded = migrate::load_versioned(Some(&current), None);
    assert_eq!(loaded.loaded_from, LoadedFrom::Current);
    let c1 = &loaded.roster[0];
    assert_eq!(c1.name, "Class 1");
    assert_eq!(c1.students.len(), 2);
    assert_eq!((c1.students[0].number, c1.students[0].bonus), (1, 4));
    assert!(!c1.students[0].id.is_empty());
    assert_eq!(c1.students[1].number, 7);
    assert_eq!(loaded.roster[1].name, "No list");
    assert!(loaded.roster[1].students.is_empty());
}

proptest! {
    #[test]
    fn split_score_preserves_net(score in -1_000_000i64..1_000_000) {
        let (bonus, minus) = migrate::split_score(score);
        prop_assert_eq!(bonus as i64 - minus as i64, score);
        prop_assert!(bonus == 0 || minus == 0);
    }

    #[test]
    fn migrating_twice_matches_once(scores in proptest::collection::vec(-500i64..500, 0..20)) {
        let students: Vec<_> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| json!({ "id": format!("s{i}"), "name": format!("N{i}"), "score": s }))
            .collect();
        let legacy = json!([{ "id": "c", "name": "C", "students": students }]);
        let once = migrate::migrate_legacy(&legacy).unwrap();
        let twice = migrate::migrate_legacy(&serde_json::to_value(&once).unwrap()).unwrap();
        prop_assert_eq!(&once, &twice);
        for (s, score) in once[0].students.iter().zip(scores.iter()) {
            prop_assert_eq!(s.net(), *score);
        }
    }

    #[test]
    fn backfill_assigns_positions_in_order(count in 0usize..30) {
        let students: Vec<_> = (0..count)
            .map(|i| json!({ "id": format!("s{i}"), "name": "x", "bonus": 0, "minus": 0 }))
            .collect();
        let roster = migrate::backfill_numbers(&json!([{ "id": "c", "name": "C", "students": students }])).unwrap();
        let numbers: Vec<i64> = roster[0].students.iter().map(|s| s.number).collect();
        let expected: Vec<i64> = (1..=count as i64).collect();
        prop_assert_eq!(numbers, expected);
    }
}
