use crate::model::{seed_roster, ClassGroup, Roster, Student};
use anyhow::bail;
use serde_json::Value;
use uuid::Uuid;

pub const STORAGE_KEY: &str = "classtrack-data-v2";
pub const LEGACY_STORAGE_KEY: &str = "classtrack-data-v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadedFrom {
    Current,
    Legacy,
    Seed,
}

impl LoadedFrom {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadedFrom::Current => "current",
            LoadedFrom::Legacy => "legacy",
            LoadedFrom::Seed => "seed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedRoster {
    pub roster: Roster,
    pub loaded_from: LoadedFrom,
}

/// Newest schema first, then the legacy snapshot, then the seed roster.
///
/// Only reads what it is given: the caller decides what to persist. A
/// snapshot that is present but has the wrong shape is treated like a miss.
pub fn load_versioned(current: Option<&Value>, legacy: Option<&Value>) -> LoadedRoster {
    if let Some(v) = current {
        match backfill_numbers(v) {
            Ok(roster) => {
                return LoadedRoster {
                    roster,
                    loaded_from: LoadedFrom::Current,
                }
            }
            Err(e) => tracing::error!(key = STORAGE_KEY, "failed to load saved roster: {e:#}"),
        }
    }

    if let Some(v) = legacy {
        match migrate_legacy(v) {
            Ok(roster) => {
                tracing::info!(
                    key = LEGACY_STORAGE_KEY,
                    classes = roster.len(),
                    "migrated legacy score roster"
                );
                return LoadedRoster {
                    roster,
                    loaded_from: LoadedFrom::Legacy,
                };
            }
            Err(e) => {
                tracing::error!(key = LEGACY_STORAGE_KEY, "failed to migrate legacy roster: {e:#}")
            }
        }
    }

    LoadedRoster {
        roster: seed_roster(),
        loaded_from: LoadedFrom::Seed,
    }
}

/// Current-schema load. Students without a numeric `number` get their
/// 1-based position in the class; existing numbers are kept.
///
/// Fails only when the snapshot is not an array. Records missing an id get
/// a fresh one; a class without a name or students list gets defaults.
pub fn backfill_numbers(value: &Value) -> anyhow::Result<Roster> {
    map_classes(value, |raw, idx| {
        let number = if raw.get("number").map(Value::is_number).unwrap_or(false) {
            int_field(raw, "number").unwrap_or(0)
        } else {
            idx as i64 + 1
        };
        Student {
            id: record_id(raw),
            number,
            name: text_field(raw, "name").unwrap_or_default(),
            bonus: count_field(raw, "bonus"),
            minus: count_field(raw, "minus"),
        }
    })
}

/// Version 1 rewrite: a flat signed `score` becomes bonus/minus and the
/// number is the 1-based array position. Records already in bonus/minus
/// shape keep their counts, so running this twice changes nothing.
pub fn migrate_legacy(value: &Value) -> anyhow::Result<Roster> {
    map_classes(value, |raw, idx| {
        let has_counts = raw.get("bonus").is_some() || raw.get("minus").is_some();
        let (bonus, minus) = if has_counts {
            (count_field(raw, "bonus"), count_field(raw, "minus"))
        } else {
            split_score(int_field(raw, "score").unwrap_or(0))
        };
        Student {
            id: record_id(raw),
            number: idx as i64 + 1,
            name: text_field(raw, "name").unwrap_or_default(),
            bonus,
            minus,
        }
    })
}

/// Signed legacy score to `(bonus, minus)`.
pub fn split_score(score: i64) -> (u64, u64) {
    if score > 0 {
        (score as u64, 0)
    } else {
        (0, score.unsigned_abs())
    }
}

fn map_classes(
    value: &Value,
    mut student: impl FnMut(&Value, usize) -> Student,
) -> anyhow::Result<Roster> {
    let Some(classes) = value.as_array() else {
        bail!("roster must be a JSON array");
    };
    let mut out = Vec::with_capacity(classes.len());
    for (ci, cls) in classes.iter().enumerate() {
        if !cls.is_object() {
            tracing::warn!(index = ci, "skipping class entry that is not an object");
            continue;
        }
        let id = record_id(cls);
        let name = text_field(cls, "name")
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Class {}", ci + 1));
        let raw_students = cls
            .get("students")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut students = Vec::with_capacity(raw_students.len());
        for (si, raw) in raw_students.iter().enumerate() {
            if !raw.is_object() {
                tracing::warn!(class = %id, index = si, "skipping non-object student entry");
                continue;
            }
            students.push(student(raw, si));
        }
        out.push(ClassGroup { id, name, students });
    }
    Ok(out)
}

/// The record's own id, or a fresh one when it has none.
fn record_id(v: &Value) -> String {
    id_field(v, "id").unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn id_field(v: &Value, key: &str) -> Option<String> {
    match v.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_string)
}

fn int_field(v: &Value, key: &str) -> Option<i64> {
    let n = v.get(key)?;
    n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))
}

// Negative stored counts are clamped; the counters never go below zero.
fn count_field(v: &Value, key: &str) -> u64 {
    v.get(key)
        .and_then(Value::as_u64)
        .or_else(|| int_field(v, key).map(|n| n.max(0) as u64))
        .unwrap_or(0)
}
