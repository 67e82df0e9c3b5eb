use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub number: i64,
    pub name: String,
    #[serde(default)]
    pub bonus: u64,
    #[serde(default)]
    pub minus: u64,
}

impl Student {
    /// Signed net score; never stored.
    pub fn net(&self) -> i64 {
        net_score(self.bonus, self.minus)
    }

    pub fn count_mut(&mut self, kind: PointKind) -> &mut u64 {
        match kind {
            PointKind::Bonus => &mut self.bonus,
            PointKind::Minus => &mut self.minus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassGroup {
    pub id: String,
    pub name: String,
    pub students: Vec<Student>,
}

impl ClassGroup {
    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    /// Students ordered by ascending number. Ties keep list order.
    pub fn sorted_students(&self) -> Vec<&Student> {
        let mut out: Vec<&Student> = self.students.iter().collect();
        out.sort_by_key(|s| s.number);
        out
    }

    /// Suggested number for the next student added to this class. Never
    /// below 1.
    pub fn next_number(&self) -> i64 {
        self.students
            .iter()
            .fold(0, |max, s| max.max(s.number))
            .saturating_add(1)
    }

    /// Totals saturate instead of wrapping.
    pub fn summary(&self) -> ClassSummary {
        let total_bonus = self
            .students
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.bonus));
        let total_minus = self
            .students
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.minus));
        ClassSummary {
            student_count: self.students.len(),
            total_bonus,
            total_minus,
            total_net: net_score(total_bonus, total_minus),
        }
    }
}

pub type Roster = Vec<ClassGroup>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Bonus,
    Minus,
}

impl PointKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bonus" => Some(PointKind::Bonus),
            "minus" => Some(PointKind::Minus),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSummary {
    pub student_count: usize,
    pub total_bonus: u64,
    pub total_minus: u64,
    pub total_net: i64,
}

/// `max(0, current + delta)`, saturating at the top of the range.
pub fn apply_delta(current: u64, delta: i64) -> u64 {
    let next = current as i128 + delta as i128;
    next.clamp(0, u64::MAX as i128) as u64
}

/// `bonus - minus`, saturated into the `i64` range.
pub fn net_score(bonus: u64, minus: u64) -> i64 {
    let net = bonus as i128 - minus as i128;
    net.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Roster used when neither the current nor the legacy snapshot exists.
pub fn seed_roster() -> Roster {
    fn s(id: &str, number: i64, name: &str, bonus: u64, minus: u64) -> Student {
        Student {
            id: id.to_string(),
            number,
            name: name.to_string(),
            bonus,
            minus,
        }
    }
    vec![
        ClassGroup {
            id: "class-1".to_string(),
            name: "Class 1A".to_string(),
            students: vec![
                s("s1", 1, "Alice Johnson", 5, 0),
                s("s2", 2, "Bob Smith", 2, 4),
                s("s3", 3, "Charlie Davis", 8, 1),
            ],
        },
        ClassGroup {
            id: "class-2".to_string(),
            name: "Science 101".to_string(),
            students: vec![s("s4", 1, "Dana Lee", 1, 1), s("s5", 2, "Evan Wright", 3, 0)],
        },
    ]
}
