use crate::migrate;
use crate::model::{apply_delta, ClassGroup, PointKind, Roster, Student};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("student number must be an integer, got {0:?}")]
    BadNumber(String),
    #[error("class not found: {0}")]
    ClassNotFound(String),
    #[error("student not found: {0}")]
    StudentNotFound(String),
    #[error("{0} must be confirmed")]
    ConfirmationRequired(&'static str),
    #[error("invalid import: {0}")]
    InvalidImport(String),
}

impl RosterError {
    pub fn code(&self) -> &'static str {
        match self {
            RosterError::EmptyName | RosterError::BadNumber(_) => "bad_params",
            RosterError::ClassNotFound(_) | RosterError::StudentNotFound(_) => "not_found",
            RosterError::ConfirmationRequired(_) => "confirmation_required",
            RosterError::InvalidImport(_) => "invalid_import",
        }
    }
}

/// All class groups plus the active selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterState {
    classes: Roster,
    active_class_id: Option<String>,
}

impl RosterState {
    pub fn new(classes: Roster) -> Self {
        let active_class_id = classes.first().map(|c| c.id.clone());
        RosterState {
            classes,
            active_class_id,
        }
    }

    pub fn classes(&self) -> &[ClassGroup] {
        &self.classes
    }

    pub fn active_class_id(&self) -> Option<&str> {
        self.active_class_id.as_deref()
    }

    pub fn active_class(&self) -> Option<&ClassGroup> {
        let id = self.active_class_id.as_deref()?;
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn class(&self, class_id: &str) -> Option<&ClassGroup> {
        self.classes.iter().find(|c| c.id == class_id)
    }

    fn active_class_mut(&mut self) -> Option<&mut ClassGroup> {
        let id = self.active_class_id.clone()?;
        self.classes.iter_mut().find(|c| c.id == id)
    }

    /// Swaps in a whole roster. The selection survives if its class does.
    pub fn replace_all(&mut self, classes: Roster) {
        let keep = self
            .active_class_id
            .as_ref()
            .map(|id| classes.iter().any(|c| &c.id == id))
            .unwrap_or(false);
        if !keep {
            self.active_class_id = classes.first().map(|c| c.id.clone());
        }
        self.classes = classes;
    }

    pub fn add_class(&mut self, name: &str) -> Result<String, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        let id = Uuid::new_v4().to_string();
        self.classes.push(ClassGroup {
            id: id.clone(),
            name: name.to_string(),
            students: Vec::new(),
        });
        self.active_class_id = Some(id.clone());
        Ok(id)
    }

    pub fn select_class(&mut self, class_id: &str) -> Result<(), RosterError> {
        if self.class(class_id).is_none() {
            return Err(RosterError::ClassNotFound(class_id.to_string()));
        }
        self.active_class_id = Some(class_id.to_string());
        Ok(())
    }

    /// Returns the selection after the delete.
    pub fn delete_class(
        &mut self,
        class_id: &str,
        confirmed: bool,
    ) -> Result<Option<String>, RosterError> {
        if !confirmed {
            return Err(RosterError::ConfirmationRequired("deleting a class"));
        }
        let before = self.classes.len();
        self.classes.retain(|c| c.id != class_id);
        if self.classes.len() == before {
            return Err(RosterError::ClassNotFound(class_id.to_string()));
        }
        if self.classes.is_empty() || self.active_class_id.as_deref() == Some(class_id) {
            self.active_class_id = self.classes.first().map(|c| c.id.clone());
        }
        Ok(self.active_class_id.clone())
    }

    /// `Ok(None)` when there is no active class to add to.
    pub fn add_student(
        &mut self,
        name: &str,
        number_text: &str,
    ) -> Result<Option<String>, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        let number: i64 = number_text
            .trim()
            .parse()
            .map_err(|_| RosterError::BadNumber(number_text.to_string()))?;
        let Some(class) = self.active_class_mut() else {
            return Ok(None);
        };
        let id = Uuid::new_v4().to_string();
        class.students.push(Student {
            id: id.clone(),
            number,
            name: name.to_string(),
            bonus: 0,
            minus: 0,
        });
        Ok(Some(id))
    }

    pub fn delete_student(&mut self, student_id: &str, confirmed: bool) -> Result<(), RosterError> {
        if !confirmed {
            return Err(RosterError::ConfirmationRequired("deleting a student"));
        }
        let class = self
            .active_class_mut()
            .ok_or_else(|| RosterError::StudentNotFound(student_id.to_string()))?;
        if class.student(student_id).is_none() {
            return Err(RosterError::StudentNotFound(student_id.to_string()));
        }
        class.students.retain(|s| s.id != student_id);
        Ok(())
    }

    /// Applies a signed delta to one counter, clamped at zero. `Ok(None)`
    /// when there is no active class.
    pub fn adjust_points(
        &mut self,
        student_id: &str,
        kind: PointKind,
        delta: i64,
    ) -> Result<Option<Student>, RosterError> {
        let Some(class) = self.active_class_mut() else {
            return Ok(None);
        };
        let student = class
            .students
            .iter_mut()
            .find(|s| s.id == student_id)
            .ok_or_else(|| RosterError::StudentNotFound(student_id.to_string()))?;
        let slot = student.count_mut(kind);
        *slot = apply_delta(*slot, delta);
        Ok(Some(student.clone()))
    }

    pub fn import_json(&mut self, text: &str) -> Result<(), RosterError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| RosterError::InvalidImport(format!("not valid JSON: {e}")))?;
        self.import_value(&value)
    }

    /// Validates everything before touching state; a rejected import leaves
    /// the roster as it was.
    pub fn import_value(&mut self, value: &Value) -> Result<(), RosterError> {
        let classes = validate_import(value)?;
        self.replace_all(classes);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.classes)
    }
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("classtrack-backup-{}.json", date.format("%Y-%m-%d"))
}

fn validate_import(value: &Value) -> Result<Roster, RosterError> {
    let Some(items) = value.as_array() else {
        return Err(RosterError::InvalidImport(
            "top level must be an array of classes".to_string(),
        ));
    };
    for (i, item) in items.iter().enumerate() {
        if !truthy(item.get("id")) {
            return Err(RosterError::InvalidImport(format!("class {i} is missing id")));
        }
        if !truthy(item.get("name")) {
            return Err(RosterError::InvalidImport(format!("class {i} is missing name")));
        }
        if !item.get("students").map(Value::is_array).unwrap_or(false) {
            return Err(RosterError::InvalidImport(format!(
                "class {i} has no students list"
            )));
        }
    }

    let classes =
        migrate::backfill_numbers(value).map_err(|e| RosterError::InvalidImport(format!("{e:#}")))?;

    let mut class_ids = HashSet::new();
    for class in &classes {
        if !class_ids.insert(class.id.as_str()) {
            return Err(RosterError::InvalidImport(format!(
                "duplicate class id {}",
                class.id
            )));
        }
        let mut student_ids = HashSet::new();
        for s in &class.students {
            if !student_ids.insert(s.id.as_str()) {
                return Err(RosterError::InvalidImport(format!(
                    "duplicate student id {} in class {}",
                    s.id, class.id
                )));
            }
        }
    }
    Ok(classes)
}

fn truthy(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
