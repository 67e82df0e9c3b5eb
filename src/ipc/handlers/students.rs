use crate::ipc::error::{err, ok, roster_err};
use crate::ipc::helpers::{confirmed, session, session_mut, str_param, student_json};
use crate::ipc::types::{AppState, Request};
use crate::model::PointKind;
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class = match str_param(req, "classId") {
        Some(id) => match session.roster.class(id) {
            Some(c) => Some(c),
            None => return err(&req.id, "not_found", "class not found", None),
        },
        None => session.roster.active_class(),
    };
    let Some(class) = class else {
        return ok(
            &req.id,
            json!({ "classId": null, "students": [], "nextNumber": 1 }),
        );
    };

    let students: Vec<serde_json::Value> =
        class.sorted_students().into_iter().map(student_json).collect();
    ok(
        &req.id,
        json!({
            "classId": class.id,
            "students": students,
            "nextNumber": class.next_number(),
        }),
    )
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(name) = str_param(req, "name") else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    // The form sends text; scripted callers may send a plain integer.
    let number = match req.params.get("number") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => return err(&req.id, "bad_params", "missing number", None),
    };

    match session.roster.add_student(name, &number) {
        Ok(Some(student_id)) => {
            session.commit();
            ok(&req.id, json!({ "studentId": student_id }))
        }
        Ok(None) => ok(&req.id, json!({ "studentId": null })),
        Err(e) => roster_err(&req.id, e),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(student_id) = str_param(req, "studentId") else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };

    match session.roster.delete_student(student_id, confirmed(req)) {
        Ok(()) => {
            session.commit();
            ok(&req.id, json!({ "ok": true }))
        }
        Err(e) => roster_err(&req.id, e),
    }
}

fn handle_students_adjust(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(student_id) = str_param(req, "studentId") else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    let Some(kind) = str_param(req, "kind").and_then(PointKind::parse) else {
        return err(&req.id, "bad_params", "kind must be bonus or minus", None);
    };
    let Some(delta) = req.params.get("delta").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "delta must be an integer", None);
    };

    match session.roster.adjust_points(student_id, kind, delta) {
        Ok(Some(student)) => {
            session.commit();
            ok(&req.id, json!({ "student": student_json(&student) }))
        }
        Ok(None) => ok(&req.id, json!({ "student": null })),
        Err(e) => roster_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        "students.adjust" => Some(handle_students_adjust(state, req)),
        _ => None,
    }
}
