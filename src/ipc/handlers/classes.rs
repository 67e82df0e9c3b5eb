use crate::ipc::error::{err, ok, roster_err};
use crate::ipc::helpers::{confirmed, session_mut, str_param};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_classes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_ref() else {
        return ok(&req.id, json!({ "classes": [], "activeClassId": null }));
    };

    // Totals let the UI show a dashboard without a second round trip.
    let classes: Vec<serde_json::Value> = session
        .roster
        .classes()
        .iter()
        .map(|c| {
            let summary = c.summary();
            json!({
                "id": c.id,
                "name": c.name,
                "studentCount": summary.student_count,
                "totalBonus": summary.total_bonus,
                "totalMinus": summary.total_minus,
                "totalNet": summary.total_net,
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "classes": classes,
            "activeClassId": session.roster.active_class_id(),
        }),
    )
}

fn handle_classes_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(name) = str_param(req, "name") else {
        return err(&req.id, "bad_params", "missing name", None);
    };

    match session.roster.add_class(name) {
        Ok(class_id) => {
            session.commit();
            tracing::info!(class_id = %class_id, "class created");
            ok(&req.id, json!({ "classId": class_id, "name": name.trim() }))
        }
        Err(e) => roster_err(&req.id, e),
    }
}

fn handle_classes_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(class_id) = str_param(req, "classId") else {
        return err(&req.id, "bad_params", "missing classId", None);
    };

    match session.roster.select_class(class_id) {
        Ok(()) => ok(&req.id, json!({ "activeClassId": class_id })),
        Err(e) => roster_err(&req.id, e),
    }
}

fn handle_classes_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(class_id) = str_param(req, "classId") else {
        return err(&req.id, "bad_params", "missing classId", None);
    };

    match session.roster.delete_class(class_id, confirmed(req)) {
        Ok(active) => {
            session.commit();
            tracing::info!(class_id, "class deleted");
            ok(&req.id, json!({ "activeClassId": active }))
        }
        Err(e) => roster_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(handle_classes_list(state, req)),
        "classes.create" => Some(handle_classes_create(state, req)),
        "classes.select" => Some(handle_classes_select(state, req)),
        "classes.delete" => Some(handle_classes_delete(state, req)),
        _ => None,
    }
}
