use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{session, str_param};
use crate::ipc::types::{AppState, Reply, Request};
use crate::report::ScoreLine;
use serde_json::json;
use std::sync::Arc;

/// Runs the report on a worker thread. Other requests keep being served;
/// the response goes out through the outbox once the service answers.
fn handle_report_generate(state: &mut AppState, req: &Request) -> Reply {
    let session = match session(state, req) {
        Ok(s) => s,
        Err(resp) => return Reply::Now(resp),
    };
    let class = match str_param(req, "classId") {
        Some(id) => session.roster.class(id),
        None => session.roster.active_class(),
    };
    let Some(class) = class else {
        return Reply::Now(err(&req.id, "not_found", "class not found", None));
    };

    let class_id = class.id.clone();
    let class_name = class.name.clone();
    let lines: Vec<ScoreLine> = class.students.iter().map(ScoreLine::from).collect();
    let reports = Arc::clone(&state.reports);
    let outbox = state.outbox.clone();
    let id = req.id.clone();

    let spawned = std::thread::Builder::new()
        .name("class-report".to_string())
        .spawn(move || {
            let report = reports.generate_class_report(&class_name, &lines);
            let resp = ok(
                &id,
                json!({ "classId": class_id, "className": class_name, "report": report }),
            );
            // The reader may be gone by now; the result is simply dropped.
            let _ = outbox.send(resp);
        });
    match spawned {
        Ok(_) => Reply::Deferred,
        Err(e) => Reply::Now(err(&req.id, "io_failed", e.to_string(), None)),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Reply> {
    match req.method.as_str() {
        "report.generate" => Some(handle_report_generate(state, req)),
        _ => None,
    }
}
