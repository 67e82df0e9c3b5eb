use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session::Session;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state
                .session
                .as_ref()
                .map(|s| s.store.workspace().to_string_lossy().to_string()),
            "reportsConfigured": state.reports.is_configured(),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match Session::open(&path) {
        Ok((session, loaded_from)) => {
            let class_count = session.roster.classes().len();
            let active = session.roster.active_class_id().map(str::to_string);
            state.session = Some(session);
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "loadedFrom": loaded_from.as_str(),
                    "classCount": class_count,
                    "activeClassId": active,
                }),
            )
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
