use crate::ipc::error::{err, ok, roster_err};
use crate::ipc::helpers::{session, session_mut, str_param};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};

fn handle_roster_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "classes": session.roster.classes(),
            "activeClassId": session.roster.active_class_id(),
        }),
    )
}

fn write_export(out_dir: &Path, file_name: &str, text: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create directory {}", out_dir.to_string_lossy()))?;
    let path = out_dir.join(file_name);
    std::fs::write(&path, text)
        .with_context(|| format!("failed to write export {}", path.to_string_lossy()))?;
    Ok(path)
}

fn handle_roster_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let text = match session.roster.export_json() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "io_failed", e.to_string(), None),
    };
    let file_name = roster::export_file_name(chrono::Local::now().date_naive());

    let mut result = json!({ "fileName": file_name, "json": text });
    if let Some(out_dir) = str_param(req, "outDir") {
        match write_export(Path::new(out_dir), &file_name, &text) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "roster exported");
                result["path"] = json!(path.to_string_lossy());
            }
            Err(e) => return err(&req.id, "io_failed", format!("{e:#}"), None),
        }
    }
    ok(&req.id, result)
}

fn handle_roster_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match session_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let outcome = if let Some(text) = str_param(req, "json") {
        session.roster.import_json(text)
    } else if let Some(data) = req.params.get("data") {
        session.roster.import_value(data)
    } else {
        return err(&req.id, "bad_params", "missing json or data", None);
    };

    match outcome {
        Ok(()) => {
            session.commit();
            tracing::info!(classes = session.roster.classes().len(), "roster imported");
            ok(
                &req.id,
                json!({
                    "classCount": session.roster.classes().len(),
                    "activeClassId": session.roster.active_class_id(),
                }),
            )
        }
        Err(e) => {
            tracing::warn!("roster import rejected: {e}");
            roster_err(&req.id, e)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.get" => Some(handle_roster_get(state, req)),
        "roster.export" => Some(handle_roster_export(state, req)),
        "roster.import" => Some(handle_roster_import(state, req)),
        _ => None,
    }
}
