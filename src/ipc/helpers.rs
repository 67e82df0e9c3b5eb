use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use crate::session::Session;
use serde_json::json;

pub fn str_param<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

/// Destructive methods only run with `confirm: true`.
pub fn confirmed(req: &Request) -> bool {
    req.params
        .get("confirm")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

pub fn session<'a>(state: &'a AppState, req: &Request) -> Result<&'a Session, serde_json::Value> {
    state
        .session
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn session_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut Session, serde_json::Value> {
    state
        .session
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn student_json(s: &Student) -> serde_json::Value {
    json!({
        "id": s.id,
        "number": s.number,
        "name": s.name,
        "bonus": s.bonus,
        "minus": s.minus,
        "net": s.net(),
    })
}
