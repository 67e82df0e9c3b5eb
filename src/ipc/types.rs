use std::sync::mpsc::Sender;
use std::sync::Arc;

use serde::Deserialize;

use crate::report::ReportRequester;
use crate::session::Session;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub session: Option<Session>,
    pub reports: Arc<ReportRequester>,
    /// Responses produced off the request loop go out through here.
    pub outbox: Sender<serde_json::Value>,
}

pub enum Reply {
    Now(serde_json::Value),
    Deferred,
}
