use super::handlers;
use super::types::{AppState, Reply, Request};
use crate::ipc::error::err;

/// `None` means the response will be sent later through the outbox.
pub fn handle_request(state: &mut AppState, req: Request) -> Option<serde_json::Value> {
    if let Some(session) = state.session.as_mut() {
        session.sync_external();
    }

    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return Some(resp);
    }
    if let Some(resp) = handlers::classes::try_handle(state, &req) {
        return Some(resp);
    }
    if let Some(resp) = handlers::students::try_handle(state, &req) {
        return Some(resp);
    }
    if let Some(resp) = handlers::roster_exchange::try_handle(state, &req) {
        return Some(resp);
    }
    if let Some(reply) = handlers::reports::try_handle(state, &req) {
        return match reply {
            Reply::Now(resp) => Some(resp),
            Reply::Deferred => None,
        };
    }

    Some(err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    ))
}
