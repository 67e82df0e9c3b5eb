mod config;
mod db;
mod ipc;
mod migrate;
mod model;
mod report;
mod roster;
mod session;
mod store;

use clap::Parser;
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use tracing_subscriber::EnvFilter;

fn main() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = config::Config::parse();

    let (outbox, responses) = mpsc::channel::<serde_json::Value>();
    let writer = std::thread::spawn(move || {
        let mut stdout = io::stdout();
        for resp in responses {
            let _ = writeln!(
                stdout,
                "{}",
                serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
            );
            let _ = stdout.flush();
        }
    });

    let mut state = ipc::AppState {
        session: None,
        reports: Arc::new(config.report.requester()),
        outbox: outbox.clone(),
    };

    if let Some(path) = config.workspace.as_deref() {
        match session::Session::open(path) {
            Ok((s, _)) => state.session = Some(s),
            Err(e) => {
                tracing::error!(workspace = %path.display(), "failed to open workspace: {e:#}")
            }
        }
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!("unparseable request: {e}");
                let _ = outbox.send(json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                }));
                continue;
            }
        };

        tracing::debug!(id = %req.id, method = %req.method, "request");
        if let Some(resp) = ipc::handle_request(&mut state, req) {
            let _ = outbox.send(resp);
        }
    }

    // Pending reports still hold outbox clones; the writer drains them.
    drop(state);
    drop(outbox);
    let _ = writer.join();
}
