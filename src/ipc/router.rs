use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

fn dispatch(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    if let Some(resp) = handlers::core::try_handle(state, req) {
        return Some(resp);
    }
    if let Some(resp) = handlers::classes::try_handle(state, req) {
        return Some(resp);
    }
    if let Some(resp) = handlers::students::try_handle(state, req) {
        return Some(resp);
    }
    if let Some(resp) = handlers::categories::try_handle(state, req) {
        return Some(resp);
    }
    if let Some(resp) = handlers::records::try_handle(state, req) {
        return Some(resp);
    }
    if let Some(resp) = handlers::reports::try_handle(state, req) {
        return Some(resp);
    }
    if let Some(resp) = handlers::roster::try_handle(state, req) {
        return Some(resp);
    }
    handlers::backup_exchange::try_handle(state, req)
}

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    let span = tracing::debug_span!("request", id = %req.id, method = %req.method);
    let _guard = span.enter();

    let Some(resp) = dispatch(state, &req) else {
        tracing::warn!("unknown method");
        return err(
            &req.id,
            "not_implemented",
            format!("unknown method: {}", req.method),
            None,
        );
    };

    if resp.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = resp
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        tracing::warn!(code, "request failed");
    } else {
        tracing::debug!("request ok");
    }
    resp
}
