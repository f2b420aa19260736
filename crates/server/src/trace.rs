//! Request trace ids.
//!
//! Each request runs inside a `request` span carrying its trace id. A
//! client may supply the id in `x-trace-id`; otherwise a UUID is minted.
//! The id goes back out on the response under the same header.

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the trace id in both directions.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

const MAX_CLIENT_TRACE_ID_CHARS: usize = 128;

/// The trace id for a request: the client's header value when usable, a
/// fresh UUID when absent or empty after cleanup.
pub fn resolve_trace_id(headers: &HeaderMap) -> String {
    headers
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(clean_client_trace_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

// Only printable ASCII reaches the logs.
fn clean_client_trace_id(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .take(MAX_CLIENT_TRACE_ID_CHARS)
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

pub async fn trace_id_middleware(req: Request, next: Next) -> Response {
    let trace_id = resolve_trace_id(req.headers());

    let mut response = next
        .run(req)
        .instrument(tracing::info_span!("request", trace_id = %trace_id))
        .await;

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}
