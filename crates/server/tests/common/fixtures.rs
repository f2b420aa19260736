//! Request builders and shared flows.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Boundary used by [`MultipartBody`].
pub const BOUNDARY: &str = "clientpulse-test-boundary";

/// Minimal multipart/form-data body builder.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[derive(Default)]
#[allow(dead_code)]
pub struct MultipartBody {
    body: Vec<u8>,
}

#[allow(dead_code)]
impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// A valid submission without a screenshot.
    pub fn feedback(name: &str, email: &str, rating: &str) -> Self {
        Self::new()
            .text("name", name)
            .text("email", email)
            .text("rating", rating)
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

#[allow(dead_code)]
async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Helper to make JSON requests.
#[allow(dead_code)]
pub async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    auth_token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = auth_token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    send(router, builder.body(body).unwrap()).await
}

/// POST a multipart feedback submission, optionally with extra headers.
#[allow(dead_code)]
pub async fn submit_feedback(
    router: &axum::Router,
    form: MultipartBody,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/feedback/")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    send(router, builder.body(Body::from(form.finish())).unwrap()).await
}

/// Register an administrator.
#[allow(dead_code)]
pub async fn register_admin(
    router: &axum::Router,
    username: &str,
    email: &str,
    password: &str,
) -> (StatusCode, Value) {
    json_request(
        router,
        "POST",
        "/api/admin/register",
        Some(json!({"username": username, "email": email, "password": password})),
        None,
    )
    .await
}

/// Log in and return the status and body.
#[allow(dead_code)]
pub async fn login(router: &axum::Router, username: &str, password: &str) -> (StatusCode, Value) {
    json_request(
        router,
        "POST",
        "/api/admin/login",
        Some(json!({"username": username, "password": password})),
        None,
    )
    .await
}

/// Register the bootstrap administrator and return a bearer token for it.
#[allow(dead_code)]
pub async fn admin_token(router: &axum::Router) -> String {
    let (status, body) =
        register_admin(router, "admin", "admin@example.com", "correct-horse").await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = login(router, "admin", "correct-horse").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["access_token"].as_str().unwrap().to_string()
}
