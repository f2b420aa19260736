//! Public feedback submission and retrieval.

use crate::client_ip::ClientIp;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use bytes::Bytes;
use clientpulse_core::FeedbackSubmission;
use clientpulse_core::feedback::{
    ALLOWED_SCREENSHOT_TYPES, is_allowed_screenshot_type, parse_rating, screenshot_extension,
};
use clientpulse_metadata::models::{FeedbackRow, NewFeedback};
use serde::Serialize;
use time::OffsetDateTime;

/// Stored feedback as returned to clients.
#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub description: Option<String>,
    pub screenshot_url: Option<String>,
    pub client_ip: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<FeedbackRow> for FeedbackResponse {
    fn from(row: FeedbackRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            rating: row.rating,
            description: row.description,
            screenshot_url: row.screenshot_url,
            client_ip: row.client_ip,
            created_at: row.created_at,
        }
    }
}

struct ScreenshotPart {
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

#[derive(Default)]
struct FeedbackForm {
    name: Option<String>,
    email: Option<String>,
    rating: Option<String>,
    description: Option<String>,
    screenshot: Option<ScreenshotPart>,
}

impl FeedbackForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "name" => form.name = Some(field.text().await?),
                "email" => form.email = Some(field.text().await?),
                "rating" => form.rating = Some(field.text().await?),
                "description" => form.description = Some(field.text().await?),
                "screenshot" => {
                    let filename = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;
                    // Browsers send an empty unnamed part for an untouched file input.
                    if filename.as_deref().unwrap_or_default().is_empty() && data.is_empty() {
                        continue;
                    }
                    form.screenshot = Some(ScreenshotPart {
                        filename,
                        content_type,
                        data,
                    });
                }
                _ => {}
            }
        }
        Ok(form)
    }

    fn submission(&mut self) -> ApiResult<FeedbackSubmission> {
        let required = |value: Option<String>, field: &str| {
            value.ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
        };
        let submission = FeedbackSubmission {
            name: required(self.name.take(), "name")?,
            email: required(self.email.take(), "email")?,
            rating: parse_rating(&required(self.rating.take(), "rating")?)?,
            description: self.description.take().filter(|d| !d.is_empty()),
        };
        submission.validate()?;
        Ok(submission)
    }
}

/// POST /api/feedback/ - Submit feedback, optionally with a screenshot.
pub async fn submit_feedback(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<FeedbackResponse>)> {
    let mut form = FeedbackForm::read(multipart?).await?;
    let submission = form.submission()?;

    let screenshot_url = match form.screenshot {
        Some(part) => {
            let content_type = part.content_type.as_deref().unwrap_or_default();
            if !is_allowed_screenshot_type(content_type) {
                return Err(ApiError::BadRequest(format!(
                    "Invalid file type. Allowed types: {}",
                    ALLOWED_SCREENSHOT_TYPES.join(", ")
                )));
            }
            if state.screenshots.is_enabled() {
                let extension = screenshot_extension(part.filename.as_deref());
                state.screenshots.upload(part.data, &extension).await
            } else {
                tracing::debug!("Screenshot storage disabled; discarding upload");
                None
            }
        }
        None => None,
    };

    let row = state
        .metadata
        .create_feedback(&NewFeedback {
            name: submission.name,
            email: submission.email,
            rating: submission.rating,
            description: submission.description,
            screenshot_url,
            client_ip: Some(client_ip),
            created_at: OffsetDateTime::now_utc(),
        })
        .await?;

    tracing::info!(
        feedback_id = row.id,
        rating = row.rating,
        has_screenshot = row.screenshot_url.is_some(),
        "Feedback submitted"
    );
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/feedback/{feedback_id} - Fetch one feedback record.
pub async fn get_feedback(
    State(state): State<AppState>,
    feedback_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FeedbackResponse>> {
    let Path(feedback_id) = feedback_id?;
    let row = state
        .metadata
        .get_feedback(feedback_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Feedback not found".to_string()))?;
    Ok(Json(row.into()))
}
