//! Administrator analytics: the summary report, paged listing and export.

use crate::auth::CurrentAdmin;
use crate::error::{ApiError, ApiResult};
use crate::handlers::feedback::FeedbackResponse;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use clientpulse_core::AnalyticsReport;
use clientpulse_core::analytics::REPORT_WINDOWS_DAYS;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

const DEFAULT_PAGE_LIMIT: i64 = 50;
const MAX_PAGE_LIMIT: i64 = 100;

const CSV_HEADER: [&str; 8] = [
    "id",
    "name",
    "email",
    "rating",
    "description",
    "screenshot_url",
    "client_ip",
    "created_at",
];

/// GET /api/analytics/report - Summary statistics over all feedback.
pub async fn report(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
) -> ApiResult<Json<AnalyticsReport>> {
    let overall = state.metadata.rating_stats(None).await?;
    if overall.count == 0 {
        return Ok(Json(AnalyticsReport::empty()));
    }

    let now = OffsetDateTime::now_utc();
    let mut windows = [overall; 3];
    for (slot, days) in windows.iter_mut().zip(REPORT_WINDOWS_DAYS) {
        *slot = state
            .metadata
            .rating_stats(Some(now - Duration::days(days)))
            .await?;
    }
    let counts = state.metadata.rating_counts().await?;

    tracing::debug!(admin_id = admin.id, total = overall.count, "Built analytics report");
    Ok(Json(AnalyticsReport::build(overall, windows, counts)))
}

/// Query string of `GET /api/analytics/feedbacks`.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PageParams {
    /// Offset and limit after defaults and clamping.
    pub fn resolve(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        (skip, limit)
    }
}

/// One page of feedback plus the overall count.
#[derive(Debug, Serialize)]
pub struct FeedbackPage {
    pub total: i64,
    pub feedbacks: Vec<FeedbackResponse>,
}

/// GET /api/analytics/feedbacks - Page through feedback, newest first.
pub async fn list_feedbacks(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<FeedbackPage>> {
    let Query(params) = params?;
    let (skip, limit) = params.resolve();

    let total = state.metadata.count_feedbacks().await?;
    let rows = state.metadata.list_feedbacks(skip, Some(limit)).await?;
    Ok(Json(FeedbackPage {
        total,
        feedbacks: rows.into_iter().map(Into::into).collect(),
    }))
}

/// Query string of `GET /api/analytics/download`.
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    #[serde(default = "default_export_format")]
    pub format: String,
}

fn default_export_format() -> String {
    "csv".to_string()
}

/// GET /api/analytics/download - Export every feedback record as CSV or JSON.
pub async fn download(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    params: Result<Query<ExportParams>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(params) = params?;
    let format = params.format.to_ascii_lowercase();
    if format != "csv" && format != "json" {
        return Err(ApiError::BadRequest(
            "Invalid format. Use 'csv' or 'json'".to_string(),
        ));
    }

    let feedbacks: Vec<FeedbackResponse> = state
        .metadata
        .list_feedbacks(0, None)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    tracing::info!(
        admin_id = admin.id,
        format = %format,
        rows = feedbacks.len(),
        "Exporting feedback"
    );

    if format == "json" {
        return Ok(Json(feedbacks).into_response());
    }

    let body = render_csv(&feedbacks)?;
    let filename = format!(
        "feedbacks_{}.csv",
        OffsetDateTime::now_utc().unix_timestamp()
    );
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

fn render_csv(feedbacks: &[FeedbackResponse]) -> ApiResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    let csv_error = |e: csv::Error| ApiError::Internal(format!("CSV export failed: {e}"));

    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for feedback in feedbacks {
        writer.serialize(feedback).map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV export failed: {}", e.error())))
}
