use crate::application::job_runner::JobRunner;
use crate::domain::error::JobError;
use crate::domain::jobs::{JobResult, Quality};
use crate::ports::downloader::Downloader;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct DownloadBody {
    video_url: Option<Value>,
    quality: Option<Value>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

/// Routes of the service, sharing one [`JobRunner`].
pub fn router<D>(runner: Arc<JobRunner<D>>) -> Router
where
    D: Downloader + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/download", post(download::<D>))
        .route("/file-info/:job_id", get(file_info::<D>))
        .fallback(not_found)
        .with_state(runner)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "video-downloader",
    })
}

async fn download<D>(
    State(runner): State<Arc<JobRunner<D>>>,
    payload: Result<Json<DownloadBody>, JsonRejection>,
) -> Result<Json<JobResult>, JobError>
where
    D: Downloader + 'static,
{
    let Json(body) = payload.map_err(|e| JobError::Validation(e.body_text()))?;

    let video_url = match body.video_url {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(url)) => url,
        Some(_) => {
            return Err(JobError::Validation(
                "video_url must be a string".to_string(),
            ))
        }
    };
    let quality = match body.quality {
        None | Some(Value::Null) => Quality::Best,
        Some(Value::String(q)) => Quality::parse(Some(&q)),
        Some(Value::Number(n)) => Quality::parse(Some(&n.to_string())),
        Some(_) => {
            return Err(JobError::Validation(
                "quality must be a string or a number".to_string(),
            ))
        }
    };

    runner.run_download_job(&video_url, quality).await.map(Json)
}

async fn file_info<D>(
    State(runner): State<Arc<JobRunner<D>>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobResult>, JobError>
where
    D: Downloader + 'static,
{
    runner.lookup_job_file(&job_id).await.map(Json)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "endpoint not found", "code": "NOT_FOUND" })),
    )
}
