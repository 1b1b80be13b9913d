use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::pipeline::SummarizePipeline;
use crate::summarizer::SummaryBounds;
use actix_web::{web, App, Error, HttpResponse, HttpServer};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Range accepted for a per-request max summary length.
pub const MAX_LENGTH_RANGE: std::ops::RangeInclusive<u32> = 50..=300;

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<SummarizePipeline>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkRequest {
    pub text: String,
}

fn generate_request_id() -> String {
    Uuid::new_v4().to_string()[..8].to_string()
}

fn bad_request(request_id: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "status": "error",
        "message": message,
        "request_id": request_id
    }))
}

fn pipeline_error_response(request_id: &str, err: PipelineError) -> HttpResponse {
    match err {
        PipelineError::EmptyInput => bad_request(request_id, err.to_string()),
        PipelineError::Chunking(_) => {
            error!(request_id = %request_id, error = %err, "Chunking failed");
            HttpResponse::InternalServerError().json(json!({
                "status": "error",
                "message": err.to_string(),
                "request_id": request_id
            }))
        }
    }
}

/// Per-request bounds on top of the configured defaults.
fn request_bounds(
    defaults: SummaryBounds,
    request: &SummarizeRequest,
) -> Result<SummaryBounds, String> {
    let max_length = request.max_length.unwrap_or(defaults.max_length);
    if request.max_length.is_some() && !MAX_LENGTH_RANGE.contains(&max_length) {
        return Err(format!(
            "max_length must be between {} and {}",
            MAX_LENGTH_RANGE.start(),
            MAX_LENGTH_RANGE.end()
        ));
    }
    let min_length = request.min_length.unwrap_or(defaults.min_length);
    SummaryBounds::new(min_length, max_length).map_err(|e| e.to_string())
}

pub async fn health_check() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "request_id": generate_request_id(),
        "timestamp": Utc::now().to_rfc3339()
    })))
}

pub async fn chunk(
    state: web::Data<ApiState>,
    request: web::Json<ChunkRequest>,
) -> Result<HttpResponse, Error> {
    let request_id = generate_request_id();
    match state.pipeline.chunk(&request.text) {
        Ok(chunks) => Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "count": chunks.len(),
            "chunks": chunks,
            "request_id": request_id
        }))),
        Err(e) => Ok(pipeline_error_response(&request_id, e)),
    }
}

pub async fn summarize(
    state: web::Data<ApiState>,
    request: web::Json<SummarizeRequest>,
) -> Result<HttpResponse, Error> {
    let request_id = generate_request_id();
    let bounds = match request_bounds(state.pipeline.options().bounds, &request) {
        Ok(bounds) => bounds,
        Err(message) => return Ok(bad_request(&request_id, message)),
    };

    info!(request_id = %request_id, input_len = request.text.len(), "Summarize request");
    match state.pipeline.run_with_bounds(&request.text, bounds).await {
        Ok(report) => {
            let status = if report.partial { "partial" } else { "success" };
            if report.partial {
                warn!(request_id = %request_id, failed = report.failed_chunks(), "Partial summary");
            }
            Ok(HttpResponse::Ok().json(json!({
                "status": status,
                "summary": report.final_text(),
                "report": report,
                "request_id": request_id,
                "generated_at": Utc::now().to_rfc3339()
            })))
        }
        Err(e) => Ok(pipeline_error_response(&request_id, e)),
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/chunk", web::post().to(chunk))
        .route("/summarize", web::post().to(summarize));
}

pub async fn start_api_server(config: &AppConfig, pipeline: SummarizePipeline) -> std::io::Result<()> {
    let bind_addr = config.bind_addr();
    let state = ApiState {
        pipeline: Arc::new(pipeline),
    };

    info!(addr = %bind_addr, "Starting API server");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
