//! HTTP request handlers for the payroll ingestion API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_with_audit;
use crate::error::PayrollError;
use crate::ingest::IngestionPipeline;

use super::request::{DeductionRequest, IngestRequest, select_ruleset};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ingest", post(ingest_handler))
        .route("/deductions", post(deductions_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: PayrollError) -> Response {
    let api_error: ApiErrorResponse = error.into();
    json_response(api_error.status, api_error.error)
}

/// Maps a body extraction failure to a 400 response.
fn rejection_response(rejection: JsonRejection, correlation_id: Uuid) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /ingest.
///
/// Runs the ingestion pipeline over already-parsed rows. The ruleset only
/// supplies the statutory caps used for sanity warnings.
async fn ingest_handler(
    State(state): State<AppState>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing ingestion request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let config = state.config();
    let ruleset = match select_ruleset(config, request.ruleset_version.as_deref(), request.as_of) {
        Ok(ruleset) => ruleset,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Ruleset selection failed");
            return error_response(err);
        }
    };

    let start_time = Instant::now();
    let pipeline = IngestionPipeline::from_config(config, ruleset);
    let result = pipeline.ingest(&request.source_name, &request.rows);
    let summary = result.summary();

    info!(
        correlation_id = %correlation_id,
        source = %request.source_name,
        ruleset = %ruleset.version,
        extracted = summary.extracted,
        failed = summary.failed,
        skipped = summary.skipped,
        duration_us = start_time.elapsed().as_micros(),
        "Ingestion request completed"
    );

    json_response(StatusCode::OK, result)
}

/// Handler for POST /deductions.
///
/// Returns every statutory line, the net pay and the audit steps.
async fn deductions_handler(
    State(state): State<AppState>,
    payload: Result<Json<DeductionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing deduction request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let gross = match request.gross() {
        Ok(gross) => gross,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Invalid deduction request");
            return error_response(err);
        }
    };

    let ruleset = match select_ruleset(
        state.config(),
        request.ruleset_version.as_deref(),
        request.as_of,
    ) {
        Ok(ruleset) => ruleset,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Ruleset selection failed");
            return error_response(err);
        }
    };

    let breakdown = calculate_with_audit(gross, ruleset);
    info!(
        correlation_id = %correlation_id,
        ruleset = %ruleset.version,
        gross = %breakdown.result.gross,
        net = %breakdown.result.net,
        "Deduction calculation completed"
    );

    json_response(StatusCode::OK, breakdown)
}
