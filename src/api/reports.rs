//! Report generation endpoint

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /reports
///
/// Accepts a multipart upload of one inspection JSON file and returns the
/// compiled PDF as an attachment. Pipeline failures are recorded on
/// `AppState.last_error` for the health endpoint.
pub async fn create_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let doc = super::read_json_upload(multipart).await?;

    let report = match state.reports.generate(&doc).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Report generation failed");
            *state.last_error.write().await = Some(e.to_string());
            return Err(ApiError::Internal(format!(
                "Error generating report: {}",
                e
            )));
        }
    };

    tracing::info!(
        filename = %report.filename,
        bytes = report.pdf.len(),
        "Report request completed"
    );

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report.filename),
        ),
    ];

    Ok((headers, report.pdf).into_response())
}

/// Build report routes
pub fn report_routes() -> Router<AppState> {
    Router::new().route("/reports", post(create_report))
}
