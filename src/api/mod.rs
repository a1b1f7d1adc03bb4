//! HTTP API handlers for trec-report

pub mod analyze;
pub mod health;
pub mod reports;
pub mod ui;

pub use analyze::analyze_routes;
pub use health::health_routes;
pub use reports::report_routes;
pub use ui::ui_routes;

use std::path::Path;

use axum::extract::Multipart;

use crate::error::ApiError;
use crate::models::InspectionDocument;

/// Read the uploaded inspection JSON from a multipart request.
///
/// Expects a single `file` field carrying a `.json` file. Validation
/// failures are 400s with the reason.
pub(crate) async fn read_json_upload(
    mut multipart: Multipart,
) -> Result<InspectionDocument, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ApiError::BadRequest("No file selected".to_string()));
        }
        if !is_json_filename(&filename) {
            return Err(ApiError::BadRequest(
                "Only JSON files are allowed".to_string(),
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Upload read failed: {}", e)))?;

        return serde_json::from_slice(&bytes)
            .map_err(|_| ApiError::BadRequest("Invalid JSON file format".to_string()));
    }

    Err(ApiError::BadRequest("No file selected".to_string()))
}

fn is_json_filename(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
