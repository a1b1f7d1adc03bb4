//! AI analysis endpoint

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::services::gemini::{compose_insights, AnalysisInsights};
use crate::AppState;

/// POST /analyze response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: AnalysisInsights,
}

/// POST /analyze
///
/// AI-powered inspection analysis: executive summary and deficiency
/// categorization (two API calls total). Only invoked when the user
/// explicitly requests analysis; report generation never calls the model.
pub async fn analyze_inspection(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let doc = super::read_json_upload(multipart).await?;

    let Some(gemini) = state.gemini.clone() else {
        return Err(ApiError::ServiceUnavailable(
            "AI analysis not available. Set GEMINI_API_KEY environment variable.".to_string(),
        ));
    };

    let executive_summary = gemini.executive_summary(&doc).await;
    let categories = gemini.categorize_deficiencies(&doc).await;
    let analysis = compose_insights(executive_summary, categories);

    tracing::info!(
        has_analysis = analysis.has_ai_analysis,
        "Analysis request completed"
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
    }))
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze_inspection))
}
