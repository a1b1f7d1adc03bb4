//! trec-report - Property Inspection Report Service
//!
//! Converts structured property-inspection JSON into a formatted PDF
//! report via a LaTeX template, with optional AI-generated analysis.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::services::{GeminiClient, ReportGenerator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<AppConfig>,
    /// Gemini client; `None` when no API key is configured
    pub gemini: Option<Arc<GeminiClient>>,
    /// Report generation pipeline
    pub reports: Arc<ReportGenerator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last pipeline error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let gemini = match &config.gemini_api_key {
            Some(key) => Some(Arc::new(GeminiClient::new(key.clone())?)),
            None => None,
        };

        Ok(Self {
            reports: Arc::new(ReportGenerator::new(config.clone())),
            config,
            gemini,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .merge(api::ui_routes())
        .merge(api::report_routes())
        .merge(api::analyze_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
