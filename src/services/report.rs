//! Report generation pipeline
//!
//! Per request: scratch directory setup, template fill, concurrent photo
//! downloads, body generation, pdflatex compilation, best-effort
//! compression, then read-and-clean. Nothing persists between requests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::InspectionDocument;
use crate::render;
use crate::services::images::{collect_photo_urls, FetchError, ImageFetcher};
use crate::services::latex::{compress_pdf, LatexCompiler, LatexError};

const TEX_FILENAME: &str = "final_report.tex";

/// Static illustration images referenced by the title page
const STATIC_IMAGES: [&str; 2] = ["obstruction.png", "scope.png"];

/// Report pipeline errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("Report template has no content marker")]
    TemplateMissingMarker,

    #[error(transparent)]
    Latex(#[from] LatexError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    Join(String),
}

/// A finished report ready to send
#[derive(Debug)]
pub struct GeneratedReport {
    /// Compiled (and possibly compressed) PDF bytes
    pub pdf: Vec<u8>,
    /// Suggested download filename
    pub filename: String,
}

/// Orchestrates one PDF generation per call
pub struct ReportGenerator {
    config: Arc<AppConfig>,
    compiler: LatexCompiler,
}

impl ReportGenerator {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            compiler: LatexCompiler::new(),
        }
    }

    /// Run the full pipeline and return the PDF bytes.
    ///
    /// The scratch directory is removed before returning, success or not.
    pub async fn generate(&self, doc: &InspectionDocument) -> Result<GeneratedReport, ReportError> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let scratch_dir = self
            .config
            .output_root
            .join(format!("{}_{}", timestamp, short_id()));

        let result = self.generate_in(doc, &scratch_dir, &timestamp).await;

        if let Err(e) = tokio::fs::remove_dir_all(&scratch_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(dir = %scratch_dir.display(), error = %e, "Scratch dir cleanup failed");
            }
        }

        result
    }

    async fn generate_in(
        &self,
        doc: &InspectionDocument,
        scratch_dir: &Path,
        timestamp: &str,
    ) -> Result<GeneratedReport, ReportError> {
        tokio::fs::create_dir_all(scratch_dir).await?;

        // Template first: a missing or markerless template fails before
        // any downloads start.
        let template_path = self.config.template_path();
        let template = tokio::fs::read_to_string(&template_path)
            .await
            .map_err(|_| ReportError::TemplateNotFound(template_path.clone()))?;
        if !template.contains(render::CONTENT_MARKER) {
            return Err(ReportError::TemplateMissingMarker);
        }
        let template = render::populate_header(&template, doc);

        self.copy_static_images(scratch_dir).await;

        // Concurrent photo downloads into <scratch>/images
        let urls = collect_photo_urls(doc);
        let fetcher = ImageFetcher::new(
            scratch_dir.join("images"),
            self.config.download_concurrency,
        )?;
        let images = fetcher.fetch_all(&urls).await;

        // Body generation is CPU-bound string assembly
        let body = {
            let doc = doc.clone();
            tokio::task::spawn_blocking(move || render::generate_body(&doc, &images))
                .await
                .map_err(|e| ReportError::Join(e.to_string()))?
        };

        let final_content =
            render::splice_content(&template, &body).ok_or(ReportError::TemplateMissingMarker)?;

        let tex_path = scratch_dir.join(TEX_FILENAME);
        tokio::fs::write(&tex_path, final_content).await?;

        let pdf_path = self.compiler.compile(scratch_dir, TEX_FILENAME).await?;

        compress_pdf(&pdf_path).await;

        let pdf = tokio::fs::read(&pdf_path).await?;
        tracing::info!(
            bytes = pdf.len(),
            scratch = %scratch_dir.display(),
            "Report generated"
        );

        Ok(GeneratedReport {
            pdf,
            filename: format!("inspection_report_{}.pdf", timestamp),
        })
    }

    /// Copy the title-page illustrations from the template dir into the
    /// scratch dir. Missing files are tolerated; the template dir may not
    /// ship them.
    async fn copy_static_images(&self, scratch_dir: &Path) {
        for name in STATIC_IMAGES {
            let src = self.config.template_dir.join(name);
            if !src.exists() {
                continue;
            }
            let dst = scratch_dir.join(name);
            match tokio::fs::copy(&src, &dst).await {
                Ok(_) => tracing::debug!(image = name, "Copied static image"),
                Err(e) => tracing::warn!(image = name, error = %e, "Static image copy failed"),
            }
        }
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn config_with(template_dir: &Path, output_root: &Path) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            template_dir: template_dir.to_path_buf(),
            output_root: output_root.to_path_buf(),
            ..AppConfig::default()
        })
    }

    #[test]
    fn test_short_id_length() {
        let id = short_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_generate_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ReportGenerator::new(config_with(
            &dir.path().join("no-such-dir"),
            &dir.path().join("out"),
        ));

        let err = generator
            .generate(&InspectionDocument::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::TemplateNotFound(_)));
    }

    #[tokio::test]
    async fn test_generate_template_without_marker() {
        let dir = tempfile::tempdir().unwrap();
        let template_dir = dir.path().join("latex");
        std::fs::create_dir_all(&template_dir).unwrap();
        std::fs::write(
            template_dir.join("report.tex"),
            "\\begin{document}\\end{document}",
        )
        .unwrap();

        let generator = ReportGenerator::new(config_with(&template_dir, &dir.path().join("out")));
        let err = generator
            .generate(&InspectionDocument::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::TemplateMissingMarker));
    }

    #[tokio::test]
    async fn test_generate_cleans_scratch_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let output_root = dir.path().join("out");
        let generator = ReportGenerator::new(config_with(&dir.path().join("missing"), &output_root));

        let _ = generator.generate(&InspectionDocument::default()).await;

        // Whatever was created under the output root is gone again
        let leftovers = std::fs::read_dir(&output_root)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }
}
