//! LaTeX compilation and PDF compression
//!
//! Shells out to `pdflatex` for typesetting and to Ghostscript for
//! best-effort PDF compression. Compilation success is judged by the PDF
//! file existing: pdflatex in nonstop mode exits nonzero on recoverable
//! warnings that still produce usable output.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use thiserror::Error;

const PDFLATEX_BINARY: &str = "pdflatex";
const GHOSTSCRIPT_BINARY: &str = "gs";
const COMPRESS_TIMEOUT_SECS: u64 = 30;

/// LaTeX compiler errors
#[derive(Debug, Error)]
pub enum LatexError {
    /// pdflatex binary not found in PATH
    #[error("pdflatex not found in PATH")]
    BinaryNotFound,

    /// Failed to execute the compiler
    #[error("Failed to execute pdflatex: {0}")]
    ExecutionError(String),

    /// Compilation produced no PDF
    #[error("LaTeX compilation failed: {0}")]
    CompileFailed(String),

    /// I/O error (file read/write)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// pdflatex wrapper compiling in a per-request scratch directory
pub struct LatexCompiler {
    binary_path: String,
}

impl LatexCompiler {
    pub fn new() -> Self {
        Self {
            binary_path: PDFLATEX_BINARY.to_string(),
        }
    }

    /// Check if pdflatex is in PATH
    pub fn is_available() -> bool {
        Command::new(PDFLATEX_BINARY)
            .arg("--version")
            .output()
            .is_ok()
    }

    /// Compile `tex_filename` inside `workdir`, returning the PDF path.
    ///
    /// Runs pdflatex twice so cross-references (`\pageref{LastPage}`)
    /// resolve. The second run's exit status is still not trusted; only
    /// the PDF's existence is.
    pub async fn compile(&self, workdir: &Path, tex_filename: &str) -> Result<PathBuf, LatexError> {
        let pdf_path = workdir.join(Path::new(tex_filename).with_extension("pdf"));
        let log_path = workdir.join(Path::new(tex_filename).with_extension("log"));

        let mut last_output = None;
        for pass in 1..=2 {
            tracing::debug!(pass, tex = tex_filename, "Running pdflatex");
            let output = self.run_pdflatex(workdir, tex_filename).await?;
            last_output = Some(output);
        }

        if !pdf_path.exists() {
            let mut message = "LaTeX compilation failed; PDF not generated.".to_string();
            if let Ok(log_content) = tokio::fs::read_to_string(&log_path).await {
                if let Some(log_error) = extract_log_error(&log_content) {
                    message = format!("LaTeX error: {}", log_error);
                }
            }
            if let Some(output) = last_output {
                let stderr = String::from_utf8_lossy(&output.stderr);
                message = format!(
                    "{} (exit code: {:?}, stderr: {})",
                    message,
                    output.status.code(),
                    stderr.chars().take(200).collect::<String>()
                );
            }
            return Err(LatexError::CompileFailed(message));
        }

        tracing::info!(pdf = %pdf_path.display(), "LaTeX compilation completed");
        Ok(pdf_path)
    }

    async fn run_pdflatex(
        &self,
        workdir: &Path,
        tex_filename: &str,
    ) -> Result<std::process::Output, LatexError> {
        let binary = self.binary_path.clone();
        let workdir = workdir.to_path_buf();
        let tex_filename = tex_filename.to_string();

        tokio::task::spawn_blocking(move || {
            Command::new(&binary)
                .arg("-interaction=nonstopmode")
                .arg(&tex_filename)
                .current_dir(&workdir)
                .output()
        })
        .await
        .map_err(|e| LatexError::ExecutionError(format!("Task join error: {}", e)))?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LatexError::BinaryNotFound
            } else {
                LatexError::ExecutionError(e.to_string())
            }
        })
    }
}

impl Default for LatexCompiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the first `!`-prefixed error from a pdflatex log, with two
/// lines of context.
pub fn extract_log_error(log_content: &str) -> Option<String> {
    let lines: Vec<&str> = log_content.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with('!') {
            let end = (i + 3).min(lines.len());
            return Some(lines[i..end].join("\n"));
        }
    }
    None
}

/// Compress a PDF in place with Ghostscript.
///
/// Best-effort: a missing binary, nonzero exit, or timeout leaves the
/// original PDF untouched and returns `false`.
pub async fn compress_pdf(pdf_path: &Path) -> bool {
    let compressed_path = pdf_path.with_extension("compressed.pdf");

    let gs_result = {
        let input = pdf_path.to_path_buf();
        let output = compressed_path.clone();
        let task = tokio::task::spawn_blocking(move || {
            Command::new(GHOSTSCRIPT_BINARY)
                .args([
                    "-sDEVICE=pdfwrite",
                    "-dCompatibilityLevel=1.4",
                    "-dPDFSETTINGS=/ebook",
                    "-dNOPAUSE",
                    "-dQUIET",
                    "-dBATCH",
                    "-dDetectDuplicateImages=true",
                    "-dCompressFonts=true",
                    "-dDownsampleColorImages=true",
                    "-dColorImageResolution=150",
                    "-dDownsampleGrayImages=true",
                    "-dGrayImageResolution=150",
                    "-dDownsampleMonoImages=true",
                    "-dMonoImageResolution=150",
                ])
                .arg(format!("-sOutputFile={}", output.display()))
                .arg(&input)
                .output()
        });

        match tokio::time::timeout(Duration::from_secs(COMPRESS_TIMEOUT_SECS), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "PDF compression task failed");
                return false;
            }
            Err(_) => {
                tracing::warn!("PDF compression timed out");
                return false;
            }
        }
    };

    match gs_result {
        Ok(output) if output.status.success() && compressed_path.exists() => {
            let original_size = std::fs::metadata(pdf_path).map(|m| m.len()).unwrap_or(0);
            let compressed_size = std::fs::metadata(&compressed_path)
                .map(|m| m.len())
                .unwrap_or(0);

            if std::fs::remove_file(pdf_path)
                .and_then(|_| std::fs::rename(&compressed_path, pdf_path))
                .is_err()
            {
                tracing::warn!("Failed to swap in compressed PDF");
                return false;
            }

            tracing::info!(
                original_kb = original_size / 1024,
                compressed_kb = compressed_size / 1024,
                "PDF compressed"
            );
            true
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                stderr = %stderr.chars().take(100).collect::<String>(),
                "Ghostscript compression failed, serving uncompressed PDF"
            );
            let _ = std::fs::remove_file(&compressed_path);
            false
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Ghostscript not found, serving uncompressed PDF");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ghostscript execution failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_log_error() {
        let log = "This is pdfTeX\nSome output\n! Undefined control sequence.\nl.42 \\badmacro\nThe control sequence\nmore lines";
        let error = extract_log_error(log).unwrap();
        assert!(error.starts_with("! Undefined control sequence."));
        assert_eq!(error.lines().count(), 3);
    }

    #[test]
    fn test_extract_log_error_at_end() {
        let log = "output\n! Emergency stop.";
        assert_eq!(extract_log_error(log).unwrap(), "! Emergency stop.");
    }

    #[test]
    fn test_extract_log_error_clean_log() {
        assert!(extract_log_error("Output written on report.pdf (12 pages).").is_none());
    }

    #[test]
    fn test_availability_probe_does_not_panic() {
        // Environment-dependent, only verify it runs
        let _ = LatexCompiler::is_available();
    }

    #[tokio::test]
    async fn test_compile_missing_source_reports_failure() {
        if !LatexCompiler::is_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let compiler = LatexCompiler::new();
        let result = compiler.compile(dir.path(), "missing.tex").await;
        assert!(result.is_err());
    }
}
