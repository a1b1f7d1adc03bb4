//! Photo download and re-encoding
//!
//! Downloads all report photos concurrently with bounded fan-out. Each
//! image is decoded, downscaled to the report size cap, and re-encoded as
//! a reduced-quality JPEG so the compiled PDF stays small. A failed
//! download only drops that photo from the report; it never fails the
//! request.

use std::collections::{HashMap, HashSet};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use image::codecs::jpeg::JpegEncoder;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::InspectionDocument;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const DOWNLOAD_TIMEOUT_SECS: u64 = 20;
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Size cap for report images; larger images are downscaled to fit
const MAX_DIMENSION: u32 = 800;
/// JPEG re-encode quality
const JPEG_QUALITY: u8 = 70;

/// Image fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP status {0} for {1}")]
    HttpStatus(u16, String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    Join(String),
}

/// Collect all unique `http(s)` photo URLs from section media and comment
/// photos, in document order.
pub fn collect_photo_urls(doc: &InspectionDocument) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    let mut add = |url: Option<&str>| {
        if let Some(url) = url {
            if (url.starts_with("http://") || url.starts_with("https://"))
                && seen.insert(url.to_string())
            {
                urls.push(url.to_string());
            }
        }
    };

    for section in &doc.inspection.sections {
        for media in &section.media {
            add(media.url.as_deref());
        }
        for item in &section.line_items {
            for comment in &item.comments {
                for photo in &comment.photos {
                    add(photo.url.as_deref());
                }
            }
        }
    }

    urls
}

/// Concurrent photo downloader for one report generation
pub struct ImageFetcher {
    http_client: reqwest::Client,
    image_dir: PathBuf,
    concurrency: usize,
}

impl ImageFetcher {
    /// Create a fetcher writing into `image_dir` (created if missing).
    pub fn new(image_dir: PathBuf, concurrency: usize) -> Result<Self, FetchError> {
        std::fs::create_dir_all(&image_dir)?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            image_dir,
            concurrency: concurrency.max(1),
        })
    }

    /// Download all `urls` with bounded fan-out.
    ///
    /// Returns the URL → file map of successful downloads; failures are
    /// logged and omitted.
    pub async fn fetch_all(&self, urls: &[String]) -> HashMap<String, PathBuf> {
        if urls.is_empty() {
            return HashMap::new();
        }

        tracing::info!(count = urls.len(), "Starting photo downloads");

        let results: Vec<(String, Result<PathBuf, FetchError>)> = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                let result = self.fetch_one(&url).await;
                (url, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut cache = HashMap::new();
        for (url, result) in results {
            match result {
                Ok(path) => {
                    cache.insert(url, path);
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Photo download failed, skipping");
                }
            }
        }

        tracing::info!(
            downloaded = cache.len(),
            total = urls.len(),
            "Photo downloads completed"
        );

        cache
    }

    /// Download and re-encode one image, returning its cache file.
    ///
    /// The cache filename is the SHA-256 of the URL, so a URL repeated
    /// across comments is fetched once.
    async fn fetch_one(&self, url: &str) -> Result<PathBuf, FetchError> {
        let filepath = self.cache_path(url);
        if filepath.exists() {
            return Ok(filepath);
        }

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16(), url.to_string()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        // Decode/resize/encode is CPU-bound
        let path = filepath.clone();
        tokio::task::spawn_blocking(move || reencode_image(&bytes, &path))
            .await
            .map_err(|e| FetchError::Join(e.to_string()))??;

        Ok(filepath)
    }

    /// Cache file for a URL: `<image_dir>/<sha256(url)>.jpg`
    pub fn cache_path(&self, url: &str) -> PathBuf {
        let hash = format!("{:x}", Sha256::digest(url.as_bytes()));
        self.image_dir.join(format!("{}.jpg", hash))
    }
}

/// Downscale to the report size cap and write as reduced-quality JPEG.
///
/// Payloads the image decoder rejects (unsupported format, truncated
/// data) are written raw; pdflatex may still accept them.
fn reencode_image(bytes: &[u8], path: &Path) -> Result<(), FetchError> {
    let decoded = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            tracing::debug!(error = %e, "Image decode failed, storing raw payload");
            std::fs::write(path, bytes)?;
            return Ok(());
        }
    };

    // thumbnail() uses a fast triangle filter and keeps aspect ratio
    let resized = if decoded.width() > MAX_DIMENSION || decoded.height() > MAX_DIMENSION {
        decoded.thumbnail(MAX_DIMENSION, MAX_DIMENSION)
    } else {
        decoded
    };

    let rgb = resized.to_rgb8();
    let file = std::fs::File::create(path)?;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|e| FetchError::Encode(e.to_string()))?;

    Ok(())
}
