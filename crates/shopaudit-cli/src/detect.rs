//! `detect` subcommands. `summarize` works offline on a saved vision
//! response; `analyze` calls the vision API for each image.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Subcommand;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use shopaudit_core::{
    load_keywords_or_default, summarize_envelope, AiDetectionResult, AnnotateResponse, AppConfig,
    BrandKeywords,
};
use shopaudit_vision::{ImageSource, VisionClient};

#[derive(Debug, Subcommand)]
pub enum DetectCommands {
    /// Summarize a stored `images:annotate` response
    Summarize {
        /// JSON file holding the vision response envelope
        path: PathBuf,
        /// Brand keyword YAML (defaults to `SHOPAUDIT_KEYWORDS_PATH` or Lay's)
        #[arg(long)]
        keywords: Option<PathBuf>,
    },
    /// Send images to the vision API and summarize each
    Analyze {
        /// Local image files, or `gs://` / `http(s)://` URIs
        #[arg(required = true)]
        images: Vec<String>,
        /// Brand keyword YAML (defaults to `SHOPAUDIT_KEYWORDS_PATH` or Lay's)
        #[arg(long)]
        keywords: Option<PathBuf>,
        /// Maximum concurrent vision requests
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },
}

#[derive(Debug, Serialize)]
struct ImageAnalysis {
    image: String,
    result: AiDetectionResult,
}

pub(crate) async fn run(config: &AppConfig, command: DetectCommands) -> anyhow::Result<()> {
    match command {
        DetectCommands::Summarize { path, keywords } => {
            let keywords = resolve_keywords(keywords.as_deref(), config)?;
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let envelope: AnnotateResponse = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a vision response", path.display()))?;
            crate::print_json(&summarize_envelope(&envelope, &keywords))
        }
        DetectCommands::Analyze {
            images,
            keywords,
            concurrency,
        } => {
            let keywords = resolve_keywords(keywords.as_deref(), config)?;
            let Some(api_key) = config.vision_api_key.as_deref() else {
                anyhow::bail!("VISION_API_KEY must be set to analyze images");
            };
            let client = VisionClient::with_base_url(
                api_key,
                config.vision_request_timeout_secs,
                config.vision_max_retries,
                config.vision_retry_backoff_base_ms,
                &config.vision_base_url,
            )?;

            let sources = images
                .iter()
                .map(|image| image_source(image))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let results = analyze_all(&client, &keywords, images, sources, concurrency).await;

            let detected = results.iter().filter(|a| a.result.product_detected).count();
            let failed = results.iter().filter(|a| a.result.is_error()).count();
            tracing::info!(
                images = results.len(),
                detected,
                failed,
                "image analysis finished"
            );
            crate::print_json(&results)
        }
    }
}

async fn analyze_all(
    client: &VisionClient,
    keywords: &BrandKeywords,
    images: Vec<String>,
    sources: Vec<ImageSource>,
    concurrency: usize,
) -> Vec<ImageAnalysis> {
    stream::iter(images.into_iter().zip(sources).map(|(image, source)| async move {
        let result = client.analyze(&source, keywords).await;
        ImageAnalysis { image, result }
    }))
    .buffered(concurrency.max(1))
    .collect::<Vec<_>>()
    .await
}

fn resolve_keywords(flag: Option<&Path>, config: &AppConfig) -> anyhow::Result<BrandKeywords> {
    let path = flag.or(config.keywords_path.as_deref());
    Ok(load_keywords_or_default(path)?)
}

/// Remote URIs go to the API as-is; anything else is read from disk.
pub(crate) fn image_source(image: &str) -> anyhow::Result<ImageSource> {
    if is_remote(image) {
        return Ok(ImageSource::Uri(image.to_string()));
    }
    let bytes = std::fs::read(image).with_context(|| format!("failed to read image {image}"))?;
    Ok(ImageSource::Bytes(bytes))
}

fn is_remote(image: &str) -> bool {
    ["gs://", "http://", "https://"]
        .iter()
        .any(|scheme| image.starts_with(scheme))
}
