//! Image ingestion pipeline.
//!
//! Normalizes heterogeneous image references into stored object-storage
//! URLs. An input is classified as a Drive sharing link, a generic HTTP(S)
//! URL, or a base64 data URL; anything else is an invalid format. Drive
//! links go through an ordered chain of download strategies; every
//! downloaded or decoded image is uploaded under a deterministic object
//! name. Each image in a batch is processed independently and sequentially,
//! and one failure never aborts the rest.

mod error;

pub use error::ImageError;

use std::sync::LazyLock;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use serde::Serialize;
use tracing::instrument;

use super::storage::StorageClient;

/// Per-candidate timeout for Drive download attempts.
const DRIVE_CANDIDATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on accepted image bodies (50 MB).
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

/// Hosting-service domains recognized as Drive sharing links.
const DRIVE_DOMAINS: &[&str] = &["drive.google.com", "docs.google.com"];

/// Browser-like header set used for downloads; several hosts refuse
/// requests without them.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Patterns are literals; construction cannot fail and is covered by tests.
#[allow(clippy::unwrap_used)]
static DRIVE_FILE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/file/d/([a-zA-Z0-9_-]+)").unwrap());

#[allow(clippy::unwrap_used)]
static DRIVE_QUERY_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=([a-zA-Z0-9_-]+)").unwrap());

#[allow(clippy::unwrap_used)]
static BASE64_MIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"data:([^;]+);base64").unwrap());

/// Patterns for download-confirmation links embedded in Drive HTML
/// interstitial pages, tried in order.
#[allow(clippy::unwrap_used)]
static HTML_CONFIRM_LINK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"href="([^"]*uc[^"]*export=download[^"]*)""#,
        r#"href="([^"]*export=download[^"]*)""#,
        r"window\.open\('([^']*export=download[^']*)'\)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// How an input string was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// A hosting-service sharing link requiring identifier extraction.
    DriveLink,
    /// A well-formed generic HTTP(S) URL.
    Url,
    /// A `data:image/...;base64,` payload.
    Base64,
}

/// Outcome of processing one image input.
#[derive(Debug, Clone, Serialize)]
pub struct ImageResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "originalUrl")]
    pub original_url: String,
}

impl ImageResult {
    fn ok(original: String, url: String) -> Self {
        Self {
            success: true,
            url: Some(url),
            error: None,
            original_url: original,
        }
    }

    fn failed(err: &ImageError) -> Self {
        Self {
            success: false,
            url: None,
            error: Some(err.to_string()),
            original_url: err.input().to_owned(),
        }
    }
}

/// Basic metadata sniffed from downloaded bytes.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ImageMetadata {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub image_type: Option<&'static str>,
}

// =============================================================================
// Classification
// =============================================================================

/// Whether the input is a Drive sharing link (domain substring match).
#[must_use]
pub fn is_drive_link(input: &str) -> bool {
    DRIVE_DOMAINS.iter().any(|domain| input.contains(domain))
}

/// Whether the input is a well-formed HTTP(S) URL.
#[must_use]
pub fn is_valid_url(input: &str) -> bool {
    url::Url::parse(input)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Whether the input is a base64 image data URL.
#[must_use]
pub fn is_base64_image(input: &str) -> bool {
    input.starts_with("data:image/") && input.contains("base64,")
}

/// Classify an input string.
///
/// Classification order matters: Drive links parse as URLs too, so the
/// domain match runs first.
///
/// # Errors
///
/// Returns `ImageError::InvalidFormat` when no classification applies.
pub fn classify(input: &str) -> Result<ImageSource, ImageError> {
    if is_drive_link(input) {
        Ok(ImageSource::DriveLink)
    } else if is_valid_url(input) {
        Ok(ImageSource::Url)
    } else if is_base64_image(input) {
        Ok(ImageSource::Base64)
    } else {
        Err(ImageError::InvalidFormat {
            input: input.to_owned(),
        })
    }
}

// =============================================================================
// Drive link handling
// =============================================================================

/// Extract the file identifier from a Drive sharing link.
///
/// Two shapes are accepted: `/file/d/<id>/...` and `?...id=<id>...`.
#[must_use]
pub fn extract_drive_file_id(link: &str) -> Option<String> {
    DRIVE_FILE_PATH_RE
        .captures(link)
        .or_else(|| DRIVE_QUERY_ID_RE.captures(link))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Rewrite a Drive sharing link to the canonical direct-download form.
///
/// # Errors
///
/// Returns `ImageError::InvalidFormat` when neither accepted link shape
/// matches; no partial or garbage identifier is ever produced.
pub fn drive_link_to_direct(link: &str) -> Result<String, ImageError> {
    let file_id = extract_drive_file_id(link).ok_or_else(|| ImageError::InvalidFormat {
        input: link.to_owned(),
    })?;

    Ok(format!(
        "https://drive.google.com/uc?export=download&id={file_id}"
    ))
}

/// Ordered download strategies for a Drive file, tried until one yields
/// binary image content.
#[must_use]
fn drive_download_candidates(file_id: &str) -> Vec<String> {
    vec![
        format!("https://drive.google.com/uc?export=download&id={file_id}"),
        format!("https://drive.google.com/uc?export=download&id={file_id}&confirm=t"),
        format!("https://drive.google.com/thumbnail?id={file_id}&sz=w1000"),
        format!("https://lh3.googleusercontent.com/d/{file_id}"),
        format!("https://docs.google.com/uc?export=download&id={file_id}"),
    ]
}

/// Scan a Drive HTML confirmation page for an embedded download link.
#[must_use]
fn find_confirm_link(html: &str) -> Option<String> {
    for re in HTML_CONFIRM_LINK_RES.iter() {
        if let Some(caps) = re.captures(html) {
            if let Some(m) = caps.get(1) {
                let link = m.as_str();
                let absolute = if link.starts_with("http") {
                    link.to_owned()
                } else {
                    format!("https://drive.google.com{link}")
                };
                return Some(absolute.replace("&amp;", "&"));
            }
        }
    }
    None
}

// =============================================================================
// Base64 handling
// =============================================================================

/// MIME type declared in a base64 data URL, defaulting to `image/png`.
#[must_use]
pub fn base64_mime_type(input: &str) -> String {
    BASE64_MIME_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| "image/png".to_owned(), |m| m.as_str().to_owned())
}

/// Decode the payload after the comma separator of a data URL.
fn decode_base64_payload(input: &str) -> Result<Vec<u8>, ImageError> {
    let payload = input
        .split_once("base64,")
        .map(|(_, rest)| rest)
        .ok_or_else(|| ImageError::InvalidFormat {
            input: input.to_owned(),
        })?;

    BASE64
        .decode(payload.trim())
        .map_err(|_| ImageError::InvalidFormat {
            input: input.to_owned(),
        })
}

// =============================================================================
// Naming
// =============================================================================

/// File extension for a MIME type, defaulting to `jpg`.
///
/// Content-type parameters (`; charset=...`) are ignored.
#[must_use]
fn extension_for_mime(mime: &str) -> &str {
    let essence = mime.split(';').next().unwrap_or(mime).trim();
    match essence.split('/').nth(1) {
        Some(sub) if !sub.is_empty() => sub,
        _ => "jpg",
    }
}

/// Object name for a processed image: owner identifier, per-image sequence
/// index, and a millisecond timestamp, with the extension derived from the
/// detected MIME type.
#[must_use]
fn object_name(owner: &str, index: usize, mime: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let extension = extension_for_mime(mime);
    format!("experience-{owner}-{index}-{timestamp}.{extension}")
}

/// Whether a content type denotes binary image content.
fn is_image_content_type(content_type: &str) -> bool {
    content_type.contains("image/") || content_type.contains("application/octet-stream")
}

/// Magic-byte image type sniffing (jpeg/png/gif/webp).
#[must_use]
pub fn sniff_image_type(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, ..] => Some("jpeg"),
        [0x89, 0x50, ..] => Some("png"),
        [0x47, 0x49, ..] => Some("gif"),
        [0x52, 0x49, ..] => Some("webp"),
        _ => None,
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// The image ingestion pipeline.
///
/// Batches are processed strictly sequentially; downloads and uploads are
/// independent per image.
#[derive(Clone)]
pub struct ImagePipeline {
    http: reqwest::Client,
    storage: StorageClient,
}

impl ImagePipeline {
    /// Create a new pipeline over a storage client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(storage: StorageClient) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, storage }
    }

    /// Process one image input and store it under the owner's name.
    ///
    /// Never returns `Err` to the caller; failures are folded into the
    /// returned [`ImageResult`].
    #[instrument(skip(self), fields(owner = %owner, index))]
    pub async fn process(&self, input: &str, owner: &str, index: usize) -> ImageResult {
        match self.process_inner(input, owner, index).await {
            Ok(url) => ImageResult::ok(input.to_owned(), url),
            Err(e) => {
                tracing::warn!(error = %e, "image processing failed");
                ImageResult::failed(&e)
            }
        }
    }

    /// Process a batch sequentially, one result per input, preserving input
    /// order. A failure in one item does not prevent later items from
    /// succeeding.
    pub async fn process_multiple(&self, inputs: &[String], owner: &str) -> Vec<ImageResult> {
        let mut results = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            results.push(self.process(input, owner, index).await);
        }
        results
    }

    async fn process_inner(
        &self,
        input: &str,
        owner: &str,
        index: usize,
    ) -> Result<String, ImageError> {
        let (bytes, mime) = match classify(input)? {
            ImageSource::DriveLink => self.download_from_drive(input).await?,
            ImageSource::Url => self.download_url(input).await?,
            ImageSource::Base64 => {
                let bytes = decode_base64_payload(input)?;
                (bytes, base64_mime_type(input))
            }
        };

        let name = object_name(owner, index, &mime);
        self.storage
            .upload(&name, bytes, &mime)
            .await
            .map_err(|e| ImageError::UploadFailed {
                input: input.to_owned(),
                reason: e.to_string(),
            })
    }

    /// Fetch a generic URL with browser-like headers.
    async fn download_url(&self, input: &str) -> Result<(Vec<u8>, String), ImageError> {
        let response = self
            .http
            .get(input)
            .header("accept", "image/*,*/*;q=0.8")
            .header("accept-language", "en-US,en;q=0.5")
            .header("dnt", "1")
            .send()
            .await
            .map_err(|e| ImageError::DownloadFailed {
                input: input.to_owned(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ImageError::DownloadFailed {
                input: input.to_owned(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|ct| ct.starts_with("image/"))
            .map_or_else(|| "image/jpeg".to_owned(), |ct| ct.to_owned());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::DownloadFailed {
                input: input.to_owned(),
                reason: e.to_string(),
            })?;

        Ok((bytes.to_vec(), mime))
    }

    /// Try each Drive download strategy in order until one yields bounded
    /// binary image content; an HTML answer is scanned for an embedded
    /// confirmation link which is followed once. Exhaustion is terminal.
    async fn download_from_drive(&self, input: &str) -> Result<(Vec<u8>, String), ImageError> {
        let file_id =
            extract_drive_file_id(input).ok_or_else(|| ImageError::InvalidFormat {
                input: input.to_owned(),
            })?;

        for candidate in drive_download_candidates(&file_id) {
            tracing::debug!(candidate = %candidate, "trying drive download strategy");

            let response = match self
                .http
                .get(&candidate)
                .timeout(DRIVE_CANDIDATE_TIMEOUT)
                .header("accept", "image/*,*/*;q=0.8")
                .header("accept-language", "en-US,en;q=0.5")
                .header("referer", "https://drive.google.com/")
                .header("dnt", "1")
                .send()
                .await
            {
                Ok(r) if r.status().is_success() => r,
                Ok(_) | Err(_) => continue,
            };

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned();

            if is_image_content_type(&content_type) {
                if let Ok(bytes) = response.bytes().await {
                    if !bytes.is_empty() && bytes.len() < MAX_IMAGE_BYTES {
                        let mime = if content_type.starts_with("image/") {
                            content_type
                        } else {
                            "image/jpeg".to_owned()
                        };
                        return Ok((bytes.to_vec(), mime));
                    }
                }
                continue;
            }

            // An HTML answer is usually the virus-scan confirmation page;
            // follow its embedded download link once.
            if content_type.contains("text/html") {
                let Ok(html) = response.text().await else {
                    continue;
                };
                if let Some(link) = find_confirm_link(&html) {
                    tracing::debug!(link = %link, "following drive confirmation link");
                    if let Ok((bytes, mime)) = self.download_url(&link).await {
                        if !bytes.is_empty() {
                            return Ok((bytes, mime));
                        }
                    }
                }
            }
        }

        Err(ImageError::DownloadFailed {
            input: input.to_owned(),
            reason: "all download strategies failed; the file may not be publicly accessible"
                .to_owned(),
        })
    }

    /// Check that a URL answers a HEAD request successfully.
    pub async fn validate_url(&self, input: &str) -> bool {
        self.http
            .head(input)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Fetch a URL and sniff basic image metadata from its magic bytes.
    pub async fn metadata(&self, input: &str) -> ImageMetadata {
        let Ok(response) = self.http.get(input).send().await else {
            return ImageMetadata::default();
        };
        if !response.status().is_success() {
            return ImageMetadata::default();
        }
        let Ok(bytes) = response.bytes().await else {
            return ImageMetadata::default();
        };

        ImageMetadata {
            image_type: sniff_image_type(&bytes),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_order() {
        // Drive links also parse as URLs; the domain match must win.
        assert_eq!(
            classify("https://drive.google.com/file/d/abc123/view").unwrap(),
            ImageSource::DriveLink
        );
        assert_eq!(
            classify("https://cdn.example.com/a.jpg").unwrap(),
            ImageSource::Url
        );
        assert_eq!(
            classify("data:image/png;base64,iVBORw0KGgo=").unwrap(),
            ImageSource::Base64
        );
    }

    #[test]
    fn test_classification_invalid() {
        for input in ["", "not a url", "ftp://host/file.jpg", "data:text/plain;base64,aGk="] {
            assert!(matches!(
                classify(input),
                Err(ImageError::InvalidFormat { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_format_carries_input() {
        let err = classify("not a url").unwrap_err();
        assert_eq!(err.input(), "not a url");
    }

    #[test]
    fn test_extract_file_id_path_shape() {
        let id = extract_drive_file_id("https://drive.google.com/file/d/1AbC_d-9xyz/view?usp=sharing");
        assert_eq!(id.as_deref(), Some("1AbC_d-9xyz"));
    }

    #[test]
    fn test_extract_file_id_query_shape() {
        let id = extract_drive_file_id("https://drive.google.com/open?id=1AbC_d-9xyz");
        assert_eq!(id.as_deref(), Some("1AbC_d-9xyz"));
    }

    #[test]
    fn test_extract_file_id_unrecognized() {
        assert!(extract_drive_file_id("https://drive.google.com/drive/folders/shared").is_none());
    }

    #[test]
    fn test_drive_link_round_trip() {
        for link in [
            "https://drive.google.com/file/d/FILE99/view",
            "https://drive.google.com/open?id=FILE99",
        ] {
            let direct = drive_link_to_direct(link).unwrap();
            assert_eq!(
                direct,
                "https://drive.google.com/uc?export=download&id=FILE99"
            );
            // The rewritten URL still extracts to the same identifier.
            assert_eq!(extract_drive_file_id(&direct).as_deref(), Some("FILE99"));
        }
    }

    #[test]
    fn test_drive_link_to_direct_rejects_garbage() {
        let err = drive_link_to_direct("https://drive.google.com/drive/my-drive").unwrap_err();
        assert!(matches!(err, ImageError::InvalidFormat { .. }));
    }

    #[test]
    fn test_candidate_chain_order() {
        let candidates = drive_download_candidates("FILE42");
        assert_eq!(candidates.len(), 5);
        assert!(candidates[0].contains("uc?export=download&id=FILE42"));
        assert!(candidates[1].ends_with("confirm=t"));
        assert!(candidates[2].contains("thumbnail"));
        assert!(candidates[3].contains("lh3.googleusercontent.com"));
        assert!(candidates[4].starts_with("https://docs.google.com/"));
    }

    #[test]
    fn test_find_confirm_link_relative() {
        let html = r#"<a href="/uc?export=download&amp;id=F1&amp;confirm=t">Download anyway</a>"#;
        let link = find_confirm_link(html).unwrap();
        assert_eq!(
            link,
            "https://drive.google.com/uc?export=download&id=F1&confirm=t"
        );
    }

    #[test]
    fn test_find_confirm_link_window_open() {
        let html = r"<script>window.open('https://docs.google.com/uc?export=download&id=F2')</script>";
        let link = find_confirm_link(html).unwrap();
        assert!(link.starts_with("https://docs.google.com/"));
    }

    #[test]
    fn test_find_confirm_link_absent() {
        assert!(find_confirm_link("<html><body>quota exceeded</body></html>").is_none());
    }

    #[test]
    fn test_base64_mime_type() {
        assert_eq!(
            base64_mime_type("data:image/webp;base64,AAAA"),
            "image/webp"
        );
        assert_eq!(base64_mime_type("random string"), "image/png");
    }

    #[test]
    fn test_decode_base64_payload() {
        let data = format!("data:image/png;base64,{}", BASE64.encode([1u8, 2, 3]));
        assert_eq!(decode_base64_payload(&data).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_base64_payload_bad_data() {
        assert!(decode_base64_payload("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/jpeg"), "jpeg");
        assert_eq!(extension_for_mime("image/png; charset=binary"), "png");
        assert_eq!(extension_for_mime("binary"), "jpg");
        assert_eq!(extension_for_mime(""), "jpg");
    }

    #[test]
    fn test_object_name_shape() {
        let name = object_name("exp-7", 3, "image/png");
        assert!(name.starts_with("experience-exp-7-3-"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_is_image_content_type() {
        assert!(is_image_content_type("image/jpeg"));
        assert!(is_image_content_type("application/octet-stream"));
        assert!(!is_image_content_type("text/html; charset=utf-8"));
    }

    #[test]
    fn test_sniff_image_type() {
        assert_eq!(sniff_image_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("jpeg"));
        assert_eq!(sniff_image_type(&[0x89, 0x50, 0x4E, 0x47]), Some("png"));
        assert_eq!(sniff_image_type(&[0x47, 0x49, 0x46, 0x38]), Some("gif"));
        assert_eq!(sniff_image_type(&[0x52, 0x49, 0x46, 0x46]), Some("webp"));
        assert_eq!(sniff_image_type(&[0x00, 0x01]), None);
        assert_eq!(sniff_image_type(&[]), None);
    }

    #[tokio::test]
    async fn test_process_multiple_reports_invalid_items_in_order() {
        use crate::config::StorageConfig;
        use secrecy::SecretString;

        let pipeline = ImagePipeline::new(StorageClient::new(&StorageConfig {
            base_url: "http://127.0.0.1:0".to_string(),
            service_key: SecretString::from("test-key"),
            bucket: "experiences".to_string(),
        }));

        // Invalid inputs never reach the network, so this exercises the
        // batch contract hermetically: one result per input, input order,
        // failures independent.
        let inputs = vec![
            "not a url at all".to_string(),
            "ftp://host/image.jpg".to_string(),
            "data:text/plain;base64,aGk=".to_string(),
        ];
        let results = pipeline.process_multiple(&inputs, "exp-1").await;

        assert_eq!(results.len(), inputs.len());
        for (result, input) in results.iter().zip(&inputs) {
            assert!(!result.success);
            assert_eq!(&result.original_url, input);
            assert!(result.error.is_some());
        }
    }
}
