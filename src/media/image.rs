use super::detection::detect_image_mime;
use crate::error::{EngineError, Result, ServiceKind};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Raw image payload. Clones share the underlying buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    media_type: String,
    bytes: Arc<[u8]>,
}

impl ImageData {
    /// Wrap uploaded bytes, sniffing the media type from the payload.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_named_bytes(bytes, None)
    }

    /// Like [`ImageData::from_bytes`], using `filename` as an extension hint
    /// when the magic bytes are not recognized.
    pub fn from_named_bytes(bytes: impl Into<Vec<u8>>, filename: Option<&str>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(EngineError::Validation("image payload is empty".into()));
        }
        let media_type = detect_image_mime(&bytes, filename).ok_or_else(|| {
            EngineError::Validation(format!(
                "payload is not a recognized image ({} bytes)",
                bytes.len()
            ))
        })?;
        Ok(Self {
            media_type,
            bytes: bytes.into(),
        })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            EngineError::Validation(format!("failed to read image {}: {e}", path.display()))
        })?;
        let filename = path.file_name().and_then(|name| name.to_str());
        Self::from_named_bytes(bytes, filename)
    }

    /// Decode a `data:<mime>;base64,<payload>` reference.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| EngineError::Validation("not a data URL".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| EngineError::Validation("data URL has no payload".into()))?;
        let Some(declared) = header.strip_suffix(";base64") else {
            return Err(EngineError::Validation(
                "only base64 data URLs are supported".into(),
            ));
        };
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| EngineError::Validation(format!("invalid base64 image payload: {e}")))?;

        let image = Self::from_bytes(bytes)?;
        if image.media_type != declared {
            tracing::debug!(
                declared,
                sniffed = %image.media_type,
                "data URL media type differs from payload; trusting payload"
            );
        }
        Ok(image)
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.to_base64())
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Turn an image reference (data URL or http(s) URL) into image bytes.
pub async fn resolve_reference(client: &reqwest::Client, reference: &str) -> Result<ImageData> {
    if reference.starts_with("data:") {
        return ImageData::from_data_url(reference);
    }

    let parsed = url::Url::parse(reference)
        .map_err(|e| EngineError::Validation(format!("invalid image reference: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(EngineError::Validation(format!(
            "unsupported image reference scheme: {}",
            parsed.scheme()
        )));
    }

    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|e| EngineError::transport(ServiceKind::Generator, e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(EngineError::service(
            ServiceKind::Generator,
            format!("image download failed ({status})"),
        ));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| EngineError::transport(ServiceKind::Generator, e.to_string()))?;
    ImageData::from_bytes(bytes.to_vec())
}

/// Shorten data URLs for logs and terminal output.
pub fn elide_reference(reference: &str) -> String {
    const KEEP: usize = 48;
    if reference.starts_with("data:") && reference.len() > KEEP {
        let mut end = KEEP;
        while !reference.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}… ({} chars)", &reference[..end], reference.len())
    } else {
        reference.to_string()
    }
}
