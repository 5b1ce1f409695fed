#[must_use]
pub fn detect_mime(data: &[u8]) -> Option<String> {
    infer::get(data).map(|info| info.mime_type().to_string())
}

#[must_use]
pub fn detect_mime_from_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg".into()),
        "png" => Some("image/png".into()),
        "gif" => Some("image/gif".into()),
        "webp" => Some("image/webp".into()),
        "heic" => Some("image/heic".into()),
        _ => None,
    }
}

/// Image media type from magic bytes, falling back to the file extension.
#[must_use]
pub fn detect_image_mime(data: &[u8], filename: Option<&str>) -> Option<String> {
    detect_mime(data)
        .or_else(|| filename.and_then(detect_mime_from_extension))
        .filter(|mime| mime.starts_with("image/"))
}
