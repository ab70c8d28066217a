//! Formatting helpers for what the user sees: sizes, shortened URLs and
//! image type detection.

/// Bytes rendered as kilobytes with two decimals, e.g. `"1953.13 KB"`.
/// Ties round up, so 128 bytes reads `"0.13 KB"`.
pub fn format_kb(bytes: f64) -> String {
    let hundredths = (bytes / 1024.0 * 100.0).round() / 100.0;
    format!("{:.2} KB", hundredths)
}

/// Keep the first quarter of the URL and mark the cut with `...`.
pub fn truncate_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    let keep = url.chars().count() / 4;
    let head: String = url.chars().take(keep).collect();
    format!("{}...", head)
}

/// MIME type of an image recognised from its magic bytes.
pub fn mime_for(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes) {
        Ok(format) => Some(format.to_mime_type()),
        Err(_) => {
            tracing::debug!(
                "Unrecognized image format (first 4 bytes: {:02X?})",
                &bytes[..bytes.len().min(4)]
            );
            None
        }
    }
}
