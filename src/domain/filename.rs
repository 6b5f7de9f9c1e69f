//! Download filenames and the `Content-Disposition` header built from them.

/// Base name used when the caller's hint sanitizes to nothing.
pub const DEFAULT_FILENAME: &str = "tiktok_video";

const MAX_FILENAME_LEN: usize = 50;

/// Keeps `[A-Za-z0-9_-]`, replaces everything else with `_` and truncates to
/// 50 characters.
pub fn sanitize_filename(hint: &str) -> String {
    let sanitized: String = hint
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LEN)
        .collect();

    if sanitized.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// `Content-Disposition` value for a sanitized base name.
pub fn attachment_disposition(base_name: &str) -> String {
    format!("attachment; filename=\"{}.mp4\"", base_name)
}
