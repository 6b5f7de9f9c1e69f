//! Video identifier extraction from TikTok URLs.
//!
//! Rules are evaluated in table order and the first capture wins. Adding a new
//! URL shape means adding a row to `RULES`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Numeric path segments at or below this length are not treated as ids.
const MIN_FALLBACK_ID_LEN: usize = 10;

struct ExtractionRule {
    name: &'static str,
    pattern: &'static str,
}

const RULES: &[ExtractionRule] = &[
    ExtractionRule {
        name: "video",
        pattern: r"tiktok\.com/@[\w.-]+/video/(\d+)",
    },
    ExtractionRule {
        name: "photo",
        pattern: r"tiktok\.com/@[\w.-]+/photo/(\d+)",
    },
    ExtractionRule {
        name: "short_path",
        pattern: r"tiktok\.com/t/(\w+)",
    },
    ExtractionRule {
        name: "short_host",
        pattern: r"v[mt]\.tiktok\.com/(\w+)",
    },
    ExtractionRule {
        name: "query",
        pattern: r"tiktok\.com/.*[?&]v=(\d+)",
    },
];

static COMPILED: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|rule| (rule.name, Regex::new(rule.pattern).unwrap()))
        .collect()
});

/// Returns the first identifier any rule captures, falling back to the first
/// long numeric path segment.
pub fn extract_video_id(url: &str) -> Option<String> {
    for (name, regex) in COMPILED.iter() {
        if let Some(id) = regex.captures(url).and_then(|c| c.get(1)) {
            tracing::trace!("Identifier matched rule {}", name);
            return Some(id.as_str().to_string());
        }
    }

    numeric_segment(url)
}

fn numeric_segment(url: &str) -> Option<String> {
    url.split('/')
        .map(|segment| segment.split(['?', '#']).next().unwrap_or_default())
        .find(|segment| {
            segment.len() > MIN_FALLBACK_ID_LEN && segment.chars().all(|c| c.is_ascii_digit())
        })
        .map(str::to_string)
}
