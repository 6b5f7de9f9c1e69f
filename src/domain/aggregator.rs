//! Response contract of the third-party aggregation API.

use super::video::{ResolutionResult, ResolveError, VariantKind, VideoMetadata, DEFAULT_TITLE};
use serde::Deserialize;

pub const NOT_FOUND_MESSAGE: &str = "video not found or private";
pub const UNRECOGNIZED_MESSAGE: &str = "unrecognized data format";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<ApiVideo>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiVideo {
    play: Option<String>,
    hdplay: Option<String>,
    cover: Option<String>,
    origin_cover: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    music: Option<String>,
    music_info: Option<ApiMusic>,
    author: Option<ApiAuthor>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiMusic {
    play: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiAuthor {
    nickname: Option<String>,
    unique_id: Option<String>,
}

/// Parses an API body. Media URLs without a scheme are resolved against
/// `host`.
pub fn parse_response(body: &str, host: &str) -> ResolutionResult {
    let response: ApiResponse = serde_json::from_str(body).map_err(|e| {
        tracing::warn!("Aggregator returned an unexpected body: {}", e);
        ResolveError::parse(UNRECOGNIZED_MESSAGE)
    })?;

    if response.code != 0 {
        tracing::info!(
            "Aggregator rejected the video (code {}): {}",
            response.code,
            response.msg.as_deref().unwrap_or("-")
        );
        return Err(ResolveError::not_found(NOT_FOUND_MESSAGE));
    }

    let data = response
        .data
        .ok_or_else(|| ResolveError::not_found(NOT_FOUND_MESSAGE))?;

    let play = non_empty(data.play).map(|u| absolutize(&u, host));
    let hdplay = non_empty(data.hdplay)
        .map(|u| absolutize(&u, host))
        .or_else(|| play.clone());

    if play.is_none() && hdplay.is_none() {
        return Err(ResolveError::not_found(NOT_FOUND_MESSAGE));
    }

    let audio = non_empty(data.music)
        .or_else(|| data.music_info.and_then(|m| non_empty(m.play)))
        .map(|u| absolutize(&u, host));
    let author = data.author.unwrap_or_default();

    let mut metadata = VideoMetadata {
        thumbnail: non_empty(data.cover)
            .or_else(|| non_empty(data.origin_cover))
            .map(|u| absolutize(&u, host)),
        title: non_empty(data.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author: non_empty(author.nickname).or_else(|| non_empty(author.unique_id)),
        duration_seconds: data
            .duration
            .filter(|d| *d > 0.0)
            .map(|d| d.round() as u64),
        audio,
        ..Default::default()
    };
    metadata.set_variant(VariantKind::Hd, hdplay);
    metadata.set_variant(VariantKind::Sd, play);

    Ok(metadata)
}

/// Prefixes `host` onto URLs that carry no scheme. Protocol-relative URLs
/// (`//cdn/...`) get `https:`.
pub fn absolutize(url: &str, host: &str) -> String {
    if has_scheme(url) {
        return url.to_string();
    }
    if let Some(rest) = url.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    format!(
        "{}/{}",
        host.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

fn has_scheme(url: &str) -> bool {
    match url.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
