//! Embedded-JSON payload parsers for TikTok video pages.
//!
//! Each parser recognises one payload shape and returns `None` when the page
//! doesn't carry it, so `parse_page` can fall through to the next one.

use super::video::{VariantKind, VideoMetadata, DEFAULT_TITLE};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub type PayloadParser = fn(&str) -> Option<VideoMetadata>;

/// Parsers in priority order.
pub const PARSERS: &[(&str, PayloadParser)] = &[
    ("sigi_state", parse_sigi_state),
    ("universal_data", parse_universal_data),
    ("download_addr", parse_download_addr),
];

static SIGI_STATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<script id="SIGI_STATE"[^>]*>([^<]+)</script>"#).unwrap()
});

static UNIVERSAL_DATA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__"[^>]*>([^<]+)</script>"#)
        .unwrap()
});

static DOWNLOAD_ADDR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""downloadAddr"\s*:\s*"([^"]+)""#).unwrap());

static NULL: Value = Value::Null;

/// Runs every parser in order and returns the first recognised payload.
pub fn parse_page(html: &str) -> Option<VideoMetadata> {
    PARSERS.iter().find_map(|(name, parser)| {
        let metadata = parser(html)?;
        tracing::debug!("Page payload recognised as {}", name);
        Some(metadata)
    })
}

/// `SIGI_STATE`: `ItemModule` keyed by video id, first entry wins.
pub fn parse_sigi_state(html: &str) -> Option<VideoMetadata> {
    let data = script_json(&SIGI_STATE, html)?;
    let (_, item) = data.get("ItemModule")?.as_object()?.iter().next()?;

    let video = item.get("video").filter(|v| v.is_object())?;
    let author = item.get("author").filter(|a| a.is_object() || a.is_string())?;

    let mut metadata = item_metadata(item, video, author);
    metadata.set_variant(VariantKind::Hd, str_field(video, "downloadAddr"));
    metadata.set_variant(VariantKind::Sd, str_field(video, "playAddr"));
    Some(metadata)
}

/// `__UNIVERSAL_DATA_FOR_REHYDRATION__`: the item struct lives under the
/// default scope's video-detail namespace.
pub fn parse_universal_data(html: &str) -> Option<VideoMetadata> {
    let data = script_json(&UNIVERSAL_DATA, html)?;
    let item = data
        .get("__DEFAULT_SCOPE__")?
        .get("webapp.video-detail")?
        .get("itemInfo")?
        .get("itemStruct")?;

    if item.as_object().map_or(true, |o| o.is_empty()) {
        return None;
    }

    let video = item.get("video").unwrap_or(&NULL);
    let author = item.get("author").unwrap_or(&NULL);

    let play = bitrate_play_url(video).or_else(|| str_field(video, "playAddr"));

    let mut metadata = item_metadata(item, video, author);
    metadata.set_variant(VariantKind::Hd, str_field(video, "downloadAddr"));
    metadata.set_variant(VariantKind::Sd, play);
    Some(metadata)
}

/// Last resort: any `"downloadAddr"` string anywhere in the markup.
pub fn parse_download_addr(html: &str) -> Option<VideoMetadata> {
    let raw = DOWNLOAD_ADDR.captures(html)?.get(1)?.as_str();
    let url = unescape(raw);

    let mut metadata = VideoMetadata::default();
    metadata.set_variant(VariantKind::Hd, Some(url.clone()));
    metadata.set_variant(VariantKind::Sd, Some(url));
    Some(metadata)
}

fn script_json(regex: &Regex, html: &str) -> Option<Value> {
    let raw = regex.captures(html)?.get(1)?.as_str();
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Embedded script is not valid JSON: {}", e);
            None
        }
    }
}

fn item_metadata(item: &Value, video: &Value, author: &Value) -> VideoMetadata {
    VideoMetadata {
        thumbnail: str_field(video, "cover").or_else(|| str_field(video, "originCover")),
        title: str_field(item, "desc").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author: author_name(author),
        duration_seconds: duration_field(video, "duration"),
        ..Default::default()
    }
}

fn author_name(author: &Value) -> Option<String> {
    match author {
        Value::String(name) if !name.is_empty() => Some(name.clone()),
        _ => str_field(author, "uniqueId").or_else(|| str_field(author, "nickname")),
    }
}

fn bitrate_play_url(video: &Value) -> Option<String> {
    video
        .get("bitrateInfo")?
        .as_array()?
        .iter()
        .find_map(|entry| {
            entry
                .get("PlayAddr")?
                .get("UrlList")?
                .as_array()?
                .first()?
                .as_str()
                .map(str::to_string)
        })
}

pub(crate) fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Positive whole seconds; fractional values are rounded.
pub(crate) fn duration_field(value: &Value, key: &str) -> Option<u64> {
    let field = value.get(key)?;
    field
        .as_u64()
        .or_else(|| field.as_f64().filter(|d| *d >= 0.0).map(|d| d.round() as u64))
        .filter(|d| *d > 0)
}

/// Decodes JSON string escapes (`/`, `\/`). Returns the input unchanged
/// when it isn't a valid JSON string body.
fn unescape(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| raw.to_string())
}
