use crate::domain::VideoMetadata;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub url: String,
    pub filename: Option<String>,
}

/// Body of `/api/download` and `/api/info`. Domain failures are reported
/// here with `success: false`, never as an HTTP error.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub video: Option<String>,
    pub video_hd: Option<String>,
    pub video_sd: Option<String>,
    pub audio: Option<String>,
    pub thumbnail: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub duration: Option<String>,
    pub error: Option<String>,
}

impl DownloadResponse {
    pub fn success(metadata: &VideoMetadata) -> Self {
        Self {
            success: true,
            video: metadata.primary().map(str::to_string),
            video_hd: metadata.hd().map(str::to_string),
            video_sd: metadata.sd().map(str::to_string),
            audio: metadata.audio.clone(),
            thumbnail: metadata.thumbnail.clone(),
            title: Some(metadata.title.clone()),
            author: metadata.author.clone(),
            duration: metadata.duration_label(),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub detail: &'static str,
}
