use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title used whenever the upstream payload carries no description.
pub const DEFAULT_TITLE: &str = "TikTok video";

pub const GENERIC_ERROR_MESSAGE: &str = "error processing video, try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Hd,
    Sd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaVariant {
    pub kind: VariantKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// At most one variant per kind.
    pub variants: Vec<MediaVariant>,
    pub thumbnail: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub duration_seconds: Option<u64>,
    pub audio: Option<String>,
}

impl Default for VideoMetadata {
    fn default() -> Self {
        Self {
            variants: Vec::new(),
            thumbnail: None,
            title: DEFAULT_TITLE.to_string(),
            author: None,
            duration_seconds: None,
            audio: None,
        }
    }
}

impl VideoMetadata {
    /// Sets (or replaces) the URL for a variant kind. Empty URLs are ignored.
    pub fn set_variant(&mut self, kind: VariantKind, url: Option<String>) {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return;
        };
        self.variants.retain(|v| v.kind != kind);
        self.variants.push(MediaVariant { kind, url });
    }

    pub fn variant(&self, kind: VariantKind) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.kind == kind)
            .map(|v| v.url.as_str())
    }

    pub fn hd(&self) -> Option<&str> {
        self.variant(VariantKind::Hd)
    }

    pub fn sd(&self) -> Option<&str> {
        self.variant(VariantKind::Sd)
    }

    /// Best available media URL: HD first, SD otherwise.
    pub fn primary(&self) -> Option<&str> {
        self.hd().or_else(|| self.sd())
    }

    /// Duration rendered the way clients display it, e.g. `"15s"`.
    pub fn duration_label(&self) -> Option<String> {
        self.duration_seconds.map(|d| format!("{}s", d))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    NetworkError,
    UpstreamError,
    NotFound,
    ParseError,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct ResolveError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ResolveError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Message safe to hand back to callers. Internal details never leave
    /// the process.
    pub fn user_message(&self) -> &str {
        match self.kind {
            ErrorKind::Internal => GENERIC_ERROR_MESSAGE,
            _ => &self.message,
        }
    }
}

pub type ResolutionResult = Result<VideoMetadata, ResolveError>;
