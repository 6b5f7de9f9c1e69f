use crate::ports::http::{FetchRequest, HttpClient};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const REDIRECT_TIMEOUT: Duration = Duration::from_secs(10);

const SHORT_LINK_HOSTS: &[&str] = &["vm.tiktok.com", "vt.tiktok.com"];

/// Expands short links into canonical video URLs. Best effort: a failed
/// lookup leaves the URL as it was.
pub struct UrlNormalizer<C> {
    client: Arc<C>,
}

impl<C> UrlNormalizer<C>
where
    C: HttpClient,
{
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    pub async fn normalize(&self, url: &str) -> String {
        let url = with_scheme(url);
        if !is_short_link(&url) {
            return url;
        }

        let request = FetchRequest::browser(url.as_str(), REDIRECT_TIMEOUT);
        match self.client.resolve_redirects(request).await {
            Ok(resolved) => {
                tracing::debug!("Expanded short link {} -> {}", url, resolved);
                resolved
            }
            Err(e) => {
                tracing::warn!("Could not expand short link {}: {}", url, e);
                url
            }
        }
    }
}

/// Short-link hosts, or `/t/<token>` paths on the main site.
pub fn is_short_link(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str().map(|h| h.to_ascii_lowercase()) else {
        return false;
    };

    if SHORT_LINK_HOSTS.contains(&host.as_str()) {
        return true;
    }

    let on_platform = host == "tiktok.com" || host.ends_with(".tiktok.com");
    on_platform && parsed.path().starts_with("/t/")
}

/// Pasted links often come without a scheme (`vm.tiktok.com/abc`).
fn with_scheme(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
