use super::resolver::fetch_failure;
use crate::domain::aggregator;
use crate::domain::{ResolutionResult, ResolveError};
use crate::ports::http::{FetchRequest, HttpClient};
use crate::ports::source::MetadataSource;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves videos through a third-party aggregation API.
pub struct AggregatorApi<C> {
    client: Arc<C>,
    /// Full API endpoint, e.g. `https://www.tikwm.com/api/`
    endpoint: String,
    /// Origin used for the referer and for relative media paths
    host: String,
}

impl<C> AggregatorApi<C>
where
    C: HttpClient,
{
    pub fn new(client: Arc<C>, endpoint: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            host: host.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn request_url(&self, canonical_url: &str) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}url={}&hd=1",
            self.endpoint,
            separator,
            urlencoding::encode(canonical_url)
        )
    }
}

#[async_trait]
impl<C> MetadataSource for AggregatorApi<C>
where
    C: HttpClient,
{
    async fn fetch_metadata(&self, canonical_url: &str) -> ResolutionResult {
        let request = FetchRequest::browser(self.request_url(canonical_url), API_TIMEOUT)
            .header("Referer", format!("{}/", self.host));

        let response = self
            .client
            .get_text(request)
            .await
            .map_err(fetch_failure)?;

        if response.status != 200 {
            tracing::warn!(
                "Aggregator answered {} for {}",
                response.status,
                canonical_url
            );
            return Err(ResolveError::upstream("connection error"));
        }

        aggregator::parse_response(&response.body, &self.host)
    }

    fn name(&self) -> &'static str {
        "aggregator_api"
    }
}
