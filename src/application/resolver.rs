use super::aggregator::AggregatorApi;
use super::normalizer::UrlNormalizer;
use super::scraper::PageScraper;
use crate::config::{GatewayConfig, ResolverStrategy};
use crate::domain::identifier::extract_video_id;
use crate::domain::{ResolutionResult, ResolveError};
use crate::ports::http::{FetchError, HttpClient};
use crate::ports::source::MetadataSource;
use std::sync::Arc;

pub const PLATFORM_DOMAIN: &str = "tiktok.com";

/// URL → canonical URL → metadata, through whichever source was configured.
pub struct ResolverService<C> {
    normalizer: UrlNormalizer<C>,
    source: Box<dyn MetadataSource>,
}

impl<C> ResolverService<C>
where
    C: HttpClient,
{
    pub fn new(normalizer: UrlNormalizer<C>, source: Box<dyn MetadataSource>) -> Self {
        Self { normalizer, source }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub async fn resolve(&self, raw_url: &str) -> ResolutionResult {
        let url = validate_url(raw_url)?;

        let canonical = self.normalizer.normalize(url).await;

        // The id is only checked for logging; resolution goes by full URL.
        match extract_video_id(&canonical) {
            Some(id) => tracing::debug!("Resolving video {} via {}", id, self.source.name()),
            None => tracing::warn!("No video id recognised in {}, trying anyway", canonical),
        }

        let result = self.source.fetch_metadata(&canonical).await;
        if let Err(e) = &result {
            tracing::info!("Resolution of {} failed: {}", canonical, e);
        }
        result
    }
}

/// Builds the metadata source selected in the configuration.
pub fn build_source<C>(config: &GatewayConfig, client: Arc<C>) -> Box<dyn MetadataSource>
where
    C: HttpClient + 'static,
{
    match config.strategy {
        ResolverStrategy::Aggregator => Box::new(AggregatorApi::new(
            client,
            config.aggregator_endpoint.clone(),
            config.aggregator_host.clone(),
        )),
        ResolverStrategy::Scrape => Box::new(PageScraper::new(client)),
    }
}

/// Rejects empty and off-platform URLs before any network call.
pub fn validate_url(raw_url: &str) -> Result<&str, ResolveError> {
    let url = raw_url.trim();
    if url.is_empty() {
        return Err(ResolveError::invalid_input("URL not provided"));
    }
    if !contains_platform_domain(url) {
        return Err(ResolveError::invalid_input(
            "invalid URL, provide a TikTok link",
        ));
    }
    Ok(url)
}

pub fn contains_platform_domain(url: &str) -> bool {
    url.to_ascii_lowercase().contains(PLATFORM_DOMAIN)
}

pub(crate) fn fetch_failure(error: FetchError) -> ResolveError {
    match error {
        FetchError::Timeout => ResolveError::network("timeout"),
        other => ResolveError::network(other.to_string()),
    }
}
