use super::resolver::fetch_failure;
use crate::domain::aggregator::UNRECOGNIZED_MESSAGE;
use crate::domain::payload;
use crate::domain::{ResolutionResult, ResolveError};
use crate::ports::http::{FetchRequest, HttpClient};
use crate::ports::source::MetadataSource;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Reads metadata from the JSON the platform inlines into its video pages.
pub struct PageScraper<C> {
    client: Arc<C>,
}

impl<C> PageScraper<C>
where
    C: HttpClient,
{
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C> MetadataSource for PageScraper<C>
where
    C: HttpClient,
{
    async fn fetch_metadata(&self, canonical_url: &str) -> ResolutionResult {
        let request = FetchRequest::browser(canonical_url, PAGE_TIMEOUT);
        let page = self
            .client
            .get_text(request)
            .await
            .map_err(fetch_failure)?;

        tracing::debug!(
            "Fetched page {} (status {}, {} bytes)",
            canonical_url,
            page.status,
            page.body.len()
        );

        payload::parse_page(&page.body).ok_or_else(|| {
            tracing::warn!("No known payload shape in page {}", canonical_url);
            ResolveError::parse(UNRECOGNIZED_MESSAGE)
        })
    }

    fn name(&self) -> &'static str {
        "page_scraper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::ports::http::{FetchError, FetchedPage, MockHttpClient};

    const PAGE_URL: &str = "https://www.tiktok.com/@rainydancer/video/7300000000000000001";

    fn scraper_returning(
        result: Result<FetchedPage, FetchError>,
    ) -> PageScraper<MockHttpClient> {
        let mut client = MockHttpClient::new();
        client
            .expect_get_text()
            .withf(|request| {
                request.url == PAGE_URL
                    && request.timeout == PAGE_TIMEOUT
                    && request.header_value("User-Agent").is_some()
                    && request.header_value("Accept-Language").is_some()
            })
            .times(1)
            .return_once(move |_| result);
        PageScraper::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_scrape_sigi_state_page() {
        let scraper = scraper_returning(Ok(FetchedPage {
            status: 200,
            body: include_str!("../../tests/assets/sigi_state.html").to_string(),
        }));

        let metadata = scraper.fetch_metadata(PAGE_URL).await.unwrap();
        assert_eq!(
            metadata.hd(),
            Some("https://v16-webapp.tiktok.com/sigi/download.mp4")
        );
        assert_eq!(metadata.author.as_deref(), Some("rainydancer"));
    }

    #[tokio::test]
    async fn test_scrape_unrecognized_page() {
        let scraper = scraper_returning(Ok(FetchedPage {
            status: 200,
            body: include_str!("../../tests/assets/unrecognized.html").to_string(),
        }));

        let err = scraper.fetch_metadata(PAGE_URL).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert_eq!(err.message, "unrecognized data format");
    }

    #[tokio::test]
    async fn test_scrape_timeout() {
        let scraper = scraper_returning(Err(FetchError::Timeout));

        let err = scraper.fetch_metadata(PAGE_URL).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NetworkError);
        assert_eq!(err.message, "timeout");
    }

    #[tokio::test]
    async fn test_scrape_connection_failure() {
        let scraper = scraper_returning(Err(FetchError::Connect("connection refused".into())));

        let err = scraper.fetch_metadata(PAGE_URL).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NetworkError);
        assert!(err.message.contains("connection refused"));
    }
}
