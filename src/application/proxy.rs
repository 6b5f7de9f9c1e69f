use crate::domain::filename::{attachment_disposition, sanitize_filename};
use crate::ports::http::{ByteStream, FetchError, FetchRequest, HttpClient};
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::io::{ReaderStream, StreamReader};
use url::{Host, Url};

pub const STREAM_TIMEOUT: Duration = Duration::from_secs(120);
pub const CHUNK_SIZE: usize = 64 * 1024;
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";
pub const MEDIA_REFERER: &str = "https://www.tiktok.com/";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid media URL: {0}")]
    InvalidUrl(String),
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),
    #[error("upstream fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// An opened upstream media body, ready to be relayed.
pub struct MediaDownload {
    /// Sanitized base name, without extension
    pub filename: String,
    pub content_length: Option<u64>,
    pub body: BoxStream<'static, io::Result<Bytes>>,
}

impl MediaDownload {
    pub fn content_disposition(&self) -> String {
        attachment_disposition(&self.filename)
    }
}

pub struct MediaProxy<C> {
    client: Arc<C>,
}

impl<C> MediaProxy<C>
where
    C: HttpClient,
{
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Opens the upstream media. Nothing is read from the body until the
    /// returned stream is polled.
    pub async fn open(
        &self,
        media_url: &str,
        filename_hint: Option<&str>,
    ) -> Result<MediaDownload, ProxyError> {
        let parsed = Url::parse(media_url).map_err(|_| ProxyError::InvalidUrl(media_url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProxyError::InvalidUrl(media_url.to_string()));
        }
        if is_internal_host(&parsed) {
            tracing::warn!("Refusing to relay internal address {}", media_url);
            return Err(ProxyError::InvalidUrl(media_url.to_string()));
        }

        let request =
            FetchRequest::browser(media_url, STREAM_TIMEOUT).header("Referer", MEDIA_REFERER);
        let response = self.client.get_stream(request).await?;

        if !(200..300).contains(&response.status) {
            tracing::warn!("Media upstream answered {} for {}", response.status, media_url);
            return Err(ProxyError::UpstreamStatus(response.status));
        }

        let filename = sanitize_filename(filename_hint.unwrap_or_default());
        tracing::info!(
            "Relaying {} as {}.mp4 ({} bytes)",
            media_url,
            filename,
            response
                .content_length
                .map_or_else(|| "unknown".to_string(), |l| l.to_string())
        );

        Ok(MediaDownload {
            filename,
            content_length: response.content_length,
            body: rechunk(response.body),
        })
    }
}

/// Loopback, private, link-local and unspecified addresses, plus `localhost`.
/// Only literal hosts are checked; names are not resolved here.
pub fn is_internal_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Some(Host::Ipv4(ip)) => is_internal_ipv4(ip),
        Some(Host::Ipv6(ip)) => is_internal_ipv6(ip),
        None => true,
    }
}

fn is_internal_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
}

fn is_internal_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_internal_ipv4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local, fe80::/10 link local
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
}

/// Re-slices an upstream body into chunks of at most `CHUNK_SIZE` bytes.
/// Upstream is only read when the returned stream is polled.
pub fn rechunk(body: ByteStream) -> BoxStream<'static, io::Result<Bytes>> {
    let body_with_io_error = body.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let reader = StreamReader::new(body_with_io_error);
    ReaderStream::with_capacity(reader, CHUNK_SIZE).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::http::{MediaResponse, MockHttpClient};
    use futures::stream;

    const MEDIA_URL: &str = "https://v16-webapp.tiktok.com/video/tos/abc.mp4";

    fn payload_byte(chunk_index: usize, offset: usize) -> u8 {
        ((chunk_index * 31 + offset * 7) % 251) as u8
    }

    /// Deterministic payload generated lazily, one upstream chunk at a time.
    fn payload_chunk(index: usize, size: usize) -> Bytes {
        Bytes::from(
            (0..size)
                .map(|i| payload_byte(index, i))
                .collect::<Vec<u8>>(),
        )
    }

    fn lazy_upstream(chunks: usize, chunk_size: usize) -> ByteStream {
        stream::iter(0..chunks)
            .map(move |i| Ok(payload_chunk(i, chunk_size)))
            .boxed()
    }

    fn proxy_with(status: u16, body: ByteStream) -> MediaProxy<MockHttpClient> {
        let mut client = MockHttpClient::new();
        client
            .expect_get_stream()
            .withf(|request| {
                request.url == MEDIA_URL
                    && request.timeout == STREAM_TIMEOUT
                    && request.header_value("Referer") == Some(MEDIA_REFERER)
            })
            .times(1)
            .return_once(move |_| {
                Ok(MediaResponse {
                    status,
                    content_length: Some(1234),
                    body,
                })
            });
        MediaProxy::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_rechunk_is_byte_identical_and_bounded() {
        let upstream_chunks = 160;
        let upstream_chunk_size = 100_003;

        let mut relayed = rechunk(lazy_upstream(upstream_chunks, upstream_chunk_size));
        let mut offset = 0usize;
        let mut max_chunk = 0usize;

        while let Some(chunk) = relayed.next().await {
            let chunk = chunk.unwrap();
            assert!(chunk.len() <= CHUNK_SIZE);
            max_chunk = max_chunk.max(chunk.len());

            // compare against the source without materialising it
            for (i, byte) in chunk.iter().enumerate() {
                let pos = offset + i;
                let expected = payload_byte(pos / upstream_chunk_size, pos % upstream_chunk_size);
                assert_eq!(*byte, expected, "mismatch at byte {}", pos);
            }
            offset += chunk.len();
        }

        assert_eq!(offset, upstream_chunks * upstream_chunk_size);
        assert_eq!(max_chunk, CHUNK_SIZE);
    }

    #[tokio::test]
    async fn test_rechunk_small_payload() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"hello ")),
            Ok(Bytes::from_static(b"world")),
        ])
        .boxed();

        let chunks: Vec<Bytes> = rechunk(body).try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"hello world");
    }

    #[tokio::test]
    async fn test_rechunk_propagates_mid_stream_error() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(FetchError::Body("connection reset".to_string())),
        ])
        .boxed();

        let mut relayed = rechunk(body);
        assert_eq!(relayed.next().await.unwrap().unwrap(), "partial");
        let err = relayed.next().await.unwrap().unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_open_sanitizes_filename() {
        let proxy = proxy_with(200, lazy_upstream(1, 16));

        let download = proxy.open(MEDIA_URL, Some("my video!! 😀")).await.unwrap();
        assert_eq!(download.filename, "my_video____");
        assert_eq!(
            download.content_disposition(),
            "attachment; filename=\"my_video____.mp4\""
        );
        assert_eq!(download.content_length, Some(1234));
    }

    #[tokio::test]
    async fn test_open_without_filename_uses_default() {
        let proxy = proxy_with(200, lazy_upstream(1, 16));

        let download = proxy.open(MEDIA_URL, None).await.unwrap();
        assert_eq!(download.filename, "tiktok_video");
    }

    #[tokio::test]
    async fn test_open_rejects_upstream_error_status() {
        let proxy = proxy_with(403, lazy_upstream(0, 0));

        let err = proxy.open(MEDIA_URL, None).await.err().unwrap();
        assert!(matches!(err, ProxyError::UpstreamStatus(403)));
    }

    #[tokio::test]
    async fn test_open_rejects_non_http_urls() {
        let mut client = MockHttpClient::new();
        client.expect_get_stream().never();
        let proxy = MediaProxy::new(Arc::new(client));

        let err = proxy.open("file:///etc/passwd", None).await.err().unwrap();
        assert!(matches!(err, ProxyError::InvalidUrl(_)));
        let err = proxy.open("not a url", None).await.err().unwrap();
        assert!(matches!(err, ProxyError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_open_rejects_internal_addresses() {
        let mut client = MockHttpClient::new();
        client.expect_get_stream().never();
        let proxy = MediaProxy::new(Arc::new(client));

        for url in [
            "http://127.0.0.1:8000/health",
            "http://localhost/admin",
            "http://10.0.0.5/video.mp4",
            "http://192.168.1.1/",
            "http://169.254.169.254/latest/meta-data/",
            "http://[::1]/",
            "http://[::ffff:127.0.0.1]/",
            "http://[fd00::1]/",
            "http://0.0.0.0/",
        ] {
            let err = proxy.open(url, None).await.err().unwrap();
            assert!(matches!(err, ProxyError::InvalidUrl(_)), "{} was not refused", url);
        }
    }

    #[test]
    fn test_is_internal_host_allows_public_hosts() {
        for url in [
            MEDIA_URL,
            "https://www.tikwm.com/video/media/play/1.mp4",
            "http://93.184.216.34/clip.mp4",
            "http://[2606:4700::1111]/clip.mp4",
        ] {
            assert!(!is_internal_host(&Url::parse(url).unwrap()), "{}", url);
        }
    }

    #[tokio::test]
    async fn test_open_maps_fetch_failure() {
        let mut client = MockHttpClient::new();
        client
            .expect_get_stream()
            .times(1)
            .returning(|_| Err(FetchError::Timeout));
        let proxy = MediaProxy::new(Arc::new(client));

        let err = proxy.open(MEDIA_URL, None).await.err().unwrap();
        assert!(matches!(err, ProxyError::Fetch(FetchError::Timeout)));
    }
}
