//! Outbound HTTP adapter backed by `reqwest`.

use crate::ports::http::{
    ByteStream, FetchError, FetchRequest, FetchedPage, HttpClient, MediaResponse,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, Stream, StreamExt, TryStreamExt};
use reqwest::{redirect, Client, Method, RequestBuilder};
use std::time::Duration;

const MAX_REDIRECTS: usize = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One pooled client shared by every request.
///
/// For buffered requests the `FetchRequest` timeout is a deadline on the whole
/// exchange. For streams it bounds the wait for the response head and then
/// every gap between body chunks, so a long transfer that keeps moving is
/// never cut off.
#[derive(Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    fn request(&self, method: Method, request: &FetchRequest) -> RequestBuilder {
        request.headers.iter().fold(
            self.client.request(method, &request.url),
            |builder, (name, value)| builder.header(name.as_str(), value.as_str()),
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            FetchError::Body(err.to_string())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn resolve_redirects(&self, request: FetchRequest) -> Result<String, FetchError> {
        let response = self
            .request(Method::HEAD, &request)
            .timeout(request.timeout)
            .send()
            .await?;
        Ok(response.url().to_string())
    }

    async fn get_text(&self, request: FetchRequest) -> Result<FetchedPage, FetchError> {
        let response = self
            .request(Method::GET, &request)
            .timeout(request.timeout)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchedPage { status, body })
    }

    async fn get_stream(&self, request: FetchRequest) -> Result<MediaResponse, FetchError> {
        let send = self.request(Method::GET, &request).send();
        let response = tokio::time::timeout(request.timeout, send)
            .await
            .map_err(|_| FetchError::Timeout)??;

        Ok(MediaResponse {
            status: response.status().as_u16(),
            content_length: response.content_length(),
            body: idle_timeout(
                response.bytes_stream().map_err(FetchError::from),
                request.timeout,
            ),
        })
    }
}

/// Ends the stream with `FetchError::Timeout` once no chunk has arrived for
/// `idle`.
fn idle_timeout<S>(body: S, idle: Duration) -> ByteStream
where
    S: Stream<Item = Result<Bytes, FetchError>> + Send + 'static,
{
    stream::unfold(Some(Box::pin(body)), move |state| async move {
        let mut body = state?;
        match tokio::time::timeout(idle, body.next()).await {
            Ok(Some(item)) => Some((item, Some(body))),
            Ok(None) => None,
            Err(_) => {
                tracing::warn!("Upstream body idle for {:?}, giving up", idle);
                Some((Err(FetchError::Timeout), None))
            }
        }
    })
    .boxed()
}
