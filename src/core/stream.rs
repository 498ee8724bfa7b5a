//! Inbound byte streams for progress-dl
//!
//! An HTTP stream is a sequence of [`StreamEvent`]s: response metadata once,
//! body chunks, then either `End` or `Error`.

use std::time::Duration;

use bytes::Bytes;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use log::debug;
use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use reqwest::{Client, ClientBuilder, StatusCode};

use crate::core::error::Error;

/// Global HTTP client shared by every default stream factory
static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(format!("progress-dl/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});

/// Response metadata delivered before any body bytes
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseMeta {
    pub fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    /// Metadata carrying only a `content-length` header
    pub fn with_content_length(length: u64) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, length.into());
        Self::new(StatusCode::OK, headers)
    }

    /// Parsed `content-length` header
    ///
    /// Returns `None` when the header is absent or not a decimal integer.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)?
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
    }
}

/// One signal from an inbound stream
#[derive(Debug)]
pub enum StreamEvent {
    /// Response metadata (status and headers)
    Meta(ResponseMeta),
    /// A chunk of body bytes
    Data(Bytes),
    /// All bytes received
    End,
    /// Transport failure; nothing follows it
    Error(Error),
}

/// Event stream produced by an [`HttpStreamFactory`]
pub type EventStream = BoxStream<'static, StreamEvent>;

/// Capability to open an inbound byte stream for a URL
pub trait HttpStreamFactory: Send + Sync {
    fn create_http_stream(&self, url: &str) -> EventStream;
}

/// Default stream factory backed by reqwest
#[derive(Clone)]
pub struct ReqwestStreamFactory {
    client: Client,
}

impl Default for ReqwestStreamFactory {
    fn default() -> Self {
        Self::with_client(GLOBAL_CLIENT.clone())
    }
}

impl ReqwestStreamFactory {
    /// Use a caller-configured client instead of the shared one
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpStreamFactory for ReqwestStreamFactory {
    fn create_http_stream(&self, url: &str) -> EventStream {
        let client = self.client.clone();
        let url = url.to_string();

        let response = async move {
            debug!("GET {url}");
            match client.get(&url).send().await.and_then(|r| r.error_for_status()) {
                Ok(response) => response_events(response),
                Err(e) => stream::once(future::ready(StreamEvent::Error(e.into()))).boxed(),
            }
        };

        stream::once(response).flatten().boxed()
    }
}

/// Turns a successful response into `Meta`, `Data`..., then `End` or `Error`
fn response_events(response: reqwest::Response) -> EventStream {
    let meta = StreamEvent::Meta(ResponseMeta::new(
        response.status(),
        response.headers().clone(),
    ));

    let body = response.bytes_stream().map(|chunk| match chunk {
        Ok(bytes) => StreamEvent::Data(bytes),
        Err(e) => StreamEvent::Error(e.into()),
    });

    // Stop after the first error so no `End` follows it
    let mut failed = false;
    let body = body
        .chain(stream::once(future::ready(StreamEvent::End)))
        .take_while(move |event| {
            let keep = !failed;
            failed |= matches!(event, StreamEvent::Error(_));
            future::ready(keep)
        });

    stream::once(future::ready(meta)).chain(body).boxed()
}
