use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderName, HeaderValue, Request};
use http_body_util::{BodyExt, Full};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use tokio::time::timeout;
use tracing::{Instrument, debug, info_span, warn};

use crate::RoutexResult;
use crate::auth::{NoSession, TokenProvider};
use crate::error::ApiError;
use crate::request::{BuiltRequest, build_request};
use crate::response::{RawResponse, classify};
use crate::retry::RetryPolicy;
use crate::route::Route;
use crate::util::merge_headers;

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

pub(crate) type Transport = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

pub(crate) fn build_transport() -> Transport {
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .build(HttpsConnector::new())
}

#[derive(Clone)]
pub struct ApiClientBuilder {
    default_headers: HeaderMap,
    retry_policy: RetryPolicy,
    token_provider: Arc<dyn TokenProvider>,
}

impl ApiClientBuilder {
    fn new() -> Self {
        Self {
            default_headers: HeaderMap::new(),
            retry_policy: RetryPolicy::standard(),
            token_provider: Arc::new(NoSession),
        }
    }

    // Attached to every request unless the route overrides it.
    pub fn default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    pub fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn token_provider(mut self, token_provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = token_provider;
        self
    }

    // HttpsConnector::new panics when the system TLS context cannot be
    // initialized.
    pub fn build(self) -> ApiClient {
        ApiClient {
            transport: build_transport(),
            default_headers: self.default_headers,
            retry_policy: self.retry_policy,
            token_provider: self.token_provider,
        }
    }
}

// Cloning is cheap; the connection pool is shared between clones.
#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
    default_headers: HeaderMap,
    retry_policy: RetryPolicy,
    token_provider: Arc<dyn TokenProvider>,
}

impl ApiClient {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    // Each attempt runs the full pipeline: token lookup, request build,
    // send under the fixed deadline, then status mapping. The last
    // attempt's error is surfaced.
    pub async fn request<T, R>(&self, route: &R) -> RoutexResult<T>
    where
        T: DeserializeOwned,
        R: Route + ?Sized,
    {
        let max_attempts = self.retry_policy.max_attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let span = info_span!(
                "api_request",
                method = %route.method(),
                path = %route.path(),
                attempt,
                max_attempts
            );
            match self.execute_once(route).instrument(span).await {
                Ok(value) => return Ok(value),
                Err(error) if self.retry_policy.should_retry(attempt, &error) => {
                    warn!(error = %error, attempt, max_attempts, "request failed, retrying");
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn execute_once<T, R>(&self, route: &R) -> RoutexResult<T>
    where
        T: DeserializeOwned,
        R: Route + ?Sized,
    {
        let token = self.token_provider.token().await?;
        let mut request = build_request(route)?;
        if let Some(token) = token {
            attach_bearer(request.headers_mut(), &token);
        }
        let response = self.send(&request).await?;
        classify(&route.path(), &response)
    }

    async fn send(&self, request: &BuiltRequest) -> RoutexResult<RawResponse> {
        let headers = merge_headers(&self.default_headers, request.headers());
        let http_request = build_http_request(request, &headers)?;
        debug!(url = request.url(), "sending request");
        match timeout(request.timeout(), self.round_trip(http_request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ApiError::RequestTimeout {
                code: None,
                message: None,
            }),
        }
    }

    async fn round_trip(&self, request: Request<Full<Bytes>>) -> RoutexResult<RawResponse> {
        let response = self.transport.request(request).await.map_err(|error| {
            debug!(error = %error, "transport failure");
            ApiError::NoInternet
        })?;
        let (parts, body) = response.into_parts();
        let body = read_body(body).await?;
        Ok(RawResponse::new(parts.status, parts.headers, body))
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("default_headers", &self.default_headers)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

pub(crate) fn build_http_request(
    request: &BuiltRequest,
    headers: &HeaderMap,
) -> RoutexResult<Request<Full<Bytes>>> {
    let mut builder = Request::builder()
        .method(request.method().clone())
        .uri(request.uri().clone());
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    let body = request.body().cloned().unwrap_or_else(Bytes::new);
    builder.body(Full::new(body)).map_err(|_| ApiError::InvalidUrl {
        url: request.url().to_owned(),
    })
}

fn attach_bearer(headers: &mut HeaderMap, token: &str) {
    match HeaderValue::try_from(format!("Bearer {token}")) {
        Ok(value) => {
            headers.insert(AUTHORIZATION, value);
        }
        Err(error) => {
            warn!(error = %error, "session token is not a valid header value, sending unauthenticated");
        }
    }
}

async fn read_body(body: hyper::body::Incoming) -> RoutexResult<Bytes> {
    match body.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(error) => {
            debug!(error = %error, "failed to read response body");
            Err(ApiError::InvalidResponse)
        }
    }
}
