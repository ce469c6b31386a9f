use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method, Uri};
use tracing::warn;

use crate::RoutexResult;
use crate::limits;
use crate::route::{BodySpec, EncoderKind, Parameters, Route};
use crate::util::target_url;

// Parameter encoders mutate this through headers_mut and set_body
// before it is handed to the wire.
#[derive(Clone, Debug)]
pub struct BuiltRequest {
    url: String,
    uri: Uri,
    method: Method,
    headers: HeaderMap,
    body: Option<Bytes>,
    timeout: Duration,
}

impl BuiltRequest {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: Bytes) {
        self.body = Some(body);
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

// Content-Type is forced to JSON after the route's own headers, and the
// body strategy runs last so encoders may adjust headers further.
pub fn build_request<R: Route + ?Sized>(route: &R) -> RoutexResult<BuiltRequest> {
    let (url, uri) = target_url(&route.base_host(), &route.path())?;
    let mut headers = route.headers();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut request = BuiltRequest {
        url,
        uri,
        method: route.method(),
        headers,
        body: None,
        timeout: limits::REQUEST_TIMEOUT,
    };

    match route.body() {
        BodySpec::Plain => {}
        BodySpec::Json(parameters) => {
            apply_encoder(&mut request, EncoderKind::Json, &parameters);
        }
        BodySpec::Params {
            parameters,
            encoding,
        } => {
            apply_encoder(&mut request, encoding, &parameters);
        }
    }

    Ok(request)
}

fn apply_encoder(request: &mut BuiltRequest, encoding: EncoderKind, parameters: &Parameters) {
    if let Err(error) = encoding.encoder().encode(request, parameters) {
        // Unencodable bodies are tolerated; the request proceeds without one.
        warn!(error = %error, url = request.url(), "failed to encode request body, sending without body");
    }
}
