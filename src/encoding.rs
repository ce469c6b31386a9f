use bytes::Bytes;
use http::HeaderValue;
use http::header::CONTENT_TYPE;

use crate::RoutexResult;
use crate::error::ApiError;
use crate::request::BuiltRequest;
use crate::route::Parameters;

// Encoders may set a body, adjust headers, or both.
pub trait ParameterEncoder: Send + Sync {
    fn encode(&self, request: &mut BuiltRequest, parameters: &Parameters) -> RoutexResult<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonEncoding;

impl ParameterEncoder for JsonEncoding {
    fn encode(&self, request: &mut BuiltRequest, parameters: &Parameters) -> RoutexResult<()> {
        let body = serde_json::to_vec(parameters)
            .map_err(|source| ApiError::ParameterEncodingFailure { source })?;
        // Content-Type only when absent, so route-level overrides survive.
        if !request.headers().contains_key(CONTENT_TYPE) {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        request.set_body(Bytes::from(body));
        Ok(())
    }
}
