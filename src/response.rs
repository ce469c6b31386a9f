use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::RoutexResult;
use crate::error::ApiError;
use crate::model::ErrorModel;
use crate::util::truncate_body;

#[derive(Clone, Debug)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    // A body that does not match T is a hard failure, never a silent
    // default.
    pub fn json<T: DeserializeOwned>(&self) -> RoutexResult<T> {
        serde_json::from_slice(&self.body).map_err(|error| {
            debug!(error = %error, body = %truncate_body(&self.body), "response body failed to decode");
            ApiError::InvalidResponse
        })
    }
}

// Statuses outside the dedicated mappings become OnServerError only
// when the body decodes as an error model, InvalidResponse otherwise.
pub(crate) fn classify<T: DeserializeOwned>(path: &str, response: &RawResponse) -> RoutexResult<T> {
    let status = response.status();
    debug!(
        path,
        status = status.as_u16(),
        body = %truncate_body(response.body()),
        "response received"
    );
    match status.as_u16() {
        200 => response.json(),
        408 => {
            let (code, message) = error_detail(response);
            Err(ApiError::RequestTimeout { code, message })
        }
        429 => {
            let (code, message) = error_detail(response);
            Err(ApiError::TooManyRequests { code, message })
        }
        500 => {
            let (code, message) = error_detail(response);
            Err(ApiError::InternalServerError { code, message })
        }
        503 => {
            let (code, message) = error_detail(response);
            Err(ApiError::ServiceUnavailable { code, message })
        }
        504 => {
            let (code, message) = error_detail(response);
            Err(ApiError::GatewayTimeout { code, message })
        }
        _ => Err(match decode_error_model(response) {
            Some(model) => ApiError::OnServerError { model },
            None => ApiError::InvalidResponse,
        }),
    }
}

fn decode_error_model(response: &RawResponse) -> Option<ErrorModel> {
    serde_json::from_slice(response.body()).ok()
}

fn error_detail(response: &RawResponse) -> (Option<String>, Option<String>) {
    match decode_error_model(response) {
        Some(model) => (model.code, model.message),
        None => (None, None),
    }
}
