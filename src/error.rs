use thiserror::Error;

use crate::model::ErrorModel;

const UNKNOWN_ERROR: &str = "UnknownError";

const NO_INTERNET_CONNECTION: &str = "NoInternetConnection";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("invalid request url: {url}")]
    InvalidUrl { url: String },

    #[error("failed to encode request parameters: {source}")]
    ParameterEncodingFailure {
        #[source]
        source: serde_json::Error,
    },

    #[error("no internet connection")]
    NoInternet,

    // A decodable error body on a status outside the dedicated mappings.
    #[error("server rejected the request ({model})")]
    OnServerError { model: ErrorModel },

    #[error("missing or unrecognized response")]
    InvalidResponse,

    // HTTP 408, or the local per-attempt deadline elapsed.
    #[error("request timed out ({})", server_detail(.code, .message))]
    RequestTimeout {
        code: Option<String>,
        message: Option<String>,
    },

    // HTTP 429.
    #[error("too many requests ({})", server_detail(.code, .message))]
    TooManyRequests {
        code: Option<String>,
        message: Option<String>,
    },

    // HTTP 500.
    #[error("internal server error ({})", server_detail(.code, .message))]
    InternalServerError {
        code: Option<String>,
        message: Option<String>,
    },

    // HTTP 503.
    #[error("service unavailable ({})", server_detail(.code, .message))]
    ServiceUnavailable {
        code: Option<String>,
        message: Option<String>,
    },

    // HTTP 504.
    #[error("gateway timeout ({})", server_detail(.code, .message))]
    GatewayTimeout {
        code: Option<String>,
        message: Option<String>,
    },
}

impl ApiError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::ParameterEncodingFailure { .. } => ErrorKind::ParameterEncodingFailure,
            Self::NoInternet => ErrorKind::NoInternet,
            Self::OnServerError { .. } => ErrorKind::OnServerError,
            Self::InvalidResponse => ErrorKind::InvalidResponse,
            Self::RequestTimeout { .. } => ErrorKind::RequestTimeout,
            Self::TooManyRequests { .. } => ErrorKind::TooManyRequests,
            Self::InternalServerError { .. } => ErrorKind::InternalServerError,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::GatewayTimeout { .. } => ErrorKind::GatewayTimeout,
        }
    }

    // Prefers the non-empty server message; connectivity failures map
    // to their own fixed marker.
    pub fn user_message(&self) -> &str {
        match self {
            Self::NoInternet => NO_INTERNET_CONNECTION,
            Self::OnServerError { model } => {
                non_empty(model.message.as_deref()).unwrap_or(UNKNOWN_ERROR)
            }
            Self::RequestTimeout { message, .. }
            | Self::TooManyRequests { message, .. }
            | Self::InternalServerError { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::GatewayTimeout { message, .. } => {
                non_empty(message.as_deref()).unwrap_or(UNKNOWN_ERROR)
            }
            _ => UNKNOWN_ERROR,
        }
    }

    // Transient kinds filter empty codes; OnServerError reports the
    // model's code verbatim.
    pub fn server_code(&self) -> Option<&str> {
        match self {
            Self::OnServerError { model } => model.code.as_deref(),
            Self::RequestTimeout { code, .. }
            | Self::TooManyRequests { code, .. }
            | Self::InternalServerError { code, .. }
            | Self::ServiceUnavailable { code, .. }
            | Self::GatewayTimeout { code, .. } => non_empty(code.as_deref()),
            _ => None,
        }
    }
}

// Equality is kind-only: two errors of the same variant compare equal
// regardless of payload.
impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl Eq for ApiError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    InvalidUrl,
    ParameterEncodingFailure,
    NoInternet,
    OnServerError,
    InvalidResponse,
    RequestTimeout,
    TooManyRequests,
    InternalServerError,
    ServiceUnavailable,
    GatewayTimeout,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::ParameterEncodingFailure => "parameter_encoding_failure",
            Self::NoInternet => "no_internet",
            Self::OnServerError => "on_server_error",
            Self::InvalidResponse => "invalid_response",
            Self::RequestTimeout => "request_timeout",
            Self::TooManyRequests => "too_many_requests",
            Self::InternalServerError => "internal_server_error",
            Self::ServiceUnavailable => "service_unavailable",
            Self::GatewayTimeout => "gateway_timeout",
        }
    }

    #[cfg(test)]
    pub(crate) const fn all() -> [ErrorKind; 10] {
        [
            Self::InvalidUrl,
            Self::ParameterEncodingFailure,
            Self::NoInternet,
            Self::OnServerError,
            Self::InvalidResponse,
            Self::RequestTimeout,
            Self::TooManyRequests,
            Self::InternalServerError,
            Self::ServiceUnavailable,
            Self::GatewayTimeout,
        ]
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn server_detail(code: &Option<String>, message: &Option<String>) -> String {
    match (code.as_deref(), message.as_deref()) {
        (Some(code), Some(message)) => format!("code {code}: {message}"),
        (Some(code), None) => format!("code {code}"),
        (None, Some(message)) => message.to_owned(),
        (None, None) => "no server detail".to_owned(),
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|value| !value.is_empty())
}
