use serde::{Deserialize, Serialize};

// Backends omit both fields freely; an empty object decodes with both
// None. Unknown code strings stay available verbatim.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorModel {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ErrorModel {
    pub fn should_log_out(&self, status: Option<u16>) -> bool {
        self.has_code(ErrorCode::AccountDeleted)
            || self.has_code(ErrorCode::AccountInvalid)
            || self.has_code(ErrorCode::AccountLocked)
            || self.has_code(ErrorCode::AccountDataNotFound)
            || Self::token_expired(status)
    }

    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.code.as_deref() == Some(code.as_str())
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code.as_deref().and_then(ErrorCode::parse)
    }

    // An HTTP 401 means the session token expired.
    pub const fn token_expired(status: Option<u16>) -> bool {
        matches!(status, Some(401))
    }
}

impl std::fmt::Display for ErrorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code.as_deref(), self.message.as_deref()) {
            (Some(code), Some(message)) => write!(f, "code {code}: {message}"),
            (Some(code), None) => write!(f, "code {code}"),
            (None, Some(message)) => f.write_str(message),
            (None, None) => f.write_str("no server detail"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    AccountLocked,
    AccountDeleted,
    AccountInvalid,
    AccountDataNotFound,
    // Sent by some endpoints inside otherwise successful payloads.
    Success,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccountLocked => "accountLocked",
            Self::AccountDeleted => "accountDeleted",
            Self::AccountInvalid => "accountInvalid",
            Self::AccountDataNotFound => "accountDataNotFound",
            Self::Success => "200",
        }
    }

    // Unknown wire values parse to None; the raw string survives on the
    // model for display.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "accountLocked" => Some(Self::AccountLocked),
            "accountDeleted" => Some(Self::AccountDeleted),
            "accountInvalid" => Some(Self::AccountInvalid),
            "accountDataNotFound" => Some(Self::AccountDataNotFound),
            "200" => Some(Self::Success),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
