use http::{HeaderMap, Method};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::encoding::{JsonEncoding, ParameterEncoder};

pub type Parameters = Map<String, Value>;

// Implemented on caller-defined sum types with one variant per
// endpoint. Descriptors never touch the network.
pub trait Route {
    fn base_host(&self) -> String;

    // Empty path means the host URL alone.
    fn path(&self) -> String;

    fn method(&self) -> Method;

    // The builder forces Content-Type to JSON after these are applied.
    fn headers(&self) -> HeaderMap {
        HeaderMap::new()
    }

    fn body(&self) -> BodySpec {
        BodySpec::Plain
    }
}

#[derive(Clone, Debug)]
pub enum BodySpec {
    Plain,
    Json(Parameters),
    Params {
        parameters: Parameters,
        encoding: EncoderKind,
    },
}

impl BodySpec {
    // A payload that fails to serialize into a JSON object is logged
    // and the request goes out without a body.
    pub fn json<T: Serialize + ?Sized>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(Value::Object(parameters)) => Self::Json(parameters),
            Ok(_) => {
                warn!("payload did not serialize to a JSON object, sending request without body");
                Self::Plain
            }
            Err(error) => {
                warn!(error = %error, "failed to serialize request payload, sending request without body");
                Self::Plain
            }
        }
    }

    pub fn params(parameters: Parameters) -> Self {
        Self::Params {
            parameters,
            encoding: EncoderKind::Json,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncoderKind {
    #[default]
    Json,
}

impl EncoderKind {
    pub(crate) fn encoder(self) -> &'static dyn ParameterEncoder {
        match self {
            Self::Json => &JsonEncoding,
        }
    }
}
