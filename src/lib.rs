//! Typed HTTP API pipeline: route descriptors in, decoded models out.
//!
//! routex turns an enumerable description of an API surface into wire
//! traffic. Callers define their endpoints as a sum type implementing
//! [`Route`]; the client builds the request (JSON content type, fixed
//! deadline, encoded body), sends it, maps the status line onto a fixed
//! error taxonomy and decodes the success body into a typed model.
//! Failed attempts are retried back to back until the budget of the
//! configured [`RetryPolicy`] runs out. A separate [`Downloader`]
//! streams files into the platform cache directory under fresh UUID
//! names.
//!
//! # Quick Start
//!
//! ```no_run
//! use http::Method;
//! use routex::{ApiClient, Route};
//! use serde::Deserialize;
//!
//! enum Api {
//!     Profile { id: u64 },
//! }
//!
//! impl Route for Api {
//!     fn base_host(&self) -> String {
//!         "https://api.example.com".to_owned()
//!     }
//!
//!     fn path(&self) -> String {
//!         match self {
//!             Self::Profile { id } => format!("/users/{id}"),
//!         }
//!     }
//!
//!     fn method(&self) -> Method {
//!         Method::GET
//!     }
//! }
//!
//! #[derive(Deserialize)]
//! struct Profile {
//!     name: String,
//! }
//!
//! # async fn run() -> routex::RoutexResult<()> {
//! let client = ApiClient::new();
//! let profile: Profile = client.request(&Api::Profile { id: 7 }).await?;
//! println!("{}", profile.name);
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod datetime;
mod download;
mod encoding;
mod error;
pub mod limits;
mod model;
mod request;
mod response;
mod retry;
mod route;
mod util;

pub use crate::auth::{NoSession, TokenFuture, TokenProvider};
pub use crate::client::{ApiClient, ApiClientBuilder};
pub use crate::datetime::{
    DATE_TIME_SERVER_FULL, ServerDateTime, parse_server_date_time, server_date_format,
};
pub use crate::download::Downloader;
pub use crate::encoding::{JsonEncoding, ParameterEncoder};
pub use crate::error::{ApiError, ErrorKind};
pub use crate::model::{ErrorCode, ErrorModel};
pub use crate::request::{BuiltRequest, build_request};
pub use crate::response::RawResponse;
pub use crate::retry::RetryPolicy;
pub use crate::route::{BodySpec, EncoderKind, Parameters, Route};

/// Convenient result alias used throughout the crate.
pub type RoutexResult<T> = std::result::Result<T, ApiError>;

/// One-stop imports for typical usage.
pub mod prelude {
    pub use crate::RoutexResult;
    pub use crate::auth::{NoSession, TokenProvider};
    pub use crate::client::{ApiClient, ApiClientBuilder};
    pub use crate::datetime::ServerDateTime;
    pub use crate::download::Downloader;
    pub use crate::error::{ApiError, ErrorKind};
    pub use crate::model::{ErrorCode, ErrorModel};
    pub use crate::retry::RetryPolicy;
    pub use crate::route::{BodySpec, EncoderKind, Parameters, Route};
}
