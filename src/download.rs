use std::env;
use std::path::{Path, PathBuf};

use http::Method;
use http_body_util::BodyExt;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::RoutexResult;
use crate::client::{Transport, build_http_request, build_transport};
use crate::error::ApiError;
use crate::request::{BuiltRequest, build_request};
use crate::route::Route;
use crate::util::percent_encode_query;

const CACHE_SUBDIR: &str = "routex";

// Bodies stream straight to disk; completed files move into the cache
// directory under a fresh UUID name. Single attempt, never retried.
pub struct Downloader {
    transport: Transport,
    cache_dir: PathBuf,
}

impl Downloader {
    pub fn new() -> Self {
        Self::with_cache_dir(default_cache_dir())
    }

    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport: build_transport(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    // The string is percent-encoded before parsing; anything that still
    // fails to parse as an absolute http(s) URL never touches the network.
    pub async fn fetch_path(&self, path: &str) -> RoutexResult<PathBuf> {
        let encoded = percent_encode_query(path);
        let route = RawUrlRoute::parse(&encoded).ok_or_else(|| ApiError::InvalidUrl {
            url: path.to_owned(),
        })?;
        self.fetch(&route).await
    }

    pub async fn fetch<R>(&self, route: &R) -> RoutexResult<PathBuf>
    where
        R: Route + ?Sized,
    {
        let request = build_request(route)?;
        let span = info_span!("api_download", url = request.url());
        self.transfer(&request).instrument(span).await
    }

    async fn transfer(&self, request: &BuiltRequest) -> RoutexResult<PathBuf> {
        let http_request = build_http_request(request, request.headers())?;
        debug!("starting download");
        // The deadline covers the handshake; body streaming is unbounded.
        let response = match timeout(request.timeout(), self.transport.request(http_request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                debug!(error = %error, "download transport failure");
                return Err(ApiError::NoInternet);
            }
            Err(_) => {
                return Err(ApiError::RequestTimeout {
                    code: None,
                    message: None,
                });
            }
        };
        let status = response.status();
        debug!(status = status.as_u16(), "download response received");
        if !status.is_success() {
            return Err(ApiError::InvalidResponse);
        }
        let file = self.spool_to_temp(response.into_body()).await?;
        self.persist(file)
    }

    async fn spool_to_temp(&self, mut body: hyper::body::Incoming) -> RoutexResult<NamedTempFile> {
        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|error| file_error(&error, "create cache directory"))?;
        // Created inside the cache directory so the final move is a rename.
        let temp = NamedTempFile::new_in(&self.cache_dir)
            .map_err(|error| file_error(&error, "create temporary file"))?;
        let std_file = temp
            .reopen()
            .map_err(|error| file_error(&error, "reopen temporary file"))?;
        let mut file = tokio::fs::File::from_std(std_file);
        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(|error| {
                debug!(error = %error, "download stream failed");
                ApiError::InvalidResponse
            })?;
            if let Some(chunk) = frame.data_ref() {
                file.write_all(chunk)
                    .await
                    .map_err(|error| file_error(&error, "write downloaded bytes"))?;
            }
        }
        file.flush()
            .await
            .map_err(|error| file_error(&error, "flush downloaded bytes"))?;
        Ok(temp)
    }

    fn persist(&self, file: NamedTempFile) -> RoutexResult<PathBuf> {
        let destination = self.cache_dir.join(Uuid::new_v4().to_string());
        match file.persist(&destination) {
            Ok(_) => {
                debug!(path = %destination.display(), "download complete");
                Ok(destination)
            }
            Err(error) => Err(file_error(&error.error, "move download into cache")),
        }
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

// Plain GET descriptor for a caller-supplied URL, split into the host
// and path halves the request builder expects.
struct RawUrlRoute {
    base_host: String,
    path: String,
}

impl RawUrlRoute {
    fn parse(url: &str) -> Option<Self> {
        let uri: http::Uri = url.parse().ok()?;
        let scheme = uri.scheme_str()?;
        if scheme != "http" && scheme != "https" {
            return None;
        }
        let authority = uri.authority()?;
        let base_host = format!("{scheme}://{authority}");
        let path = uri
            .path_and_query()
            .map(|paq| paq.as_str().trim_start_matches('/').to_owned())
            .unwrap_or_default();
        Some(Self { base_host, path })
    }
}

impl Route for RawUrlRoute {
    fn base_host(&self) -> String {
        self.base_host.clone()
    }

    fn path(&self) -> String {
        self.path.clone()
    }

    fn method(&self) -> Method {
        Method::GET
    }
}

fn file_error(error: &std::io::Error, action: &str) -> ApiError {
    warn!(error = %error, action, "download file operation failed");
    ApiError::InvalidResponse
}

// Platform cache directory per OS convention, with the system temp
// directory as a last resort.
fn default_cache_dir() -> PathBuf {
    user_cache_root()
        .unwrap_or_else(env::temp_dir)
        .join(CACHE_SUBDIR)
}

#[cfg(target_os = "windows")]
fn user_cache_root() -> Option<PathBuf> {
    env::var_os("LOCALAPPDATA").map(PathBuf::from)
}

#[cfg(target_os = "macos")]
fn user_cache_root() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join("Library/Caches"))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn user_cache_root() -> Option<PathBuf> {
    env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|home| home.join(".cache")))
}
