use std::time::Duration;

// Per-attempt deadline for requests and download handshakes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub const RETRY_TIMES: usize = 2;
