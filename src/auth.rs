use std::future::Future;
use std::pin::Pin;

use crate::RoutexResult;

pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = RoutexResult<Option<String>>> + Send + 'a>>;

// Queried once per attempt, before the request is built, so a token
// refreshed between retries is picked up by the next attempt.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> TokenFuture<'_>;
}

// Anonymous sessions: never yields a token and never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSession;

impl TokenProvider for NoSession {
    fn token(&self) -> TokenFuture<'_> {
        Box::pin(async { Ok(None) })
    }
}
