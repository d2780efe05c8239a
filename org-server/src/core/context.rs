//! Request-scoped cancellation and deadline

use std::future::Future;
use std::time::Duration;

use shared::error::{AppError, AppResult, ErrorCode};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation signal and deadline carried by one request.
///
/// Service operations run through [`RequestContext::run`]. When the token is
/// cancelled or the deadline passes, the operation future is dropped, which
/// rolls back any transaction it holds.
#[derive(Debug, Clone)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context with its own token and a deadline `timeout` from now
    pub fn new(timeout: Duration) -> Self {
        Self::with_token(CancellationToken::new(), Some(timeout))
    }

    /// Context with no deadline that is never cancelled
    pub fn background() -> Self {
        Self::with_token(CancellationToken::new(), None)
    }

    /// Context tied to `token`; cancelling it (or a parent) cancels the request
    pub fn with_token(cancel: CancellationToken, timeout: Option<Duration>) -> Self {
        Self {
            cancel,
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail if the request is cancelled or past its deadline.
    ///
    /// Writes call this right before commit; once the commit starts it is
    /// allowed to finish so the store and the cache never disagree.
    pub fn check(&self) -> AppResult<()> {
        if self.cancel.is_cancelled() {
            return Err(AppError::new(ErrorCode::RequestCancelled));
        }
        if self.deadline.is_some_and(|at| Instant::now() >= at) {
            tracing::warn!("Request deadline exceeded before commit");
            return Err(AppError::new(ErrorCode::RequestTimeout));
        }
        Ok(())
    }

    /// Drive `fut` until it finishes, the token fires or the deadline passes
    pub async fn run<T, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(AppError::new(ErrorCode::RequestCancelled));
        }
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!("Request cancelled");
                Err(AppError::new(ErrorCode::RequestCancelled))
            }
            _ = deadline => {
                tracing::warn!("Request deadline exceeded");
                Err(AppError::new(ErrorCode::RequestTimeout))
            }
            result = fut => result,
        }
    }
}
