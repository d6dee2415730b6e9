//! Source token sharing between concurrent function updates
//!
//! The first update in a region runs a full build. Its operation metadata
//! eventually carries a `sourceToken`; later updates in the same region
//! wait for that token and pass it along so the backend reuses the build.
//!
//! ```text
//! NONE --get_token--> FETCHING --poller(token or done)--> VALID
//!                                                           |
//!              FETCHING <------get_token (expired)----------+
//! ```

use crate::error::{DeployError, Result};
use fbctl_api::Operation;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

/// How long a scraped token stays usable
pub const DEFAULT_TOKEN_VALID_DURATION: Duration = Duration::from_millis(1_500_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    None,
    Fetching,
    Valid,
}

type Resolution = Option<Option<String>>;

#[derive(Debug)]
struct Inner {
    state: FetchState,
    token: Option<String>,
    expiry: Option<Instant>,
    tx: watch::Sender<Resolution>,
}

#[derive(Debug)]
pub struct SourceTokenScraper {
    valid_duration: Duration,
    inner: Mutex<Inner>,
}

impl Default for SourceTokenScraper {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_VALID_DURATION)
    }
}

impl SourceTokenScraper {
    pub fn new(valid_duration: Duration) -> Self {
        Self {
            valid_duration,
            inner: Mutex::new(Inner {
                state: FetchState::None,
                token: None,
                expiry: None,
                tx: watch::channel(None).0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> FetchState {
        self.lock().state
    }

    /// Token to send with the next update
    ///
    /// `None` means the caller must build from scratch; its operation is
    /// then expected to feed [`Self::poller`].
    pub async fn get_token(&self) -> Result<Option<String>> {
        let mut rx = {
            let mut inner = self.lock();
            match inner.state {
                FetchState::None => {
                    inner.state = FetchState::Fetching;
                    return Ok(None);
                }
                FetchState::Fetching => inner.tx.subscribe(),
                FetchState::Valid => {
                    if Self::expired(&inner)? {
                        inner.state = FetchState::Fetching;
                        inner.token = None;
                        inner.tx = watch::channel(None).0;
                        return Ok(None);
                    }
                    return Ok(inner.token.clone());
                }
            }
        };

        let token = match rx.wait_for(Option::is_some).await {
            Ok(resolved) => resolved.clone().flatten(),
            Err(_) => None,
        };
        Ok(token)
    }

    /// Whether the resolved token is past its validity window
    pub fn is_token_expired(&self) -> Result<bool> {
        Self::expired(&self.lock())
    }

    fn expired(inner: &Inner) -> Result<bool> {
        match inner.expiry {
            Some(expiry) => Ok(Instant::now() >= expiry),
            None => Err(DeployError::TokenNotPolled),
        }
    }

    /// Observer for operation polling
    ///
    /// Resolves waiters once the operation reports a source token or
    /// finishes, whichever comes first. Only the first such operation of a
    /// fetch sets the token; later ones only extend its validity.
    pub fn poller(&self) -> impl FnMut(&Operation) + '_ {
        move |op: &Operation| {
            let token = op
                .metadata
                .as_ref()
                .and_then(|m| m.get("sourceToken"))
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty());
            if token.is_none() && !op.done {
                return;
            }

            let region = op
                .metadata
                .as_ref()
                .and_then(|m| m.get("target"))
                .and_then(Value::as_str)
                .and_then(|t| t.split('/').nth(3))
                .unwrap_or_default();
            debug!("Got source token {:?} for region {}", token, region);

            let mut inner = self.lock();
            if inner.state == FetchState::Fetching {
                inner.token = token.map(str::to_string);
                inner.tx.send_replace(Some(inner.token.clone()));
            }
            inner.state = FetchState::Valid;
            inner.expiry = Some(Instant::now() + self.valid_duration);
        }
    }

    /// Give up on a fetch that failed before its operation was polled
    ///
    /// Current waiters proceed without a token and the next caller fetches.
    pub fn abandon(&self) {
        let mut inner = self.lock();
        if inner.state != FetchState::Fetching {
            return;
        }
        inner.tx.send_replace(Some(None));
        inner.tx = watch::channel(None).0;
        inner.state = FetchState::None;
    }
}
