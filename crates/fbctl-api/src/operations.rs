//! Long-running operation polling

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// A Google long-running operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Backoff and timeout settings for [`poll_operation`]
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    pub master_timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 1.5,
            master_timeout: Duration::from_secs(540),
        }
    }
}

impl PollOptions {
    pub fn with_master_timeout(mut self, timeout: Duration) -> Self {
        self.master_timeout = timeout;
        self
    }
}

/// Poll `GET /{name}` until the operation is done
///
/// `on_poll` sees every fetched operation, including the final one.
/// Returns the operation's `response` on success.
pub async fn poll_operation<F>(
    client: &ApiClient,
    name: &str,
    options: &PollOptions,
    mut on_poll: F,
) -> Result<Option<Value>>
where
    F: FnMut(&Operation),
{
    let deadline = Instant::now() + options.master_timeout;
    let mut backoff = options.initial_backoff;

    loop {
        let op: Operation = client.get(&format!("/{}", name)).await?.body;
        on_poll(&op);

        if op.done {
            if let Some(error) = op.error {
                return Err(ApiError::OperationFailed {
                    name: name.to_string(),
                    message: error.message,
                });
            }
            return Ok(op.response);
        }

        if Instant::now() + backoff > deadline {
            return Err(ApiError::OperationTimeout {
                name: name.to_string(),
            });
        }
        debug!("Operation {} not done, retrying in {:?}", name, backoff);
        sleep(backoff).await;
        backoff = backoff
            .mul_f64(options.backoff_multiplier)
            .min(options.max_backoff);
    }
}
