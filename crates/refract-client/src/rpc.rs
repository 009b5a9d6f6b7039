//! HTTP transport binding for engine requests.
//!
//! One request maps to one POST of a JSON-RPC envelope against the
//! engine's root URL. Calls are serialized through a tokio `Mutex`:
//! the protocol allows at most one outstanding request per session,
//! matching the engine's own single-threaded refactoring state.

use crate::error::{EngineError, Result};
use refract_protocol::{RpcRequest, RpcResponse};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Blocking-style request/response client for the engine.
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    next_id: AtomicU64,
    in_flight: Mutex<()>,
}

impl RpcClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout,
            next_id: AtomicU64::new(1),
            in_flight: Mutex::new(()),
        }
    }

    /// Issue one request and return the decoded result unchanged.
    ///
    /// Exactly one request goes out per call — there is no retry
    /// policy, because a mutating refactoring may already have been
    /// applied when the transport fails. Faults are surfaced verbatim
    /// as [`EngineError::RemoteFault`]; the per-request deadline
    /// surfaces as the distinct [`EngineError::Timeout`] kind.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let _guard = self.in_flight.lock().await;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(method, params, id);
        debug!("dispatching {} (id {})", method, id);

        let response = self
            .http
            .post(&self.base_url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::transport(method, self.timeout, e))?;

        let response: RpcResponse = response
            .json()
            .await
            .map_err(|e| EngineError::transport(method, self.timeout, e))?;

        if let Some(fault) = response.error {
            warn!(
                "engine fault during {}: {} (code {})",
                method, fault.message, fault.code
            );
            return Err(EngineError::RemoteFault {
                method: method.to_string(),
                code: fault.code,
                message: fault.message,
                data: fault.data,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
