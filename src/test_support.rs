use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value as JsonValue;

use crate::api::{ApiRequest, ApiResponse};
use crate::transport::{Transport, TransportError};

type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync;

/// In-memory backend: answers through a closure and records every request.
pub(crate) struct ScriptedTransport {
    handler: Box<Handler>,
    delay: Option<Duration>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(
        handler: impl Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            delay: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn with_delay(
        delay: Duration,
        handler: impl Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            delay: Some(delay),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn calls_to(&self, path: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.path == path).count()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(&request)
    }
}

pub(crate) fn ok(body: JsonValue) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(200, body))
}

pub(crate) fn status(http_status: u16, body: JsonValue) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(http_status, body))
}
