//! Scripted transport used by the test suite.

use std::sync::Mutex;
use std::time::Duration;

use crate::{MethodId, Transport, TransportError};

type Handler =
    Box<dyn Fn(&MethodId, &[(String, String)]) -> Result<Vec<u8>, TransportError> + Send + Sync>;

/// One recorded transport invocation.
#[derive(Clone, Debug)]
pub(crate) struct RecordedCall {
    pub method: String,
    pub params: Vec<(String, String)>,
}

/// Transport that records every invocation and answers through a handler.
pub(crate) struct MockTransport {
    handler: Handler,
    latency: Option<Box<dyn Fn() -> Duration + Send + Sync>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&MethodId, &[(String, String)]) -> Result<Vec<u8>, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            handler: Box::new(handler),
            latency: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with the same body.
    pub fn replying(body: &str) -> Self {
        let body = body.as_bytes().to_vec();
        Self::new(move |_, _| Ok(body.clone()))
    }

    /// Delays each reply by the duration the closure returns.
    pub fn with_latency<F>(mut self, latency: F) -> Self
    where
        F: Fn() -> Duration + Send + Sync + 'static,
    {
        self.latency = Some(Box::new(latency));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        method: &MethodId,
        params: &[(String, String)],
    ) -> Result<Vec<u8>, TransportError> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            method: method.as_str().to_owned(),
            params: params.to_vec(),
        });

        if let Some(latency) = &self.latency {
            tokio::time::sleep(latency()).await;
        }

        (self.handler)(method, params)
    }
}
