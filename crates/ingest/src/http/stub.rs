//! Scripted [`HttpFetch`] used by the in-crate tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::HttpFetch;
use crate::errors::IngestError;
use crate::models::ApiRequest;

/// What the stub answers for one request.
pub(crate) enum Reply {
    Body(String),
    Bytes(Vec<u8>),
    Status(u16),
    Timeout,
}

impl Reply {
    pub(crate) fn json(value: serde_json::Value) -> Self {
        Reply::Body(value.to_string())
    }
}

/// Replays queued replies in order and records every request it receives.
/// Once the queue is drained it keeps answering with the fallback reply.
pub(crate) struct StubHttp {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Option<Vec<u8>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubHttp {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn always(value: serde_json::Value) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(value.to_string().into_bytes()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpFetch for StubHttp {
    async fn get_text(&self, provider: &str, request: &ApiRequest) -> Result<String, IngestError> {
        let body = self.get_bytes(provider, request).await?;
        String::from_utf8(body).map_err(|e| IngestError::parse(provider, e.to_string()))
    }

    async fn get_bytes(&self, provider: &str, request: &ApiRequest) -> Result<Vec<u8>, IngestError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Body(body)) => Ok(body.into_bytes()),
            Some(Reply::Bytes(bytes)) => Ok(bytes),
            Some(Reply::Status(status)) => Err(IngestError::Http {
                provider: provider.to_string(),
                status,
            }),
            Some(Reply::Timeout) => Err(IngestError::Timeout {
                provider: provider.to_string(),
            }),
            None => self.fallback.clone().ok_or_else(|| IngestError::Network {
                provider: provider.to_string(),
                message: "no scripted reply".to_string(),
            }),
        }
    }
}
