//! Scripted [`RemoteApi`] for tests and offline demos

use crate::client::RemoteApi;
use crate::protocol::{update_last_access_path, LastAccessRecord, LastAccessResponse};
use async_trait::async_trait;
use camwall_core::{CamwallError, CamwallResult, CctvId};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Outcome the mock hands back for one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Backend answered with this body
    Body(LastAccessResponse),
    /// Request never reached the backend
    NetworkError(String),
}

/// Call the mock observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// `record_last_access` for this camera
    RecordLastAccess(CctvId),
    /// `start_detection`
    StartDetection,
}

#[derive(Debug, Default)]
struct MockState {
    last_access_replies: VecDeque<MockReply>,
    detection_replies: VecDeque<Result<(), String>>,
    calls: Vec<RemoteCall>,
}

/// In-memory [`RemoteApi`].
///
/// Replies are consumed in order; once a script is exhausted every call
/// succeeds.
#[derive(Debug, Clone, Default)]
pub struct MockRemoteApi {
    state: Arc<Mutex<MockState>>,
}

impl MockRemoteApi {
    /// Mock that accepts every call
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next `record_last_access`
    pub fn push_last_access(&self, reply: MockReply) {
        self.state.lock().last_access_replies.push_back(reply);
    }

    /// Queue an application-level rejection for the next `record_last_access`
    pub fn reject_next_access(&self, message: impl Into<String>) {
        self.push_last_access(MockReply::Body(LastAccessResponse::failed(message)));
    }

    /// Queue a network failure for the next `record_last_access`
    pub fn fail_next_access(&self, reason: impl Into<String>) {
        self.push_last_access(MockReply::NetworkError(reason.into()));
    }

    /// Queue the outcome of the next `start_detection`
    pub fn push_detection(&self, reply: Result<(), String>) {
        self.state.lock().detection_replies.push_back(reply);
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl RemoteApi for MockRemoteApi {
    async fn record_last_access(&self, cctv_id: &CctvId) -> CamwallResult<LastAccessRecord> {
        let reply = {
            let mut state = self.state.lock();
            state.calls.push(RemoteCall::RecordLastAccess(cctv_id.clone()));
            state.last_access_replies.pop_front()
        };
        let endpoint = update_last_access_path(cctv_id);
        debug!("Mock POST {}", endpoint);

        let body = match reply {
            None => LastAccessResponse::ok("2024-01-01 00:00:00"),
            Some(MockReply::Body(body)) => body,
            Some(MockReply::NetworkError(reason)) => {
                return Err(CamwallError::RemoteCall {
                    endpoint,
                    reason,
                    application_level: false,
                })
            }
        };

        if !body.success {
            return Err(CamwallError::RemoteCall {
                endpoint,
                reason: body.message.unwrap_or_else(|| "success=false".to_string()),
                application_level: true,
            });
        }
        Ok(LastAccessRecord {
            cctv_id: cctv_id.clone(),
            recorded_at: body.last_access_time(),
            last_access: body.last_access,
        })
    }

    async fn start_detection(&self) -> CamwallResult<()> {
        let reply = {
            let mut state = self.state.lock();
            state.calls.push(RemoteCall::StartDetection);
            state.detection_replies.pop_front()
        };
        match reply {
            None | Some(Ok(())) => Ok(()),
            Some(Err(reason)) => Err(CamwallError::RemoteCall {
                endpoint: crate::protocol::START_DETECTION_PATH.to_string(),
                reason,
                application_level: true,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_consumed_in_order() {
        let api = MockRemoteApi::new();
        let id = CctvId::from_slot_index(1);
        api.reject_next_access("CCTV not found");
        api.fail_next_access("connection refused");

        let err = api.record_last_access(&id).await.unwrap_err();
        assert!(matches!(
            err,
            CamwallError::RemoteCall {
                application_level: true,
                ..
            }
        ));
        let err = api.record_last_access(&id).await.unwrap_err();
        assert!(matches!(
            err,
            CamwallError::RemoteCall {
                application_level: false,
                ..
            }
        ));
        let record = api.record_last_access(&id).await.unwrap();
        assert_eq!(record.cctv_id, id);
        assert!(record.recorded_at.is_some());
        assert_eq!(api.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_start_detection_script() {
        let api = MockRemoteApi::new();
        api.push_detection(Err("HTTP 500".to_string()));
        assert!(api.start_detection().await.is_err());
        assert!(api.start_detection().await.is_ok());
        assert_eq!(
            api.calls(),
            vec![RemoteCall::StartDetection, RemoteCall::StartDetection]
        );
    }
}
