//! Audit trail for authentication outcomes.
//!
//! Emission is fire-and-forget: `record` is synchronous, infallible, and must
//! never block or fail the operation it documents. Storage of the trail is a
//! collaborator concern; the default sink logs structured events.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditKind {
    LoginSuccess,
    LoginFailed,
    AccountLocked,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub identity_id: Option<Uuid>,
    pub kind: AuditKind,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Default sink: one structured log line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        info!(
            kind = ?event.kind,
            identity_id = event.identity_id.map(|id| id.to_string()),
            ip_address = event.ip_address,
            user_agent = event.user_agent,
            timestamp = %event.timestamp,
            "Audit event"
        );
    }
}

/// Captures events in memory; used by tests to assert on emitted branches.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit lock poisoned").clone()
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<AuditKind> {
        self.events().into_iter().map(|event| event.kind).collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.lock().expect("audit lock poisoned").push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_in_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(AuditKind::LoginSuccess).unwrap(),
            "LOGIN_SUCCESS"
        );
        assert_eq!(
            serde_json::to_value(AuditKind::LoginFailed).unwrap(),
            "LOGIN_FAILED"
        );
        assert_eq!(
            serde_json::to_value(AuditKind::AccountLocked).unwrap(),
            "ACCOUNT_LOCKED"
        );
    }

    #[test]
    fn events_serialize_including_identity_id() {
        let event = AuditEvent {
            identity_id: Some(Uuid::new_v4()),
            kind: AuditKind::LoginSuccess,
            ip_address: Some("203.0.113.9".to_string()),
            user_agent: Some("tester/1.0".to_string()),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], "LOGIN_SUCCESS");
        assert!(value["identity_id"].is_string());
        assert_eq!(value["ip_address"], "203.0.113.9");
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingAuditSink::new();
        for kind in [AuditKind::LoginFailed, AuditKind::AccountLocked] {
            sink.record(AuditEvent {
                identity_id: None,
                kind,
                ip_address: None,
                user_agent: None,
                timestamp: Utc::now(),
            });
        }
        assert_eq!(
            sink.kinds(),
            vec![AuditKind::LoginFailed, AuditKind::AccountLocked]
        );
    }
}
