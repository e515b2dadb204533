// SPDX-License-Identifier: MIT

//! Audit Log Sink (C9): write-only structured event emission to the
//! host's log store (§4.9). The core never reads its own audit trail
//! back.

use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventKind {
    View,
    Change,
    Warning,
    Error,
    Command,
}

/// Per-call context that doesn't change across one connector's
/// lifetime, threaded into every mutation so audit events carry who
/// did what without each call site re-stating it.
#[derive(Debug, Clone)]
pub struct AuditMeta {
    pub user: String,
    pub remote_ip: String,
    pub group: String,
    pub switch: String,
}

#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub timestamp_unix: u64,
    pub user: String,
    pub remote_ip: String,
    pub group: String,
    pub switch: String,
    pub if_index: Option<u32>,
    pub kind: AuditEventKind,
    pub action_code: &'static str,
    pub description: String,
}

impl AuditEvent {
    pub fn new(meta: &AuditMeta, if_index: Option<u32>, kind: AuditEventKind, action_code: &'static str, description: impl Into<String>) -> Self {
        AuditEvent {
            timestamp_unix: SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0),
            user: meta.user.clone(),
            remote_ip: meta.remote_ip.clone(),
            group: meta.group.clone(),
            switch: meta.switch.clone(),
            if_index,
            kind,
            action_code,
            description: description.into(),
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn emit(&self, event: AuditEvent);
}

/// An `AuditSink` that discards everything; the host is expected to
/// supply a real sink, but tests and examples need something to hand
/// `new_connector`.
#[derive(Debug, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn emit(&self, _event: AuditEvent) {}
}

/// An in-memory sink for tests that need to assert on what was logged.
#[derive(Default)]
pub struct RecordingAuditSink {
    events: std::sync::Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit sink mutex poisoned").clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn emit(&self, event: AuditEvent) {
        self.events.lock().expect("audit sink mutex poisoned").push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_captures_emitted_events() {
        let sink = RecordingAuditSink::new();
        let meta = AuditMeta {
            user: "alice".into(),
            remote_ip: "10.0.0.1".into(),
            group: "noc".into(),
            switch: "sw1".into(),
        };
        sink.emit(AuditEvent::new(&meta, Some(1), AuditEventKind::Change, "set_admin_status", "admin up"));
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user, "alice");
        assert_eq!(events[0].action_code, "set_admin_status");
    }
}
