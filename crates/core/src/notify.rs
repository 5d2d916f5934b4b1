//! Notification contract between the workflow engine and the
//! transport layer.
//!
//! The engine emits events after a write commits; delivery is
//! fire-and-forget and never affects the outcome of the operation.
//! The REST crate implements [`Notifier`] on top of a broadcast
//! channel feeding WebSocket subscribers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Role, Visit, VisitStatus};

/// Summary of a visit, shaped for the notification payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitNotice {
    pub id: Uuid,
    pub code: String,
    pub patient: Uuid,
    pub patient_name: String,
    pub complaint: String,
    pub visit_date: DateTime<Utc>,
    pub status: VisitStatus,
}

impl VisitNotice {
    pub fn from_visit(visit: &Visit, patient_name: String) -> Self {
        Self {
            id: visit.id,
            code: visit.code(),
            patient: visit.patient,
            patient_name,
            complaint: visit.complaint.clone(),
            visit_date: visit.visit_date,
            status: visit.status,
        }
    }
}

/// Events the engine can emit.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// A visit was registered and is waiting for the checker doctor.
    NewVisit(VisitNotice),
}

impl NotificationEvent {
    /// Wire name of the event.
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::NewVisit(_) => "new-visit",
        }
    }

    /// JSON payload carried by the event.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            NotificationEvent::NewVisit(notice) => {
                serde_json::to_value(notice).unwrap_or(serde_json::Value::Null)
            }
        }
    }
}

/// Sink for workflow events, addressed to one staff role.
pub trait Notifier: Send + Sync {
    fn notify(&self, audience: Role, event: NotificationEvent);
}

/// Notifier that drops everything. Used by tests and by tools that run
/// the engine without a transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _audience: Role, _event: NotificationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_visit_payload_carries_the_summary_fields() {
        let visit = Visit::new(Uuid::new_v4(), "fever and headache".to_string(), None);
        let notice = VisitNotice::from_visit(&visit, "Asha Patel".to_string());
        let event = NotificationEvent::NewVisit(notice);
        assert_eq!(event.kind(), "new-visit");
        let payload = event.payload();
        assert_eq!(payload["patientName"], "Asha Patel");
        assert_eq!(payload["complaint"], "fever and headache");
        assert_eq!(payload["status"], "registered");
    }
}
