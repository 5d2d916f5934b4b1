//! Visits and their workflow status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::short_code;

/// Workflow status of a visit.
///
/// The allowed movements between statuses live in [`crate::machine`];
/// this type only names the states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    /// Registered at reception, waiting for the checker doctor.
    Registered,
    /// Assessed by the checker doctor, no lab work ordered.
    Checked,
    /// Lab tests ordered and not yet all completed.
    LabPending,
    /// Every ordered lab test has a result.
    LabDone,
    /// The main doctor recorded a diagnosis and prescription.
    Diagnosed,
    /// Prescription fully dispensed. Terminal.
    Done,
}

impl VisitStatus {
    pub const ALL: [VisitStatus; 6] = [
        VisitStatus::Registered,
        VisitStatus::Checked,
        VisitStatus::LabPending,
        VisitStatus::LabDone,
        VisitStatus::Diagnosed,
        VisitStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Registered => "registered",
            VisitStatus::Checked => "checked",
            VisitStatus::LabPending => "lab_pending",
            VisitStatus::LabDone => "lab_done",
            VisitStatus::Diagnosed => "diagnosed",
            VisitStatus::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<VisitStatus> {
        VisitStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == value)
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One patient encounter, from registration to pharmacy.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: Uuid,
    pub patient: Uuid,
    pub visit_date: DateTime<Utc>,
    pub complaint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    /// Checker doctor that recorded the first assessment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checker_doctor: Option<Uuid>,
    /// Main doctor that recorded the diagnosis and prescription.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_doctor: Option<Uuid>,
    /// Ids of the lab tests ordered for this visit.
    pub lab_tests: Vec<Uuid>,
    pub status: VisitStatus,
    /// Running total of everything billed to this visit. Never
    /// decreases.
    pub total_cost: f64,
    pub paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Visit {
    pub fn new(patient: Uuid, complaint: String, visit_date: Option<DateTime<Utc>>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            patient,
            visit_date: visit_date.unwrap_or(now),
            complaint,
            symptoms: None,
            diagnosis: None,
            checker_doctor: None,
            main_doctor: None,
            lab_tests: Vec::new(),
            status: VisitStatus::Registered,
            total_cost: 0.0,
            paid: false,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Human-facing visit code, e.g. `VISIT-5FE0C8`.
    pub fn code(&self) -> String {
        short_code("VISIT", &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_visits_start_registered_unpaid_and_free() {
        let visit = Visit::new(Uuid::new_v4(), "fever".to_string(), None);
        assert_eq!(visit.status, VisitStatus::Registered);
        assert_eq!(visit.total_cost, 0.0);
        assert!(!visit.paid);
        assert!(visit.lab_tests.is_empty());
    }

    #[test]
    fn status_serialises_in_snake_case() {
        let json = serde_json::to_string(&VisitStatus::LabPending).expect("Failed to serialise");
        assert_eq!(json, "\"lab_pending\"");
        let parsed: VisitStatus =
            serde_json::from_str("\"lab_done\"").expect("Failed to deserialise");
        assert_eq!(parsed, VisitStatus::LabDone);
    }

    #[test]
    fn status_parse_round_trips_every_status() {
        for status in VisitStatus::ALL {
            assert_eq!(VisitStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(VisitStatus::parse("archived"), None);
    }

    #[test]
    fn visit_code_carries_the_expected_prefix() {
        let visit = Visit::new(Uuid::new_v4(), "fever".to_string(), None);
        let code = visit.code();
        assert!(code.starts_with("VISIT-"));
        assert_eq!(code.len(), "VISIT-".len() + 6);
    }
}
