//! Lab tests ordered during a visit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::short_code;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LabTestType {
    Blood,
    Urine,
    Xray,
    Ct,
    Mri,
    Ultrasound,
    Other,
}

/// A single ordered lab test.
///
/// `is_completed` flips to true exactly once, when the lab tech
/// submits the result. The result fields stay `None` until then.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    pub id: Uuid,
    pub visit: Uuid,
    pub test_name: String,
    pub test_type: LabTestType,
    pub cost: f64,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Relative URL of the uploaded result document, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Lab tech that performed the test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performed_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LabTest {
    pub fn new(visit: Uuid, test_name: String, test_type: LabTestType, cost: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            visit,
            test_name,
            test_type,
            cost,
            is_completed: false,
            result: None,
            file_url: None,
            notes: None,
            performed_by: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Human-facing lab order code, e.g. `LAB-0A4F21`.
    pub fn code(&self) -> String {
        short_code("LAB", &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tests_start_incomplete_with_no_result() {
        let test = LabTest::new(
            Uuid::new_v4(),
            "Complete Blood Count".to_string(),
            LabTestType::Blood,
            25.0,
        );
        assert!(!test.is_completed);
        assert!(test.result.is_none());
        assert!(test.performed_by.is_none());
        assert!(test.completed_at.is_none());
    }

    #[test]
    fn test_type_serialises_in_lowercase() {
        let json = serde_json::to_string(&LabTestType::Xray).expect("Failed to serialise");
        assert_eq!(json, "\"xray\"");
    }

    #[test]
    fn pending_tests_omit_result_fields_from_json() {
        let test = LabTest::new(Uuid::new_v4(), "CBC".to_string(), LabTestType::Blood, 25.0);
        let json = serde_json::to_string(&test).expect("Failed to serialise");
        assert!(json.contains("\"isCompleted\":false"));
        assert!(!json.contains("\"result\""));
        assert!(!json.contains("\"fileUrl\""));
    }
}
