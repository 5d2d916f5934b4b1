//! Response payloads for the REST endpoints.
//!
//! Successful responses share the envelope `{"success": true, "data":
//! ...}`, with a `pagination` block on listing endpoints. Each
//! endpoint has a concrete response struct so the OpenAPI document
//! shows real schemas.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use hcms_core::domain::{
    LabTest, Medicine, Patient, Payment, Prescription, Role, User, Visit,
};
use hcms_core::store::{Paged, VisitBundle};

/// Plain acknowledgement, also used by the health endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageRes {
    pub success: bool,
    pub message: String,
}

/// Staff account view. The bearer token is only ever disclosed in
/// [`CreatedUserRes`], directly after the account is created.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Pagination block attached to listing responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

impl PaginationMeta {
    pub fn from_paged<T>(paged: &Paged<T>) -> Self {
        Self {
            page: paged.page,
            limit: paged.limit,
            total: paged.total,
            pages: paged.pages(),
        }
    }
}

/// A visit with every related document resolved, served by the visit
/// detail endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitDetail {
    pub visit: Visit,
    pub patient: Option<Patient>,
    pub checker_doctor: Option<UserView>,
    pub main_doctor: Option<UserView>,
    pub lab_tests: Vec<LabTest>,
    pub prescription: Option<Prescription>,
    pub payments: Vec<Payment>,
}

impl From<VisitBundle> for VisitDetail {
    fn from(bundle: VisitBundle) -> Self {
        Self {
            visit: bundle.visit,
            patient: bundle.patient,
            checker_doctor: bundle.checker_doctor.map(UserView::from),
            main_doctor: bundle.main_doctor.map(UserView::from),
            lab_tests: bundle.lab_tests,
            prescription: bundle.prescription,
            payments: bundle.payments,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientRes {
    pub success: bool,
    pub data: Patient,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientListRes {
    pub success: bool,
    pub data: Vec<Patient>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VisitRes {
    pub success: bool,
    pub data: Visit,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VisitListRes {
    pub success: bool,
    pub data: Vec<Visit>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VisitQueueRes {
    pub success: bool,
    pub data: Vec<Visit>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VisitDetailRes {
    pub success: bool,
    pub data: VisitDetail,
}

/// The checker assessment returns the updated visit together with the
/// lab tests it ordered.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentData {
    pub visit: Visit,
    pub lab_tests: Vec<LabTest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssessmentRes {
    pub success: bool,
    pub data: AssessmentData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LabTestRes {
    pub success: bool,
    pub data: LabTest,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LabTestListRes {
    pub success: bool,
    pub data: Vec<LabTest>,
}

/// Writing a prescription also advances the visit; both come back.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionWithVisit {
    pub prescription: Prescription,
    pub visit: Visit,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePrescriptionRes {
    pub success: bool,
    pub data: PrescriptionWithVisit,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrescriptionRes {
    pub success: bool,
    pub data: Prescription,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrescriptionListRes {
    pub success: bool,
    pub data: Vec<Prescription>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MedicineRes {
    pub success: bool,
    pub data: Medicine,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MedicineListRes {
    pub success: bool,
    pub data: Vec<Medicine>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentRes {
    pub success: bool,
    pub data: Payment,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentListRes {
    pub success: bool,
    pub data: Vec<Payment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserRes {
    pub success: bool,
    pub data: UserView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListRes {
    pub success: bool,
    pub data: Vec<UserView>,
}

/// A freshly created account, with its bearer token. This is the only
/// place the token appears in a response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub user: UserView,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedUserRes {
    pub success: bool,
    pub data: CreatedUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_view_never_contains_a_token() {
        let user = User::new(
            "reception.desk".to_string(),
            "Front Desk".to_string(),
            Role::Reception,
            "very-secret".to_string(),
        );
        let view = UserView::from(user);
        let json = serde_json::to_string(&view).expect("Failed to serialise");
        assert!(!json.contains("very-secret"));
        assert!(!json.contains("token"));
    }

    #[test]
    fn visit_detail_maps_related_users_to_views() {
        let visit = Visit::new(Uuid::new_v4(), "fever".to_string(), None);
        let doctor = User::new(
            "dr.checker".to_string(),
            "Checker".to_string(),
            Role::CheckerDoctor,
            "secret".to_string(),
        );
        let bundle = VisitBundle {
            visit,
            patient: None,
            checker_doctor: Some(doctor),
            main_doctor: None,
            lab_tests: Vec::new(),
            prescription: None,
            payments: Vec::new(),
        };
        let detail = VisitDetail::from(bundle);
        let checker = detail.checker_doctor.expect("Checker should be present");
        assert_eq!(checker.username, "dr.checker");
        assert!(detail.main_doctor.is_none());
    }
}
