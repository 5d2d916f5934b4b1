//! OpenAPI document served at `/api-docs/openapi.json` and rendered
//! by the Swagger UI.

use utoipa::OpenApi;

use crate::{dto, routes};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health,
        routes::patients::create_patient,
        routes::patients::list_patients,
        routes::patients::get_patient,
        routes::visits::create_visit,
        routes::visits::list_visits,
        routes::visits::pending_visits,
        routes::visits::get_visit,
        routes::visits::checker_assessment,
        routes::visits::checker_direct,
        routes::visits::update_status,
        routes::labs::pending_tests,
        routes::labs::tests_for_visit,
        routes::labs::submit_result,
        routes::prescriptions::create_prescription,
        routes::prescriptions::prescription_for_visit,
        routes::pharmacy::pending_prescriptions,
        routes::pharmacy::dispense,
        routes::pharmacy::partial_dispense,
        routes::pharmacy::create_medicine,
        routes::pharmacy::list_medicines,
        routes::pharmacy::adjust_stock,
        routes::payments::record_payment,
        routes::payments::confirm_payment,
        routes::payments::payments_for_visit,
        routes::users::create_user,
        routes::users::list_users,
        routes::uploads::download,
    ),
    components(schemas(
        dto::MessageRes,
        dto::PaginationMeta,
        dto::UserView,
        dto::VisitDetail,
        dto::AssessmentData,
        dto::PrescriptionWithVisit,
        dto::CreatedUser,
        dto::PatientRes,
        dto::PatientListRes,
        dto::VisitRes,
        dto::VisitListRes,
        dto::VisitQueueRes,
        dto::VisitDetailRes,
        dto::AssessmentRes,
        dto::LabTestRes,
        dto::LabTestListRes,
        dto::CreatePrescriptionRes,
        dto::PrescriptionRes,
        dto::PrescriptionListRes,
        dto::MedicineRes,
        dto::MedicineListRes,
        dto::PaymentRes,
        dto::PaymentListRes,
        dto::UserRes,
        dto::UserListRes,
        dto::CreatedUserRes,
        routes::patients::CreatePatientReq,
        routes::visits::CreateVisitReq,
        routes::visits::LabOrderReq,
        routes::visits::AssessmentReq,
        routes::visits::DirectAssessmentReq,
        routes::visits::UpdateStatusReq,
        routes::prescriptions::PrescriptionLineReq,
        routes::prescriptions::CreatePrescriptionReq,
        routes::pharmacy::DispenseReq,
        routes::pharmacy::DispensedLineReq,
        routes::pharmacy::PartialDispenseReq,
        routes::pharmacy::CreateMedicineReq,
        routes::pharmacy::StockAdjustReq,
        routes::payments::RecordPaymentReq,
        routes::users::CreateUserReq,
        hcms_core::domain::Patient,
        hcms_core::domain::Gender,
        hcms_core::domain::Contact,
        hcms_core::domain::Address,
        hcms_core::domain::Visit,
        hcms_core::domain::VisitStatus,
        hcms_core::domain::LabTest,
        hcms_core::domain::LabTestType,
        hcms_core::domain::Prescription,
        hcms_core::domain::MedicineLine,
        hcms_core::domain::PharmacyStatus,
        hcms_core::domain::Medicine,
        hcms_core::domain::MedicineUnit,
        hcms_core::domain::Payment,
        hcms_core::domain::PaymentType,
        hcms_core::domain::PaymentMethod,
        hcms_core::domain::Role,
        hcms_core::store::StockOperation,
    ))
)]
pub(crate) struct ApiDoc;
