//! Constants shared across the HCMS core crate.

/// Maximum length for person name parts (first name, last name).
pub const MAX_NAME_LEN: usize = 50;

/// Maximum length for a username.
pub const MAX_USERNAME_LEN: usize = 50;

/// Maximum length for the chief complaint recorded at registration.
pub const MAX_COMPLAINT_LEN: usize = 1000;

/// Maximum length for the symptoms field recorded by the checker doctor.
pub const MAX_SYMPTOMS_LEN: usize = 1000;

/// Maximum length for a diagnosis.
pub const MAX_DIAGNOSIS_LEN: usize = 1000;

/// Maximum length for free-form visit notes.
pub const MAX_VISIT_NOTES_LEN: usize = 2000;

/// Maximum length for a lab test name.
pub const MAX_TEST_NAME_LEN: usize = 100;

/// Maximum length for a lab test result body.
pub const MAX_RESULT_LEN: usize = 2000;

/// Maximum length for short notes fields (lab, prescription, payment).
pub const MAX_SHORT_NOTES_LEN: usize = 500;

/// Maximum length for a medicine name.
pub const MAX_MEDICINE_NAME_LEN: usize = 100;

/// Maximum length for a dosage description.
pub const MAX_DOSAGE_LEN: usize = 50;

/// Maximum length for a treatment duration description.
pub const MAX_DURATION_LEN: usize = 50;

/// Maximum length for a per-medicine instruction.
pub const MAX_INSTRUCTION_LEN: usize = 200;

/// Maximum length for an external payment transaction id.
pub const MAX_TRANSACTION_ID_LEN: usize = 100;

/// Upper bound accepted for a patient's age in years.
pub const MAX_AGE: u32 = 150;

/// Stock level below which a medicine counts as low on stock, unless
/// the medicine overrides it.
pub const DEFAULT_MINIMUM_STOCK: u32 = 10;

/// Page size applied when a listing request does not specify one.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Largest page size a listing request may ask for.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Shortest admin bootstrap token the configuration accepts.
pub const MIN_ADMIN_TOKEN_LEN: usize = 16;
