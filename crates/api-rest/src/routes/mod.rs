//! Endpoint handlers, grouped by resource.

pub(crate) mod labs;
pub(crate) mod patients;
pub(crate) mod payments;
pub(crate) mod pharmacy;
pub(crate) mod prescriptions;
pub(crate) mod uploads;
pub(crate) mod users;
pub(crate) mod visits;

use uuid::Uuid;

use crate::error::ApiError;

/// Parses a path segment as a UUID; `label` names the resource in the
/// error message, e.g. "visit" gives "Invalid visit UUID".
pub(crate) fn parse_uuid(value: &str, label: &str) -> Result<Uuid, ApiError> {
    match Uuid::parse_str(value) {
        Ok(id) => Ok(id),
        Err(e) => {
            tracing::error!("Invalid {label} UUID: {e:?}");
            Err(ApiError::bad_request(format!("Invalid {label} UUID")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uuid_labels_the_error() {
        let err = parse_uuid("not-a-uuid", "visit").expect_err("Expected an error");
        assert_eq!(err.message(), "Invalid visit UUID");
    }

    #[test]
    fn parse_uuid_accepts_canonical_form() {
        let id = Uuid::new_v4();
        let parsed = parse_uuid(&id.to_string(), "patient").expect("Expected a UUID");
        assert_eq!(parsed, id);
    }
}
