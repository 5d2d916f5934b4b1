//! Patient demographics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::short_code;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// How to reach the patient. The phone number is mandatory because it
/// doubles as the lookup key at the reception desk.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    pub contact: Contact,
    pub address: Address,
    /// The reception user that registered the patient.
    pub registered_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn new(
        first_name: String,
        last_name: String,
        age: u32,
        gender: Gender,
        contact: Contact,
        address: Address,
        registered_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            age,
            gender,
            contact,
            address,
            registered_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Human-facing patient code shown on printed paperwork.
    pub fn code(&self) -> String {
        short_code("PAT", &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Patient {
        Patient::new(
            "Asha".to_string(),
            "Patel".to_string(),
            34,
            Gender::Female,
            Contact {
                phone: "+1 555 0100".to_string(),
                email: None,
            },
            Address::default(),
            Uuid::new_v4(),
        )
    }

    #[test]
    fn full_name_joins_first_and_last() {
        assert_eq!(patient().full_name(), "Asha Patel");
    }

    #[test]
    fn serialisation_uses_camel_case_and_omits_empty_contact_email() {
        let json = serde_json::to_string(&patient()).expect("Failed to serialise");
        assert!(json.contains("\"firstName\":\"Asha\""));
        assert!(!json.contains("email"));
    }
}
