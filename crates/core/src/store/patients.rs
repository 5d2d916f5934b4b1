//! Patient collection operations.

use uuid::Uuid;

use crate::domain::Patient;

use super::{DocumentStore, Page, Paged};

impl DocumentStore {
    pub async fn insert_patient(&self, patient: Patient) {
        self.patients.write().await.insert(patient.id, patient);
    }

    pub async fn patient(&self, id: Uuid) -> Option<Patient> {
        self.patients.read().await.get(&id).cloned()
    }

    pub async fn patient_exists(&self, id: Uuid) -> bool {
        self.patients.read().await.contains_key(&id)
    }

    /// Lists patients, newest first, optionally filtered by a
    /// case-insensitive substring of the name or an exact digit match
    /// on the phone number.
    pub async fn search_patients(&self, search: Option<&str>, page: Page) -> Paged<Patient> {
        let patients = self.patients.read().await;
        let needle = search.map(str::to_lowercase);
        let mut matches: Vec<Patient> = patients
            .values()
            .filter(|patient| match needle.as_deref() {
                Some(needle) => {
                    patient.full_name().to_lowercase().contains(needle)
                        || patient.contact.phone.contains(needle)
                }
                None => true,
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let (items, total) = page.slice(matches);
        Paged::new(page, items, total)
    }
}
