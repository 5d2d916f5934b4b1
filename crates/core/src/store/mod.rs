//! In-memory document store backing the workflow engine.
//!
//! Each collection lives behind its own [`tokio::sync::RwLock`] keyed
//! by document id. Multi-step writes that must observe a consistent
//! document go through the `with_*_mut` closure helpers, which hold
//! the collection's write lock for the duration of the closure.
//! Cross-collection operations (lab completion advancing a visit,
//! dispensing decrementing stock) take the locks one at a time and
//! re-check state under each lock, so a lost race degrades to a
//! no-op or a compensated rollback rather than a torn write.

mod labs;
mod medicines;
mod patients;
mod payments;
mod prescriptions;
mod users;
mod visits;

pub use labs::LabResultUpdate;
pub use medicines::{MedicineFilter, StockDemand, StockOperation};
pub use visits::{VisitBundle, VisitFilter};

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::domain::{LabTest, Medicine, Patient, Payment, Prescription, User, Visit};

/// All collections of the system.
#[derive(Default)]
pub struct DocumentStore {
    patients: RwLock<HashMap<Uuid, Patient>>,
    visits: RwLock<HashMap<Uuid, Visit>>,
    lab_tests: RwLock<HashMap<Uuid, LabTest>>,
    prescriptions: RwLock<HashMap<Uuid, Prescription>>,
    payments: RwLock<HashMap<Uuid, Payment>>,
    medicines: RwLock<HashMap<Uuid, Medicine>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A page request, normalised to sane bounds.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    page: usize,
    limit: usize,
}

impl Page {
    /// Builds a page request from raw query values. Pages start at 1;
    /// the limit is clamped to [`MAX_PAGE_LIMIT`].
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    pub fn number(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }

    /// Applies the page window to an already sorted vector.
    fn slice<T>(&self, items: Vec<T>) -> (Vec<T>, usize) {
        let total = items.len();
        let window = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit)
            .collect();
        (window, total)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the totals the listing endpoints report.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

impl<T> Paged<T> {
    fn new(page: Page, items: Vec<T>, total: usize) -> Self {
        Self {
            items,
            total,
            page: page.number(),
            limit: page.limit(),
        }
    }

    /// Number of pages needed for `total` at the page's limit.
    pub fn pages(&self) -> usize {
        self.total.div_ceil(self.limit)
    }
}
