//! # HCMS Core
//!
//! Business logic for the hospital clinical-management system: the
//! document store, the visit status state machine and the workflow
//! engine that moves patients from registration through assessment,
//! lab work, prescription and pharmacy.
//!
//! Transport concerns (HTTP, WebSockets, attachments on disk) live in
//! their own crates; this crate only knows about documents, roles and
//! the rules connecting them.

pub mod config;
pub mod constants;
pub mod costing;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod machine;
pub mod notify;
pub mod store;
pub mod validation;

pub use config::CoreConfig;
pub use error::{HcmsError, HcmsResult};
pub use lifecycle::LifecycleService;
pub use notify::{NotificationEvent, Notifier, NullNotifier, VisitNotice};
pub use store::DocumentStore;
