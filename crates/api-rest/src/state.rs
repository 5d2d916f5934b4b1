//! Application state shared by all request handlers.

use std::sync::Arc;

use tokio::sync::broadcast;

use hcms_core::{CoreConfig, DocumentStore, LifecycleService};
use hcms_files::AttachmentStore;

use crate::ws::{ChannelNotifier, RoleEvent};

/// Buffered events per WebSocket subscriber before laggards start
/// losing messages.
const EVENT_CHANNEL_CAPACITY: usize = 128;

/// Shared state for the REST API server.
///
/// Cloned per request; everything inside is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub store: Arc<DocumentStore>,
    pub lifecycle: LifecycleService,
    pub attachments: Arc<AttachmentStore>,
    pub events: broadcast::Sender<RoleEvent>,
}

impl AppState {
    /// Builds the full service graph from a validated configuration:
    /// the document store, the attachment store rooted at the upload
    /// directory, the event channel and the workflow engine wired to
    /// publish into it.
    pub fn new(cfg: CoreConfig) -> anyhow::Result<Self> {
        let store = Arc::new(DocumentStore::new());
        let attachments = Arc::new(AttachmentStore::new(cfg.upload_dir())?);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let notifier = Arc::new(ChannelNotifier::new(events.clone()));
        let lifecycle = LifecycleService::new(Arc::clone(&store), notifier);
        Ok(Self {
            cfg: Arc::new(cfg),
            store,
            lifecycle,
            attachments,
            events,
        })
    }

    /// Ensures the bootstrap admin account matches the configured
    /// token. Called once at startup.
    pub async fn bootstrap(&self) {
        let admin = self.store.bootstrap_admin(self.cfg.admin_token()).await;
        tracing::info!(user = %admin.id, "bootstrap admin account ready");
    }
}
