use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use lichub_storage::attachments::AttachmentStore;
use lichub_storage::store::EntityStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EntityStore>,
    pub attachments: Arc<AttachmentStore>,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}
