use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::services::admin_service::AdminBoard;
use crate::services::blob_service::BlobStore;
use crate::services::records_service::RecordStore;
use crate::services::session_service::SqliteSession;
use crate::services::ticket_cache_service::DeviceTicketCache;
use crate::web::middleware::visitor::Visitor;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub records: Arc<dyn RecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub admin_board: Arc<RwLock<AdminBoard>>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            pool,
            records,
            blobs,
            admin_board: Arc::new(RwLock::new(AdminBoard::default())),
        }
    }

    pub fn session(&self, visitor: &Visitor) -> SqliteSession {
        SqliteSession::new(self.pool.clone(), visitor.session_id.clone())
    }

    pub fn ticket_cache(&self, visitor: &Visitor) -> DeviceTicketCache {
        DeviceTicketCache::new(self.pool.clone(), visitor.device_id.clone())
    }
}
