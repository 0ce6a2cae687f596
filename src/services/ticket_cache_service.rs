use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;

use crate::database::device_tickets_repo::{self, NewDeviceTicket};
use crate::models::Registration;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("ticket cache storage failed: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("ticket could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Completed registrations remembered for one device, oldest first.
#[async_trait]
pub trait TicketCache: Send + Sync {
    async fn append(&self, registration: &Registration) -> Result<(), CacheError>;
    async fn read_all(&self) -> Result<Vec<Registration>, CacheError>;
}

#[derive(Debug, Clone)]
pub struct DeviceTicketCache {
    pool: SqlitePool,
    device_id: String,
}

impl DeviceTicketCache {
    pub fn new(pool: SqlitePool, device_id: impl Into<String>) -> Self {
        Self {
            pool,
            device_id: device_id.into(),
        }
    }
}

#[async_trait]
impl TicketCache for DeviceTicketCache {
    async fn append(&self, registration: &Registration) -> Result<(), CacheError> {
        let record_json = serde_json::to_string(registration)?;
        device_tickets_repo::insert_device_ticket(
            &self.pool,
            NewDeviceTicket {
                device_id: &self.device_id,
                ticket_id: &registration.ticket_id,
                record_json: &record_json,
            },
        )
        .await?;
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Registration>, CacheError> {
        let rows = device_tickets_repo::list_device_tickets(&self.pool, &self.device_id).await?;
        Ok(rows
            .into_iter()
            .filter_map(
                |row| match serde_json::from_str::<Registration>(&row.record_json) {
                    Ok(reg) => Some(reg),
                    Err(e) => {
                        warn!("Skipping unreadable cached ticket {}: {}", row.ticket_id, e);
                        None
                    }
                },
            )
            .collect())
    }
}
