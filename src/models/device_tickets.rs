#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeviceTicketRow {
    pub seq: i64,
    pub device_id: String,
    pub ticket_id: String,
    pub record_json: String,
    pub saved_at: String,
}
