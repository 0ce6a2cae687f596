use sqlx::SqlitePool;

use crate::models::DeviceTicketRow;

const SQL_INSERT_DEVICE_TICKET: &str = r#"
INSERT INTO device_tickets (
  device_id,
  ticket_id,
  record_json
) VALUES (?, ?, ?)
"#;

const SQL_LIST_DEVICE_TICKETS: &str = r#"
SELECT
  seq,
  device_id,
  ticket_id,
  record_json,
  saved_at
FROM device_tickets
WHERE device_id = ?
ORDER BY seq ASC
"#;

pub struct NewDeviceTicket<'a> {
    pub device_id: &'a str,
    pub ticket_id: &'a str,
    pub record_json: &'a str,
}

pub async fn insert_device_ticket(
    pool: &SqlitePool,
    ticket: NewDeviceTicket<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_DEVICE_TICKET)
        .bind(ticket.device_id)
        .bind(ticket.ticket_id)
        .bind(ticket.record_json)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list_device_tickets(
    pool: &SqlitePool,
    device_id: &str,
) -> sqlx::Result<Vec<DeviceTicketRow>> {
    sqlx::query_as::<_, DeviceTicketRow>(SQL_LIST_DEVICE_TICKETS)
        .bind(device_id)
        .fetch_all(pool)
        .await
}
