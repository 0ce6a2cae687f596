use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::RegistrationSummary;
use crate::services::records_service::{PersistenceError, RecordStore};

const CSV_HEADER: [&str; 9] = [
    "Ticket ID",
    "Name",
    "Email",
    "Phone",
    "Type",
    "Attendees",
    "Amount",
    "Verified",
    "Date",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Verified,
    Pending,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Verified => "verified",
            StatusFilter::Pending => "pending",
        }
    }

    fn admits(&self, row: &RegistrationSummary) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Verified => row.payment_verified,
            StatusFilter::Pending => !row.payment_verified,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminFilter {
    #[serde(default, rename = "q")]
    pub search: String,
    #[serde(default)]
    pub status: StatusFilter,
}

impl AdminFilter {
    fn matches(&self, row: &RegistrationSummary) -> bool {
        self.status.admits(row) && self.matches_search(row)
    }

    fn matches_search(&self, row: &RegistrationSummary) -> bool {
        let term = self.search.trim();
        if term.is_empty() {
            return true;
        }
        let lowered = term.to_lowercase();
        row.name.to_lowercase().contains(&lowered)
            || row.email.to_lowercase().contains(&lowered)
            || row.ticket_id.to_lowercase().contains(&lowered)
            || row.phone.contains(term)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdminStats {
    pub total: usize,
    pub verified: usize,
    pub pending: usize,
    pub total_attendees: i64,
    pub total_amount: i64,
}

/// Last full fetch of the registration summary view. Filtering and stats
/// work on this snapshot; only `load_board` goes back to the database.
#[derive(Debug, Clone, Default)]
pub struct AdminBoard {
    rows: Vec<RegistrationSummary>,
    loaded: bool,
}

impl AdminBoard {
    pub fn new(rows: Vec<RegistrationSummary>) -> Self {
        Self { rows, loaded: true }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[RegistrationSummary] {
        &self.rows
    }

    pub fn stats(&self) -> AdminStats {
        let total = self.rows.len();
        let verified = self.rows.iter().filter(|r| r.payment_verified).count();
        AdminStats {
            total,
            verified,
            pending: total - verified,
            total_attendees: self.rows.iter().map(|r| r.total_attendees).sum(),
            total_amount: self.rows.iter().map(|r| r.amount_due).sum(),
        }
    }

    pub fn filtered(&self, filter: &AdminFilter) -> Vec<&RegistrationSummary> {
        self.rows.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Flags the row as verified in the snapshot. Returns false when the
    /// ticket is not on the board.
    pub fn mark_verified(&mut self, ticket_id: &str) -> bool {
        match self.rows.iter_mut().find(|r| r.ticket_id == ticket_id) {
            Some(row) => {
                row.payment_verified = true;
                true
            }
            None => false,
        }
    }

    /// CSV of the rows passing `filter`, one line per registration.
    pub fn export_csv(&self, filter: &AdminFilter) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(CSV_HEADER.join(","));
        for row in self.filtered(filter) {
            let fields = [
                row.ticket_id.clone(),
                row.name.clone(),
                row.email.clone(),
                row.phone.clone(),
                row.registration_type.clone(),
                row.total_attendees.to_string(),
                row.amount_due.to_string(),
                if row.payment_verified { "Yes" } else { "No" }.to_string(),
                calendar_date(&row.registration_date),
            ];
            lines.push(
                fields
                    .iter()
                    .map(|f| csv_field(f))
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }
        lines.join("\n")
    }
}

/// Fetches every summary row. Read failures are logged and show up as an
/// empty board.
pub async fn load_board(records: &dyn RecordStore) -> AdminBoard {
    match records.list_registration_summaries().await {
        Ok(rows) => {
            info!("Admin board loaded {} registrations", rows.len());
            AdminBoard::new(rows)
        }
        Err(e) => {
            warn!("Error fetching registrations: {}", e);
            AdminBoard::new(Vec::new())
        }
    }
}

/// Marks the payment verified on the board first, then in the database.
/// A failed remote update is returned to the caller for an alert; the board
/// keeps the optimistic value.
pub async fn verify_payment(
    board: &RwLock<AdminBoard>,
    records: &dyn RecordStore,
    ticket_id: &str,
) -> Result<(), PersistenceError> {
    let on_board = board.write().await.mark_verified(ticket_id);
    if !on_board {
        warn!("Verifying {} which is not on the admin board", ticket_id);
    }

    records.mark_payment_verified(ticket_id).await.map_err(|e| {
        warn!("Error verifying payment for {}: {}", ticket_id, e);
        e
    })?;
    info!("✅ Payment verified for {}", ticket_id);
    Ok(())
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("diwali-registrations-{}.csv", today.format("%Y-%m-%d"))
}

fn calendar_date(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| timestamp.chars().take(10).collect())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
