use serde::{Deserialize, Serialize};

/// Row of the `registration_summary` read view (registration joined with its
/// payment verification).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationSummary {
    pub ticket_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub registration_type: String,
    #[serde(default)]
    pub total_attendees: i64,
    #[serde(default)]
    pub amount_due: i64,
    #[serde(default)]
    pub payment_verified: bool,
    pub payment_screenshot_url: Option<String>,
    pub registration_date: String,
}
