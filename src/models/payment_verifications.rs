use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub ticket_id: String,
    pub payment_screenshot_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_reference: Option<String>,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl PaymentVerification {
    /// Fresh, unverified record for a just-uploaded screenshot.
    pub fn pending(ticket_id: &str, payment_screenshot_url: &str) -> Self {
        Self {
            id: None,
            ticket_id: ticket_id.to_string(),
            payment_screenshot_url: payment_screenshot_url.to_string(),
            upi_reference: None,
            verified: false,
            created_at: None,
        }
    }
}
