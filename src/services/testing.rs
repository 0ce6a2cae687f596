//! In-memory collaborators for exercising the workflow and admin board.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::models::{PaymentVerification, Registration, RegistrationSummary};
use crate::services::blob_service::{BlobError, BlobStore};
use crate::services::records_service::{PersistenceError, RecordStore};
use crate::services::session_service::{SessionContext, SessionError};
use crate::services::ticket_cache_service::{CacheError, TicketCache};

#[derive(Default)]
pub struct MemorySession {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SessionContext for MemorySession {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn claim(&self, key: &str, value: &str) -> Result<bool, SessionError> {
        let mut values = self.values.lock().unwrap();
        if values.contains_key(key) {
            return Ok(false);
        }
        values.insert(key.to_string(), value.to_string());
        Ok(true)
    }
}

#[derive(Default)]
pub struct MemoryTicketCache {
    tickets: Mutex<Vec<Registration>>,
}

#[async_trait]
impl TicketCache for MemoryTicketCache {
    async fn append(&self, registration: &Registration) -> Result<(), CacheError> {
        self.tickets.lock().unwrap().push(registration.clone());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Registration>, CacheError> {
        Ok(self.tickets.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeBlobs {
    uploads: Mutex<Vec<String>>,
}

impl FakeBlobs {
    /// Ticket ids uploads were keyed by, in call order.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for FakeBlobs {
    async fn upload(
        &self,
        _bytes: &[u8],
        _file_name: &str,
        ticket_id: &str,
    ) -> Result<String, BlobError> {
        self.uploads.lock().unwrap().push(ticket_id.to_string());
        Ok(format!("https://blobs.test/{ticket_id}.png"))
    }
}

pub struct FailingBlobs;

#[async_trait]
impl BlobStore for FailingBlobs {
    async fn upload(
        &self,
        _bytes: &[u8],
        _file_name: &str,
        ticket_id: &str,
    ) -> Result<String, BlobError> {
        Err(BlobError::Rejected {
            path: format!("payment-screenshots/{ticket_id}"),
            status: StatusCode::BAD_GATEWAY,
            body: "unavailable".into(),
        })
    }
}

#[derive(Default)]
pub struct FakeRecords {
    fail_verifications: bool,
    fail_updates: bool,
    fail_reads: bool,
    registrations: Mutex<Vec<Registration>>,
    verifications: Mutex<Vec<PaymentVerification>>,
    summaries: Mutex<Vec<RegistrationSummary>>,
    verified_updates: Mutex<Vec<String>>,
    reads: Mutex<usize>,
}

impl FakeRecords {
    pub fn failing_verifications() -> Self {
        Self {
            fail_verifications: true,
            ..Default::default()
        }
    }

    pub fn with_summaries(rows: Vec<RegistrationSummary>) -> Self {
        Self {
            summaries: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn registrations(&self) -> Vec<Registration> {
        self.registrations.lock().unwrap().clone()
    }

    pub fn verifications(&self) -> Vec<PaymentVerification> {
        self.verifications.lock().unwrap().clone()
    }

    pub fn verified_updates(&self) -> Vec<String> {
        self.verified_updates.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }

    fn rejected(collection: &str) -> PersistenceError {
        PersistenceError::Rejected {
            collection: collection.to_string(),
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "down".into(),
        }
    }
}

#[async_trait]
impl RecordStore for FakeRecords {
    async fn insert_registration(
        &self,
        registration: &Registration,
    ) -> Result<Registration, PersistenceError> {
        let mut rows = self.registrations.lock().unwrap();
        let mut saved = registration.clone();
        saved.id = Some(format!("reg-{}", rows.len() + 1));
        saved.created_at = Some("2025-10-12T10:00:00+00:00".into());
        rows.push(saved.clone());
        Ok(saved)
    }

    async fn insert_payment_verification(
        &self,
        verification: &PaymentVerification,
    ) -> Result<PaymentVerification, PersistenceError> {
        if self.fail_verifications {
            return Err(Self::rejected("payment_verifications"));
        }
        self.verifications
            .lock()
            .unwrap()
            .push(verification.clone());
        Ok(verification.clone())
    }

    async fn mark_payment_verified(&self, ticket_id: &str) -> Result<(), PersistenceError> {
        self.verified_updates
            .lock()
            .unwrap()
            .push(ticket_id.to_string());
        if self.fail_updates {
            return Err(Self::rejected("payment_verifications"));
        }
        Ok(())
    }

    async fn list_registration_summaries(
        &self,
    ) -> Result<Vec<RegistrationSummary>, PersistenceError> {
        *self.reads.lock().unwrap() += 1;
        if self.fail_reads {
            return Err(Self::rejected("registration_summary"));
        }
        Ok(self.summaries.lock().unwrap().clone())
    }
}

pub fn summary(ticket_id: &str, name: &str, verified: bool, group: bool) -> RegistrationSummary {
    RegistrationSummary {
        ticket_id: ticket_id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        phone: format!("98000{}", &ticket_id[6..12]),
        registration_type: if group { "GROUP" } else { "SINGLE" }.to_string(),
        total_attendees: if group { 4 } else { 1 },
        amount_due: if group { 1600 } else { 500 },
        payment_verified: verified,
        payment_screenshot_url: Some(format!("https://blobs.test/{ticket_id}.png")),
        registration_date: "2025-10-12T10:00:00+00:00".to_string(),
    }
}
