//! Four-stage registration flow: details, payment, proof upload,
//! confirmation.
//!
//! The workflow value is plain data (it round-trips through the session
//! store between requests); every side effect goes through the collaborators
//! handed to the transition that needs them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::registrations::GROUP_MEMBER_COUNT;
use crate::models::{GroupMember, PaymentVerification, Registration, RegistrationType};
use crate::services::blob_service::{BlobError, BlobStore};
use crate::services::payment_uri_service;
use crate::services::records_service::{PersistenceError, RecordStore};
use crate::services::session_service::{SessionContext, SessionError};
use crate::services::ticket_cache_service::TicketCache;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill all required fields")]
    MissingFields(Vec<&'static str>),

    #[error("Please fill all group member details (all 3 members are required)")]
    IncompleteGroupMembers(Vec<usize>),

    #[error("Please enter dates as YYYY-MM-DD ({0})")]
    InvalidDate(String),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Please upload payment screenshot")]
    MissingScreenshot,

    #[error("Please upload an image file")]
    NotAnImage,

    #[error("cannot {action} while at the {stage} step")]
    IllegalTransition {
        action: &'static str,
        stage: &'static str,
    },

    #[error("screenshot upload failed: {0}")]
    Upload(#[from] BlobError),

    #[error("saving the registration failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl WorkflowError {
    /// Whether the error is the user's to fix (shown verbatim) rather than a
    /// backend failure (shown as a generic retry message).
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            WorkflowError::Validation(_)
                | WorkflowError::MissingScreenshot
                | WorkflowError::NotAnImage
                | WorkflowError::IllegalTransition { .. }
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
}

impl MemberDraft {
    fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.phone, &self.date_of_birth]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

/// Form fields as typed, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub parent_husband_mobile: String,
    pub registration_type: RegistrationType,
    pub group_members: [MemberDraft; GROUP_MEMBER_COUNT],
}

impl RegistrationDraft {
    pub fn amount(&self) -> u32 {
        self.registration_type.price()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("date_of_birth", &self.date_of_birth),
            ("parent_husband_mobile", &self.parent_husband_mobile),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(field, _)| field)
        .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        if self.registration_type == RegistrationType::Group {
            let incomplete: Vec<usize> = self
                .group_members
                .iter()
                .enumerate()
                .filter(|(_, m)| !m.is_complete())
                .map(|(i, _)| i)
                .collect();
            if !incomplete.is_empty() {
                return Err(ValidationError::IncompleteGroupMembers(incomplete));
            }
        }

        parse_date("date of birth", &self.date_of_birth)?;
        if self.registration_type == RegistrationType::Group {
            for (i, member) in self.group_members.iter().enumerate() {
                parse_date(&format!("member {} date of birth", i + 1), &member.date_of_birth)?;
            }
        }
        Ok(())
    }

    /// Record to persist for `ticket_id`. Members are attached only to group
    /// passes.
    pub fn build_registration(&self, ticket_id: &str) -> Result<Registration, ValidationError> {
        self.validate()?;

        let group_members = match self.registration_type {
            RegistrationType::Single => None,
            RegistrationType::Group => Some(
                self.group_members
                    .iter()
                    .enumerate()
                    .map(|(i, m)| {
                        Ok(GroupMember {
                            name: m.name.trim().to_string(),
                            email: m.email.trim().to_string(),
                            phone: m.phone.trim().to_string(),
                            date_of_birth: parse_date(
                                &format!("member {} date of birth", i + 1),
                                &m.date_of_birth,
                            )?,
                        })
                    })
                    .collect::<Result<Vec<_>, ValidationError>>()?,
            ),
        };

        Ok(Registration {
            id: None,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            date_of_birth: parse_date("date of birth", &self.date_of_birth)?,
            parent_husband_mobile: self.parent_husband_mobile.trim().to_string(),
            registration_type: self.registration_type,
            group_members,
            ticket_id: ticket_id.to_string(),
            created_at: None,
        })
    }
}

fn parse_date(label: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(label.to_string()))
}

/// The payment screenshot picked by the user. Kept across failed submissions
/// so a retry does not need a new upload from the browser.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    pub file_name: String,
    pub content_type: Option<String>,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Screenshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screenshot")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Details,
    Payment,
    ProofUpload {
        screenshot: Option<Screenshot>,
    },
    Confirmation {
        registration: Registration,
    },
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Details => "details",
            Stage::Payment => "payment",
            Stage::ProofUpload { .. } => "proof_upload",
            Stage::Confirmation { .. } => "confirmation",
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Stage::Details => 1,
            Stage::Payment => 2,
            Stage::ProofUpload { .. } => 3,
            Stage::Confirmation { .. } => 4,
        }
    }
}

/// What the payment step shows and hands off to the UPI app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub ticket_id: String,
    pub registration_type: RegistrationType,
    pub amount: u32,
    pub uri: String,
}

/// Collaborators touched by the final submission.
pub struct SubmissionServices<'a> {
    pub records: &'a dyn RecordStore,
    pub blobs: &'a dyn BlobStore,
    pub cache: &'a dyn TicketCache,
    pub session: &'a dyn SessionContext,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationWorkflow {
    draft: RegistrationDraft,
    stage: Stage,
}

impl RegistrationWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn amount(&self) -> u32 {
        self.draft.amount()
    }

    /// The form is only editable while at the details step.
    pub fn edit_details(&mut self) -> Result<&mut RegistrationDraft, WorkflowError> {
        match self.stage {
            Stage::Details => Ok(&mut self.draft),
            _ => Err(self.illegal("edit details")),
        }
    }

    /// Details -> Payment. Validation failures leave the workflow and the
    /// session untouched; only a passing form gets a ticket id.
    pub async fn submit_details(
        &mut self,
        session: &dyn SessionContext,
    ) -> Result<String, WorkflowError> {
        if self.stage != Stage::Details {
            return Err(self.illegal("submit details"));
        }
        self.draft.validate()?;

        let ticket_id = session.ticket_id_or_generate().await?;
        self.stage = Stage::Payment;
        info!(
            "Registration {} moved to payment ({})",
            ticket_id,
            self.draft.registration_type.as_str()
        );
        Ok(ticket_id)
    }

    /// Payment -> Details.
    pub fn back(&mut self) -> Result<(), WorkflowError> {
        match self.stage {
            Stage::Payment => {
                self.stage = Stage::Details;
                Ok(())
            }
            _ => Err(self.illegal("go back")),
        }
    }

    pub async fn payment_request(
        &self,
        session: &dyn SessionContext,
    ) -> Result<PaymentRequest, WorkflowError> {
        if self.stage != Stage::Payment {
            return Err(self.illegal("request payment"));
        }
        let ticket_id = session.ticket_id_or_generate().await?;
        let amount = self.amount();
        Ok(PaymentRequest {
            uri: payment_uri_service::build_payment_uri(amount, &ticket_id),
            ticket_id,
            registration_type: self.draft.registration_type,
            amount,
        })
    }

    /// URI to open in the payment app. Nothing comes back from it.
    pub async fn pay_now(&self, session: &dyn SessionContext) -> Result<String, WorkflowError> {
        Ok(self.payment_request(session).await?.uri)
    }

    /// Payment -> ProofUpload. Payment itself cannot be checked here.
    pub fn mark_paid(&mut self) -> Result<(), WorkflowError> {
        match self.stage {
            Stage::Payment => {
                self.stage = Stage::ProofUpload { screenshot: None };
                Ok(())
            }
            _ => Err(self.illegal("confirm payment")),
        }
    }

    pub fn attach_screenshot(&mut self, file: Screenshot) -> Result<(), WorkflowError> {
        let stage_name = self.stage.name();
        let Stage::ProofUpload { screenshot } = &mut self.stage else {
            return Err(WorkflowError::IllegalTransition {
                action: "attach a screenshot",
                stage: stage_name,
            });
        };
        if file.bytes.is_empty() {
            return Err(WorkflowError::MissingScreenshot);
        }
        if let Some(content_type) = file.content_type.as_deref() {
            if !content_type.starts_with("image/") {
                return Err(WorkflowError::NotAnImage);
            }
        }
        *screenshot = Some(file);
        Ok(())
    }

    /// ProofUpload -> Confirmation: upload, then registration, then payment
    /// verification, strictly in that order. On any failure the workflow stays
    /// at ProofUpload with the screenshot kept. A registration that was saved
    /// before a failing verification insert stays in the database.
    pub async fn submit_proof(
        &mut self,
        services: &SubmissionServices<'_>,
    ) -> Result<Registration, WorkflowError> {
        let screenshot = match &self.stage {
            Stage::ProofUpload {
                screenshot: Some(screenshot),
            } => screenshot,
            Stage::ProofUpload { screenshot: None } => {
                return Err(WorkflowError::MissingScreenshot)
            }
            _ => return Err(self.illegal("submit payment proof")),
        };

        let ticket_id = services.session.ticket_id_or_generate().await?;
        let registration = self.draft.build_registration(&ticket_id)?;

        let screenshot_url = services
            .blobs
            .upload(&screenshot.bytes, &screenshot.file_name, &ticket_id)
            .await
            .map_err(|e| {
                error!("Screenshot upload failed for {}: {}", ticket_id, e);
                e
            })?;

        let persisted = services
            .records
            .insert_registration(&registration)
            .await
            .map_err(|e| {
                error!("Registration insert failed for {}: {}", ticket_id, e);
                e
            })?;

        services
            .records
            .insert_payment_verification(&PaymentVerification::pending(
                &ticket_id,
                &screenshot_url,
            ))
            .await
            .map_err(|e| {
                error!(
                    "Payment verification insert failed for {}; registration row kept: {}",
                    ticket_id, e
                );
                e
            })?;

        // Remote rows are written; local bookkeeping failures only get logged.
        if let Err(e) = services.cache.append(&persisted).await {
            warn!("Could not cache ticket {} on this device: {}", ticket_id, e);
        }
        if let Err(e) = services.session.clear_ticket_id().await {
            warn!("Could not clear session ticket id {}: {}", ticket_id, e);
        }

        info!("🎉 Registration {} submitted, awaiting verification", ticket_id);
        self.stage = Stage::Confirmation {
            registration: persisted.clone(),
        };
        Ok(persisted)
    }

    /// Confirmation -> a blank Details form.
    pub fn start_over(&mut self) -> Result<(), WorkflowError> {
        match self.stage {
            Stage::Confirmation { .. } => {
                *self = Self::new();
                Ok(())
            }
            _ => Err(self.illegal("start over")),
        }
    }

    fn illegal(&self, action: &'static str) -> WorkflowError {
        WorkflowError::IllegalTransition {
            action,
            stage: self.stage.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{
        FailingBlobs, FakeBlobs, FakeRecords, MemorySession, MemoryTicketCache,
    };
    use crate::services::ticket_id_service::looks_like_ticket_id;

    fn filled_single() -> RegistrationDraft {
        RegistrationDraft {
            name: "Priya Sharma".into(),
            email: "priya@example.com".into(),
            phone: "9876543210".into(),
            date_of_birth: "1999-11-02".into(),
            parent_husband_mobile: "9876500000".into(),
            ..Default::default()
        }
    }

    fn member(n: usize) -> MemberDraft {
        MemberDraft {
            name: format!("Member {n}"),
            email: format!("m{n}@example.com"),
            phone: format!("900000000{n}"),
            date_of_birth: format!("2001-05-0{}", n + 1),
        }
    }

    fn filled_group() -> RegistrationDraft {
        RegistrationDraft {
            registration_type: RegistrationType::Group,
            group_members: [member(0), member(1), member(2)],
            ..filled_single()
        }
    }

    fn screenshot() -> Screenshot {
        Screenshot {
            file_name: "paid.png".into(),
            content_type: Some("image/png".into()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    async fn at_proof_upload(draft: RegistrationDraft, session: &MemorySession) -> RegistrationWorkflow {
        let mut wf = RegistrationWorkflow::new();
        *wf.edit_details().unwrap() = draft;
        wf.submit_details(session).await.unwrap();
        wf.mark_paid().unwrap();
        wf.attach_screenshot(screenshot()).unwrap();
        wf
    }

    #[test]
    fn amount_follows_category_only() {
        let mut draft = filled_single();
        assert_eq!(draft.amount(), 500);
        draft.group_members = [member(0), member(1), member(2)];
        assert_eq!(draft.amount(), 500);

        draft.registration_type = RegistrationType::Group;
        draft.group_members = Default::default();
        assert_eq!(draft.amount(), 1600);
    }

    #[test]
    fn missing_primary_fields_are_listed() {
        let draft = RegistrationDraft {
            email: "   ".into(),
            ..filled_single()
        };
        assert_eq!(
            draft.validate(),
            Err(ValidationError::MissingFields(vec!["email"]))
        );
    }

    #[test]
    fn single_pass_ignores_member_slots() {
        let reg = filled_single().build_registration("DW2025123456ABCD").unwrap();
        assert_eq!(reg.registration_type, RegistrationType::Single);
        assert!(reg.group_members.is_none());
        assert_eq!(reg.ticket_id, "DW2025123456ABCD");
    }

    #[test]
    fn group_pass_carries_three_members() {
        let reg = filled_group().build_registration("DW2025123456ABCD").unwrap();
        assert_eq!(reg.members().len(), 3);
        assert_eq!(reg.members()[2].name, "Member 2");
    }

    #[test]
    fn rejects_unparseable_dates() {
        let draft = RegistrationDraft {
            date_of_birth: "02/11/1999".into(),
            ..filled_single()
        };
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[tokio::test]
    async fn incomplete_group_member_blocks_payment_and_mints_nothing() {
        let session = MemorySession::default();
        let mut draft = filled_group();
        draft.group_members[1].phone.clear();

        let mut wf = RegistrationWorkflow::new();
        *wf.edit_details().unwrap() = draft;

        let err = wf.submit_details(&session).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::IncompleteGroupMembers(ref idx)) if idx == &vec![1]
        ));
        assert_eq!(wf.stage(), &Stage::Details);
        assert!(session.ticket_id().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ticket_id_survives_back_and_forth() {
        let session = MemorySession::default();
        let mut wf = RegistrationWorkflow::new();
        *wf.edit_details().unwrap() = filled_single();

        let first = wf.submit_details(&session).await.unwrap();
        assert!(looks_like_ticket_id(&first));
        let request = wf.payment_request(&session).await.unwrap();
        assert_eq!(request.ticket_id, first);
        assert_eq!(request.amount, 500);

        wf.back().unwrap();
        wf.edit_details().unwrap().registration_type = RegistrationType::Group;
        wf.edit_details().unwrap().group_members = [member(0), member(1), member(2)];
        let second = wf.submit_details(&session).await.unwrap();
        assert_eq!(first, second);

        let uri = wf.pay_now(&session).await.unwrap();
        assert!(uri.contains("am=1600"));
        assert!(uri.contains(&first));
    }

    #[tokio::test]
    async fn illegal_transitions_change_nothing() {
        let session = MemorySession::default();
        let mut wf = RegistrationWorkflow::new();

        assert!(matches!(
            wf.mark_paid(),
            Err(WorkflowError::IllegalTransition { stage: "details", .. })
        ));
        assert!(wf.back().is_err());
        assert!(wf.attach_screenshot(screenshot()).is_err());
        assert!(wf.payment_request(&session).await.is_err());
        assert!(wf.start_over().is_err());
        assert_eq!(wf, RegistrationWorkflow::new());

        *wf.edit_details().unwrap() = filled_single();
        wf.submit_details(&session).await.unwrap();
        assert!(wf.edit_details().is_err());
        wf.mark_paid().unwrap();
        assert!(wf.back().is_err());
    }

    #[tokio::test]
    async fn proof_requires_a_file() {
        let session = MemorySession::default();
        let mut wf = RegistrationWorkflow::new();
        *wf.edit_details().unwrap() = filled_single();
        wf.submit_details(&session).await.unwrap();
        wf.mark_paid().unwrap();

        let records = FakeRecords::default();
        let blobs = FakeBlobs::default();
        let cache = MemoryTicketCache::default();
        let services = SubmissionServices {
            records: &records,
            blobs: &blobs,
            cache: &cache,
            session: &session,
        };
        assert!(matches!(
            wf.submit_proof(&services).await,
            Err(WorkflowError::MissingScreenshot)
        ));
        assert!(blobs.uploads().is_empty());

        let not_image = Screenshot {
            content_type: Some("application/pdf".into()),
            ..screenshot()
        };
        assert!(matches!(
            wf.attach_screenshot(not_image),
            Err(WorkflowError::NotAnImage)
        ));
    }

    #[tokio::test]
    async fn successful_submission_reaches_confirmation() {
        let session = MemorySession::default();
        let mut wf = at_proof_upload(filled_group(), &session).await;
        let ticket_id = session.ticket_id().await.unwrap().unwrap();

        let records = FakeRecords::default();
        let blobs = FakeBlobs::default();
        let cache = MemoryTicketCache::default();
        let before = cache.read_all().await.unwrap().len();

        let services = SubmissionServices {
            records: &records,
            blobs: &blobs,
            cache: &cache,
            session: &session,
        };
        let confirmed = wf.submit_proof(&services).await.unwrap();

        assert_eq!(confirmed.ticket_id, ticket_id);
        assert!(session.ticket_id().await.unwrap().is_none());
        assert_eq!(cache.read_all().await.unwrap().len(), before + 1);
        assert_eq!(blobs.uploads(), vec![ticket_id.clone()]);

        let regs = records.registrations();
        let verifications = records.verifications();
        assert_eq!(regs.len(), 1);
        assert_eq!(regs[0].ticket_id, ticket_id);
        assert_eq!(verifications.len(), 1);
        assert_eq!(verifications[0].ticket_id, ticket_id);
        assert!(!verifications[0].verified);
        assert_eq!(
            verifications[0].payment_screenshot_url,
            format!("https://blobs.test/{ticket_id}.png")
        );

        match wf.stage() {
            Stage::Confirmation { registration } => {
                assert_eq!(registration.ticket_id, ticket_id);
                assert!(registration.id.is_some());
            }
            other => panic!("unexpected stage {other:?}"),
        }
    }

    #[tokio::test]
    async fn failing_verification_insert_keeps_user_at_upload() {
        let session = MemorySession::default();
        let mut wf = at_proof_upload(filled_single(), &session).await;
        let ticket_id = session.ticket_id().await.unwrap().unwrap();

        let records = FakeRecords::failing_verifications();
        let blobs = FakeBlobs::default();
        let cache = MemoryTicketCache::default();
        let services = SubmissionServices {
            records: &records,
            blobs: &blobs,
            cache: &cache,
            session: &session,
        };

        let err = wf.submit_proof(&services).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Persistence(_)));
        assert!(!err.is_user_facing());

        assert!(matches!(
            wf.stage(),
            Stage::ProofUpload { screenshot: Some(s) } if s == &screenshot()
        ));
        assert!(cache.read_all().await.unwrap().is_empty());
        // The orphaned registration stays.
        assert_eq!(records.registrations().len(), 1);
        assert_eq!(session.ticket_id().await.unwrap(), Some(ticket_id));
    }

    #[tokio::test]
    async fn failing_upload_persists_nothing() {
        let session = MemorySession::default();
        let mut wf = at_proof_upload(filled_single(), &session).await;

        let records = FakeRecords::default();
        let cache = MemoryTicketCache::default();
        let services = SubmissionServices {
            records: &records,
            blobs: &FailingBlobs,
            cache: &cache,
            session: &session,
        };

        assert!(matches!(
            wf.submit_proof(&services).await,
            Err(WorkflowError::Upload(_))
        ));
        assert!(records.registrations().is_empty());
        assert!(matches!(wf.stage(), Stage::ProofUpload { screenshot: Some(_) }));
    }

    #[tokio::test]
    async fn start_over_resets_the_form() {
        let session = MemorySession::default();
        let mut wf = at_proof_upload(filled_group(), &session).await;
        let records = FakeRecords::default();
        let blobs = FakeBlobs::default();
        let cache = MemoryTicketCache::default();
        let services = SubmissionServices {
            records: &records,
            blobs: &blobs,
            cache: &cache,
            session: &session,
        };
        wf.submit_proof(&services).await.unwrap();

        wf.start_over().unwrap();
        assert_eq!(wf.stage(), &Stage::Details);
        assert_eq!(wf.draft(), &RegistrationDraft::default());
        assert_eq!(wf.draft().registration_type, RegistrationType::Single);
        assert_eq!(wf.draft().group_members.len(), 3);
    }

    #[test]
    fn workflow_round_trips_through_session_json() {
        let mut wf = RegistrationWorkflow::new();
        *wf.edit_details().unwrap() = filled_single();
        wf.stage = Stage::ProofUpload {
            screenshot: Some(screenshot()),
        };

        let json = serde_json::to_string(&wf).unwrap();
        assert!(json.contains("\"stage\":\"proof_upload\""));
        let back: RegistrationWorkflow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wf);
    }
}
