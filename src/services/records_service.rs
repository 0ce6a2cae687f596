use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::RecordsConfig;
use crate::models::{PaymentVerification, Registration, RegistrationSummary};

pub const REGISTRATIONS: &str = "registrations";
pub const PAYMENT_VERIFICATIONS: &str = "payment_verifications";
pub const REGISTRATION_SUMMARY: &str = "registration_summary";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{collection} rejected the request with {status}: {body}")]
    Rejected {
        collection: String,
        status: StatusCode,
        body: String,
    },

    #[error("{collection} returned an unreadable body: {source}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{collection} returned no record")]
    EmptyRepresentation { collection: String },
}

/// Remote record collections backing registrations and their payment proofs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_registration(
        &self,
        registration: &Registration,
    ) -> Result<Registration, PersistenceError>;

    async fn insert_payment_verification(
        &self,
        verification: &PaymentVerification,
    ) -> Result<PaymentVerification, PersistenceError>;

    async fn mark_payment_verified(&self, ticket_id: &str) -> Result<(), PersistenceError>;

    /// All summary rows, newest registration first.
    async fn list_registration_summaries(
        &self,
    ) -> Result<Vec<RegistrationSummary>, PersistenceError>;
}

/// PostgREST-style client for the hosted database.
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    client: reqwest::Client,
    config: RecordsConfig,
}

impl RestRecordStore {
    pub fn new(config: RecordsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            collection
        )
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.config.anon_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.config.anon_key)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    async fn insert<T>(&self, collection: &str, record: &T) -> Result<T, PersistenceError>
    where
        T: Serialize + DeserializeOwned + Sync,
    {
        let url = self.collection_url(collection);
        let resp = self
            .client
            .post(&url)
            .headers(self.headers())
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await
            .map_err(|source| transport(&url, source))?;

        let rows: Vec<T> = read_json(collection, &url, resp).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PersistenceError::EmptyRepresentation {
                collection: collection.to_string(),
            })
    }

    async fn update(
        &self,
        collection: &str,
        column: &str,
        value: &str,
        patch: &Value,
    ) -> Result<(), PersistenceError> {
        let url = self.collection_url(collection);
        let filter = format!("eq.{}", value);
        let resp = self
            .client
            .patch(&url)
            .headers(self.headers())
            .query(&[(column, filter.as_str())])
            .json(patch)
            .send()
            .await
            .map_err(|source| transport(&url, source))?;

        ensure_success(collection, resp).await?;
        Ok(())
    }

    async fn select_all<T: DeserializeOwned>(
        &self,
        view: &str,
        order_by: &str,
    ) -> Result<Vec<T>, PersistenceError> {
        let url = self.collection_url(view);
        let resp = self
            .client
            .get(&url)
            .headers(self.headers())
            .query(&[("select", "*"), ("order", order_by)])
            .send()
            .await
            .map_err(|source| transport(&url, source))?;

        read_json(view, &url, resp).await
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn insert_registration(
        &self,
        registration: &Registration,
    ) -> Result<Registration, PersistenceError> {
        self.insert(REGISTRATIONS, registration).await
    }

    async fn insert_payment_verification(
        &self,
        verification: &PaymentVerification,
    ) -> Result<PaymentVerification, PersistenceError> {
        self.insert(PAYMENT_VERIFICATIONS, verification).await
    }

    async fn mark_payment_verified(&self, ticket_id: &str) -> Result<(), PersistenceError> {
        self.update(
            PAYMENT_VERIFICATIONS,
            "ticket_id",
            ticket_id,
            &json!({ "verified": true }),
        )
        .await
    }

    async fn list_registration_summaries(
        &self,
    ) -> Result<Vec<RegistrationSummary>, PersistenceError> {
        self.select_all(REGISTRATION_SUMMARY, "registration_date.desc")
            .await
    }
}

fn transport(url: &str, source: reqwest::Error) -> PersistenceError {
    PersistenceError::Transport {
        url: url.to_string(),
        source,
    }
}

async fn ensure_success(
    collection: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, PersistenceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(PersistenceError::Rejected {
        collection: collection.to_string(),
        status,
        body,
    })
}

async fn read_json<T: DeserializeOwned>(
    collection: &str,
    url: &str,
    resp: reqwest::Response,
) -> Result<T, PersistenceError> {
    let resp = ensure_success(collection, resp).await?;
    let body = resp.text().await.map_err(|source| transport(url, source))?;
    decode_body(collection, &body)
}

fn decode_body<T: DeserializeOwned>(collection: &str, body: &str) -> Result<T, PersistenceError> {
    serde_json::from_str(body).map_err(|source| PersistenceError::Decode {
        collection: collection.to_string(),
        source,
    })
}
