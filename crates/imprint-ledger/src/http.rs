//! # HTTP Relay Provider
//!
//! [`HttpNetworkProvider`] implements [`NetworkProvider`] against a relay
//! service that holds the signing key and talks to the execution network.
//!
//! ## Endpoints
//!
//! | Operation            | Request                                 |
//! |----------------------|-----------------------------------------|
//! | `account`            | `GET /account`                          |
//! | `submit_transaction` | `POST /transactions` (call JSON)        |
//! | `receipt`            | `GET /transactions/{hash}/receipt`      |
//! | `query`              | `POST /ledgers/{address}/query`         |
//!
//! ## Error mapping
//!
//! 4xx responses are [`ProviderError::Rejected`]; 5xx responses, transport
//! failures, and undecodable bodies are [`ProviderError::Unavailable`]. A
//! 404 on a receipt means the relay has not seen the transaction yet and
//! maps to [`ReceiptStatus::NotFound`].
//!
//! Submissions split `Unavailable` further. A request that never
//! connected, or a 5xx, is plain `Unavailable`. A request that timed out
//! after sending, or a 2xx whose body cannot be decoded, is
//! [`ProviderError::submission_unknown`]: the relay may hold the
//! transaction.
//!
//! ## Retry
//!
//! Reads retry transient failures under a [`RetryPolicy`]. Submissions are
//! sent exactly once.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use imprint_core::{AccountId, ContractCall, TransactionHandle};

use crate::config::{ConfigError, HttpProviderConfig};
use crate::provider::{LedgerQuery, NetworkProvider, ProviderError, QueryResponse, ReceiptStatus};
use crate::retry::{retry_transient, RetryPolicy};

#[derive(Debug, Serialize, Deserialize)]
struct AccountBody {
    account: AccountId,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubmitBody {
    transaction: TransactionHandle,
}

/// [`NetworkProvider`] backed by an HTTP relay.
#[derive(Debug, Clone)]
pub struct HttpNetworkProvider {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpNetworkProvider {
    /// Build a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the token cannot be sent as a header or
    /// the HTTP client cannot be built.
    pub fn new(config: HttpProviderConfig) -> Result<Self, ConfigError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ConfigError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy used for reads.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request, mapping transport failures and 5xx to `Unavailable`.
    async fn send(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<Response, ProviderError> {
        let resp = request
            .send()
            .await
            .map_err(|e| ProviderError::unavailable(format!("{operation}: {e}")))?;
        let status = resp.status();
        if status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::unavailable(format!(
                "{operation}: HTTP {status}: {body}"
            )));
        }
        Ok(resp)
    }

    /// Map 4xx to `Rejected` and decode a success body.
    async fn decode<T: serde::de::DeserializeOwned>(
        resp: Response,
        operation: &str,
    ) -> Result<T, ProviderError> {
        let status = resp.status();
        if status.is_client_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::rejected(format!(
                "{operation}: HTTP {status}: {body}"
            )));
        }
        resp.json().await.map_err(|e| {
            ProviderError::unavailable(format!("{operation}: response deserialization failed: {e}"))
        })
    }

    async fn fetch_account(&self) -> Result<AccountId, ProviderError> {
        let resp = self
            .send(self.client.get(self.url("/account")), "account")
            .await?;
        let body: AccountBody = Self::decode(resp, "account").await?;
        Ok(body.account)
    }

    async fn fetch_receipt(&self, tx: &TransactionHandle) -> Result<ReceiptStatus, ProviderError> {
        let url = self.url(&format!("/transactions/{}/receipt", tx.as_str()));
        let resp = self.send(self.client.get(url), "receipt").await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(ReceiptStatus::NotFound);
        }
        Self::decode(resp, "receipt").await
    }

    async fn run_query(
        &self,
        ledger: &AccountId,
        query: &LedgerQuery,
    ) -> Result<QueryResponse, ProviderError> {
        let url = self.url(&format!("/ledgers/{}/query", ledger.as_str()));
        let resp = self.send(self.client.post(url).json(query), "query").await?;
        Self::decode(resp, "query").await
    }
}

#[async_trait::async_trait]
impl NetworkProvider for HttpNetworkProvider {
    async fn account(&self) -> Result<AccountId, ProviderError> {
        retry_transient(self.retry, "account", || self.fetch_account()).await
    }

    async fn submit_transaction(
        &self,
        call: &ContractCall,
    ) -> Result<TransactionHandle, ProviderError> {
        const OPERATION: &str = "submit_transaction";
        let resp = self
            .client
            .post(self.url("/transactions"))
            .json(call)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_builder() {
                    ProviderError::unavailable(format!("{OPERATION}: {e}"))
                } else {
                    ProviderError::submission_unknown(format!("{OPERATION}: {e}"))
                }
            })?;
        let status = resp.status();
        if status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::unavailable(format!(
                "{OPERATION}: HTTP {status}: {body}"
            )));
        }
        if status.is_client_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::rejected(format!(
                "{OPERATION}: HTTP {status}: {body}"
            )));
        }
        let body: SubmitBody = resp.json().await.map_err(|e| {
            ProviderError::submission_unknown(format!(
                "{OPERATION}: response deserialization failed: {e}"
            ))
        })?;
        tracing::debug!(kind = %call.kind(), tx = %body.transaction, "relay accepted transaction");
        Ok(body.transaction)
    }

    async fn receipt(&self, tx: &TransactionHandle) -> Result<ReceiptStatus, ProviderError> {
        retry_transient(self.retry, "receipt", || self.fetch_receipt(tx)).await
    }

    async fn query(
        &self,
        ledger: &AccountId,
        query: &LedgerQuery,
    ) -> Result<QueryResponse, ProviderError> {
        retry_transient(self.retry, "query", || self.run_query(ledger, query)).await
    }

    fn provider_name(&self) -> &str {
        "HttpNetworkProvider"
    }
}
