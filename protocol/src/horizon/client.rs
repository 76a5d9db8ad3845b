//! HTTP implementation of [`Horizon`] on top of `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info, warn, Span};

use super::types::{AccountRecord, Accepted, NetworkInfo, Rejection};
use super::Horizon;
use crate::config::ClientConfig;
use crate::crypto::keys::PublicKey;
use crate::error::{Error, Result};

/// Client for one network API endpoint.
///
/// Every request carries the bounded timeout from [`ClientConfig`]; a dead
/// endpoint surfaces as [`Error::NetworkUnreachable`] instead of a hang.
#[derive(Debug, Clone)]
pub struct HorizonClient {
    http: reqwest::Client,
    base_url: String,
    span: Span,
}

impl HorizonClient {
    /// Builds a client after validating `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.horizon_url.trim().trim_end_matches('/').to_string();
        let http = build_http(config.timeout).map_err(|e| Error::NetworkUnreachable {
            url: base_url.clone(),
            source: Box::new(e),
        })?;
        let span = tracing::info_span!("horizon", url = %base_url);
        Ok(Self {
            http,
            base_url,
            span,
        })
    }

    /// Replaces the diagnostic span every event of this client is parented to.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn unreachable(&self, url: &str, e: reqwest::Error) -> Error {
        warn!(parent: &self.span, url, error = %e, "network API unreachable");
        Error::NetworkUnreachable {
            url: url.to_string(),
            source: Box::new(e),
        }
    }

    /// GET `url`, returning status and body text.
    async fn get(&self, url: &str) -> Result<(StatusCode, String)> {
        debug!(parent: &self.span, url, "GET");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.unreachable(url, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.unreachable(url, e))?;
        Ok((status, body))
    }
}

fn build_http(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

fn parse_json<T: serde::de::DeserializeOwned>(
    url: &str,
    status: StatusCode,
    body: String,
) -> Result<T> {
    serde_json::from_str(&body).map_err(|e| Error::UnexpectedResponse {
        url: url.to_string(),
        status: status.as_u16(),
        body: format!("{e}: {body}"),
    })
}

#[async_trait]
impl Horizon for HorizonClient {
    async fn network_info(&self) -> Result<NetworkInfo> {
        let url = self.endpoint("");
        let (status, body) = self.get(&url).await?;
        if !status.is_success() {
            return Err(Error::UnexpectedResponse {
                url,
                status: status.as_u16(),
                body,
            });
        }
        parse_json(&url, status, body)
    }

    async fn account(&self, account: &PublicKey) -> Result<AccountRecord> {
        let url = self.endpoint(&format!("accounts/{account}"));
        let (status, body) = self.get(&url).await?;
        if status == StatusCode::NOT_FOUND {
            debug!(parent: &self.span, account = %account, "account not found");
            return Err(Error::AccountNotFound {
                account: account.address(),
            });
        }
        if !status.is_success() {
            return Err(Error::UnexpectedResponse {
                url,
                status: status.as_u16(),
                body,
            });
        }
        parse_json(&url, status, body)
    }

    async fn submit(&self, envelope_base64: &str) -> Result<Accepted> {
        let url = self.endpoint("transactions");
        debug!(parent: &self.span, url = %url, "POST transaction");
        let resp = self
            .http
            .post(&url)
            .form(&[("tx", envelope_base64)])
            .send()
            .await
            .map_err(|e| self.unreachable(&url, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.unreachable(&url, e))?;

        if status.is_success() {
            let accepted: Accepted = parse_json(&url, status, body)?;
            info!(
                parent: &self.span,
                ledger = accepted.ledger,
                hash = %accepted.hash,
                "transaction accepted"
            );
            return Ok(accepted);
        }

        let rejection = Rejection::from_body(status.as_u16(), &body);
        warn!(parent: &self.span, %rejection, "transaction rejected");
        Err(Error::SubmissionRejected(rejection))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
