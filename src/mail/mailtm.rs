use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::domain::email::{MessageDetail, MessageSummary};
use crate::error::{Error, Result};
use crate::mail::provider::MailProvider;

/// JSON-LD collection wrapper used by every list endpoint.
#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(rename = "hydra:member", default = "Vec::new")]
    member: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct DomainEntry {
    domain: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Blocking client for a mail.tm-compatible API.
pub struct MailTmClient {
    http: Client,
    base: String,
}

impl MailTmClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid api_base_url '{base_url}': {e}")))?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tempmail_client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(&cfg.api_base_url, cfg.request_timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn send(&self, req: RequestBuilder, endpoint: &str) -> Result<Response> {
        let resp = req.header(ACCEPT, "application/ld+json").send()?;
        let status = resp.status();
        if !status.is_success() {
            log::debug!("{endpoint} -> {status}");
            return Err(Error::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }
}

impl MailProvider for MailTmClient {
    fn domains(&self) -> Result<Vec<String>> {
        let resp = self.send(self.http.get(self.url("/domains")), "/domains")?;
        let list: Collection<DomainEntry> = resp.json()?;
        Ok(list.member.into_iter().map(|d| d.domain).collect())
    }

    fn register(&self, address: &str, password: &str) -> Result<()> {
        let body = json!({ "address": address, "password": password });
        self.send(self.http.post(self.url("/accounts")).json(&body), "/accounts")?;
        Ok(())
    }

    fn token(&self, address: &str, password: &str) -> Result<String> {
        let body = json!({ "address": address, "password": password });
        let resp = self.send(self.http.post(self.url("/token")).json(&body), "/token")?;
        let t: TokenResponse = resp.json()?;
        Ok(t.token)
    }

    fn messages(&self, token: &str) -> Result<Vec<MessageSummary>> {
        let req = self.http.get(self.url("/messages")).bearer_auth(token);
        let list: Collection<MessageSummary> = self.send(req, "/messages")?.json()?;
        Ok(list.member)
    }

    fn message(&self, token: &str, id: &str) -> Result<MessageDetail> {
        let path = format!("/messages/{id}");
        let req = self.http.get(self.url(&path)).bearer_auth(token);
        Ok(self.send(req, &path)?.json()?)
    }

    fn mark_seen(&self, token: &str, id: &str) -> Result<()> {
        let path = format!("/messages/{id}");
        let body = serde_json::to_vec(&json!({ "seen": true }))?;
        let req = self
            .http
            .patch(self.url(&path))
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/merge-patch+json")
            .body(body);
        self.send(req, &path)?;
        Ok(())
    }
}
