// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Credential providers.
//!
//! The engine treats a credential as the set of headers to attach to a
//! call. Two providers cover the Proxmox VE schemes:
//!
//! - [`ApiToken`]: a static `PVEAPIToken=USER@REALM!TOKENID=SECRET`
//!   Authorization header. No server round-trip, no CSRF token needed.
//! - [`TicketSession`]: username/password login against
//!   `/access/ticket`, caching the returned `PVEAuthCookie` ticket and
//!   `CSRFPreventionToken` for subsequent calls.
//!
//! Neither provider re-authenticates behind the caller's back: a 401 on a
//! stale ticket surfaces as a remote error, and the caller decides whether
//! to [`TicketSession::invalidate`] and try again. Automatic re-login
//! would be a hidden retry, which this engine never does.

use crate::error::Error;
use crate::transport::{Transport, WireRequest};
use async_trait::async_trait;
use http::header::{AUTHORIZATION, COOKIE};
use http::{HeaderMap, HeaderValue, Method};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tokio::sync::RwLock;
use url::Url;

pub(crate) const CSRF_HEADER: &str = "CSRFPreventionToken";

/// Supplies the headers that authenticate one call.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Headers to attach. `transport` and `base` are available for
    /// providers that need a server round-trip to mint a credential.
    async fn headers(&self, transport: &dyn Transport, base: &Url) -> Result<HeaderMap, Error>;
}

static TOKEN_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@!\s]+@[^@!\s]+![^@!\s]+$").ok());

static TOKEN_SECRET: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").ok()
});

/// Static API-token credential.
pub struct ApiToken {
    header: HeaderValue,
}

impl ApiToken {
    /// Build from a token id (`USER@REALM!TOKENID`) and its secret (a
    /// lowercase UUID). Both shapes are checked here, at construction,
    /// so a mistyped credential fails before the first call.
    pub fn new(token_id: &str, secret: &str) -> Result<Self, Error> {
        if !TOKEN_ID.as_ref().is_some_and(|re| re.is_match(token_id)) {
            return Err(Error::Credential(
                "token id must look like USER@REALM!TOKENID".to_string(),
            ));
        }
        if !TOKEN_SECRET.as_ref().is_some_and(|re| re.is_match(secret)) {
            return Err(Error::Credential(
                "token secret must be a lowercase UUID".to_string(),
            ));
        }
        let header = HeaderValue::from_str(&format!("PVEAPIToken={token_id}={secret}"))
            .map_err(|e| Error::Credential(e.to_string()))?;
        Ok(Self { header })
    }
}

#[async_trait]
impl CredentialProvider for ApiToken {
    async fn headers(&self, _transport: &dyn Transport, _base: &Url) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.header.clone());
        Ok(headers)
    }
}

#[derive(Clone)]
struct Ticket {
    cookie: HeaderValue,
    csrf: HeaderValue,
}

#[derive(Deserialize)]
struct TicketEnvelope {
    data: TicketData,
}

#[derive(Deserialize)]
struct TicketData {
    ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    csrf_prevention_token: String,
}

/// Username/password credential backed by a cached login ticket.
pub struct TicketSession {
    username: String,
    password: String,
    cached: RwLock<Option<Ticket>>,
}

impl TicketSession {
    /// `username` includes the realm, e.g. `root@pam` or `monitor@pve`.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            cached: RwLock::new(None),
        }
    }

    /// Drop the cached ticket so the next call logs in again. The caller
    /// invokes this after a 401 on a long-lived session; the provider
    /// never does it implicitly.
    pub async fn invalidate(&self) {
        self.cached.write().await.take();
    }

    async fn login(&self, transport: &dyn Transport, base: &Url) -> Result<Ticket, Error> {
        let mut url = base.clone();
        url.set_path("/api2/json/access/ticket");

        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", &self.username)
            .append_pair("password", &self.password)
            .finish()
            .into_bytes();

        let response = transport
            .execute(WireRequest {
                method: Method::POST,
                url,
                headers: HeaderMap::new(),
                body: Some(body),
                content_type: Some("application/x-www-form-urlencoded"),
            })
            .await?;

        if response.status != 200 {
            return Err(Error::Credential(format!(
                "login for {:?} failed with status {}",
                self.username, response.status
            )));
        }

        let envelope: TicketEnvelope = serde_json::from_slice(&response.body)
            .map_err(|e| Error::Credential(format!("malformed ticket response: {e}")))?;

        let cookie =
            HeaderValue::from_str(&format!("PVEAuthCookie={}", envelope.data.ticket))
                .map_err(|e| Error::Credential(e.to_string()))?;
        let csrf = HeaderValue::from_str(&envelope.data.csrf_prevention_token)
            .map_err(|e| Error::Credential(e.to_string()))?;
        Ok(Ticket { cookie, csrf })
    }
}

#[async_trait]
impl CredentialProvider for TicketSession {
    async fn headers(&self, transport: &dyn Transport, base: &Url) -> Result<HeaderMap, Error> {
        let cached = self.cached.read().await.clone();
        let ticket = match cached {
            Some(ticket) => ticket,
            None => {
                let ticket = self.login(transport, base).await?;
                tracing::debug!(username = %self.username, "acquired PVE login ticket");
                *self.cached.write().await = Some(ticket.clone());
                ticket
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, ticket.cookie);
        headers.insert(CSRF_HEADER, ticket.csrf);
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_token_shape_is_checked_at_construction() {
        assert!(ApiToken::new(
            "monitor@pve!readonly",
            "12345678-1234-1234-1234-1234567890ab"
        )
        .is_ok());

        // Missing the !TOKENID part.
        assert!(matches!(
            ApiToken::new("monitor@pve", "12345678-1234-1234-1234-1234567890ab"),
            Err(Error::Credential(_))
        ));

        // Uppercase secret is rejected; PVE mints lowercase UUIDs.
        assert!(matches!(
            ApiToken::new("monitor@pve!readonly", "12345678-1234-1234-1234-1234567890AB"),
            Err(Error::Credential(_))
        ));
    }

    #[tokio::test]
    async fn api_token_produces_an_authorization_header() {
        struct NoTransport;
        #[async_trait]
        impl Transport for NoTransport {
            async fn execute(
                &self,
                _request: WireRequest,
            ) -> Result<crate::transport::WireResponse, crate::transport::TransportError>
            {
                Err(crate::transport::TransportError::InvalidRequest(
                    "unexpected network use".to_string(),
                ))
            }
        }

        let token =
            ApiToken::new("monitor@pve!readonly", "12345678-1234-1234-1234-1234567890ab")
                .unwrap();
        let base = Url::parse("https://pve1.example.com:8006").unwrap();
        let headers = token.headers(&NoTransport, &base).await.unwrap();
        assert_eq!(
            headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("PVEAPIToken=monitor@pve!readonly=12345678-1234-1234-1234-1234567890ab")
        );
    }
}
