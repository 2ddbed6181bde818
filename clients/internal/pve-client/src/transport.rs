// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! The external transport collaborator.
//!
//! The engine hands a fully assembled [`WireRequest`] to a [`Transport`]
//! and gets back a status code plus raw payload. That is the whole
//! contract: TLS negotiation, connection pooling, and timeouts live behind
//! this trait, and the engine performs exactly one exchange per call.
//! Tests substitute a recording implementation; production uses
//! [`HttpTransport`] over reqwest.

use async_trait::async_trait;
use http::{HeaderMap, Method};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default per-request timeout, matching the Proxmox server's own 60s
/// worker limit.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("pve-client/", env!("CARGO_PKG_VERSION"));

/// A failure of the transport itself (connection refused, timeout, TLS),
/// as opposed to a completed exchange the remote answered with an error
/// status. Never retried by the engine.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request could not be assembled into something sendable
    #[error("unsendable request: {0}")]
    InvalidRequest(String),
}

/// One fully assembled exchange: method, absolute URL, headers (credential
/// included), and an optional serialized body.
#[derive(Debug)]
pub struct WireRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<&'static str>,
}

/// The raw outcome of an exchange. Status interpretation happens in the
/// executor, not here.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

/// Production transport over a shared reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        // reqwest is built with `rustls-no-provider`; the process needs a
        // crypto provider before the first TLS handshake. Installing twice
        // is fine, the second call is a no-op failure.
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an externally configured client (custom TLS roots, proxies,
    /// connection limits)
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            if let Some(content_type) = request.content_type {
                builder = builder.header(http::header::CONTENT_TYPE, content_type);
            }
            builder = builder.body(body);
        }
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(WireResponse { status, body })
    }
}
