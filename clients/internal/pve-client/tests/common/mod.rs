// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Shared harness for the integration tests: an in-memory transport that
//! records every wire request and replays canned responses, plus helpers
//! for building a client wired to it.

// Not every test binary uses every helper
#![allow(dead_code)]

use async_trait::async_trait;
use pve_client::{
    ApiToken, Args, PveClient, Transport, TransportError, WireRequest, WireResponse,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Everything worth asserting about one request that reached the wire.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<&'static str>,
    pub headers: http::HeaderMap,
}

impl RecordedRequest {
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(self.body.as_deref().unwrap_or_default()).into_owned()
    }
}

#[derive(Default)]
struct MockInner {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<VecDeque<WireResponse>>,
}

/// Transport double: pops queued responses in order, answering
/// `200 {"data":null}` once the queue runs dry.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, status: u16, body: &str) {
        if let Ok(mut responses) = self.inner.responses.lock() {
            responses.push_back(WireResponse {
                status,
                body: body.as_bytes().to_vec(),
            });
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner
            .requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.inner.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        if let Ok(mut requests) = self.inner.requests.lock() {
            requests.push(RecordedRequest {
                method: request.method.to_string(),
                url: request.url.to_string(),
                body: request.body.clone(),
                content_type: request.content_type,
                headers: request.headers.clone(),
            });
        }
        let queued = self
            .inner
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());
        Ok(queued.unwrap_or(WireResponse {
            status: 200,
            body: br#"{"data":null}"#.to_vec(),
        }))
    }
}

/// A client backed by `transport`, authenticated with a static token.
pub fn client_with(transport: MockTransport) -> PveClient {
    PveClient::builder()
        .host("pve.test")
        .transport(transport)
        .credentials(token())
        .build()
        .unwrap()
}

pub fn token() -> ApiToken {
    ApiToken::new("root@pam!ci", "12345678-abcd-4321-8765-1234567890ab").unwrap()
}

/// Shorthand for building an argument bag from a JSON object literal.
pub fn args(value: serde_json::Value) -> Args {
    value.as_object().cloned().unwrap_or_default()
}
