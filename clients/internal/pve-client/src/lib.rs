// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Proxmox VE API Client Runtime
//!
//! This client provides schema-driven access to the Proxmox VE REST API.
//! Instead of one generated method per endpoint, the API surface is a
//! navigable tree mirroring the URL space: literal children are reached
//! with `child`, parameterized segments with `at`, and the verbs declared
//! at the reached node perform the call. Every argument is validated
//! against the schema's per-field constraints before anything touches the
//! network.
//!
//! ## Usage
//!
//! ### API-token credential (recommended)
//!
//! ```ignore
//! use pve_client::{ApiToken, Args, PveClient};
//! use serde_json::json;
//!
//! let token = ApiToken::new(
//!     "monitor@pve!readonly",
//!     "12345678-1234-1234-1234-1234567890ab",
//! )?;
//! let client = PveClient::builder()
//!     .host("pve1.example.com")
//!     .credentials(token)
//!     .build()?;
//!
//! // GET /nodes/pve1/qemu/100/status/current
//! let status = client
//!     .root()
//!     .child("nodes")?
//!     .at("pve1")?
//!     .child("qemu")?
//!     .at(100)?
//!     .child("status")?
//!     .child("current")?
//!     .get(Args::new())
//!     .await?;
//! println!("{:?}", status.field("status"));
//! ```
//!
//! ### Username/password session
//!
//! ```ignore
//! use pve_client::{PveClient, TicketSession};
//!
//! let client = PveClient::builder()
//!     .host("pve1.example.com")
//!     .credentials(TicketSession::new("root@pam", "secret"))
//!     .build()?;
//! ```
//!
//! The client is cheap to share: the resource tree is built once and
//! read-only, navigation is purely local, and each call carries its own
//! state. Retry, backoff, and caching are deliberately absent -- several
//! endpoints here (create, destroy, migrate) are not safely idempotent,
//! so those policies belong to the caller.

pub mod auth;
pub mod catalog;
pub mod decode;
pub mod error;
pub mod navigate;
pub mod transport;

mod executor;
mod resolve;

pub use auth::{ApiToken, CredentialProvider, TicketSession};
pub use decode::Decoded;
pub use error::{Error, StructuralError};
pub use navigate::{NodeRef, Step};
pub use transport::{HttpTransport, Transport, TransportError, WireRequest, WireResponse};

// Re-export the schema types callers touch when extending the tree
pub use pve_schema::{
    Constraint, FormatRegistry, Kind, ResourceTree, Rule, SchemaError, TreeBuilder, Verb,
    Violation,
};

use std::sync::Arc;
use url::Url;

/// Argument bag for one call: parameter name to JSON value.
pub type Args = serde_json::Map<String, serde_json::Value>;

const DEFAULT_PORT: u16 = 8006;

/// A configured Proxmox VE client.
///
/// Safe for concurrent use from any number of tasks; see the crate docs.
pub struct PveClient {
    tree: Arc<ResourceTree>,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    base: Url,
    formats: FormatRegistry,
}

impl PveClient {
    pub fn builder() -> PveClientBuilder {
        PveClientBuilder::new()
    }

    /// The root of the resource tree; navigation starts here.
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::root(self)
    }

    pub fn tree(&self) -> &ResourceTree {
        &self.tree
    }

    /// Base URL (scheme, host, port) the client talks to
    pub fn base(&self) -> &Url {
        &self.base
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn credentials(&self) -> &dyn CredentialProvider {
        self.credentials.as_ref()
    }

    pub(crate) fn formats(&self) -> &FormatRegistry {
        &self.formats
    }
}

/// Builder for [`PveClient`].
pub struct PveClientBuilder {
    host: Option<String>,
    port: u16,
    scheme: &'static str,
    base: Option<Url>,
    tree: Option<ResourceTree>,
    transport: Option<Arc<dyn Transport>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    formats: FormatRegistry,
}

impl PveClientBuilder {
    fn new() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            scheme: "https",
            base: None,
            tree: None,
            transport: None,
            credentials: None,
            formats: FormatRegistry::builtin(),
        }
    }

    /// Hostname or address of the PVE API endpoint
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// API port, 8006 unless overridden
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Use plain HTTP. Only sensible against a local proxy or test server.
    pub fn insecure_http(mut self) -> Self {
        self.scheme = "http";
        self
    }

    /// Full base URL, overriding host/port/scheme
    pub fn base_url(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    /// Replace the bundled catalog with a custom resource tree
    pub fn tree(mut self, tree: ResourceTree) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn credentials(mut self, credentials: impl CredentialProvider + 'static) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    /// Register an extra named format validator on top of the built-ins
    pub fn register_format<F>(mut self, name: &str, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.register(name, predicate);
        self
    }

    pub fn build(self) -> Result<PveClient, Error> {
        let base = match (self.base, self.host) {
            (Some(base), _) => base,
            (None, Some(host)) => {
                let raw = format!("{}://{}:{}", self.scheme, host, self.port);
                Url::parse(&raw).map_err(|e| Error::Config(format!("bad base url {raw:?}: {e}")))?
            }
            (None, None) => {
                return Err(Error::Config("no host or base url configured".to_string()));
            }
        };

        let credentials = self
            .credentials
            .ok_or_else(|| Error::Config("no credentials configured".to_string()))?;

        let tree = match self.tree {
            Some(tree) => tree,
            None => catalog::resource_tree()?,
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };

        Ok(PveClient {
            tree: Arc::new(tree),
            transport,
            credentials,
            base,
            formats: self.formats,
        })
    }
}
