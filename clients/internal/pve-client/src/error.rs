// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Client error taxonomy.
//!
//! The split matters for recovery: [`Error::Schema`] and
//! [`Error::Structural`] are programming or integration defects and are
//! never silently swallowed; [`Error::Validation`] is fully recoverable by
//! correcting input and is cheap because no I/O has happened yet;
//! [`Error::Remote`] and [`Error::Transport`] propagate verbatim with no
//! internal retry -- many of the operations behind this client (create,
//! destroy, migrate) are not safely idempotent, so retry policy belongs to
//! the caller. Shadowed parameters are a logged warning, never an error.

use crate::transport::TransportError;
use pve_schema::{SchemaError, Verb, Violation};
use thiserror::Error;

/// Caller navigation that does not fit the tree: wrong child name, wrong
/// static/dynamic usage, or a verb the reached node does not declare.
/// Surfaced synchronously, before any I/O.
#[derive(Error, Debug)]
pub enum StructuralError {
    #[error("{at:?} has no child named {name:?}")]
    NoSuchChild { at: String, name: String },

    #[error("{at:?} has no dynamic child")]
    NotDynamic { at: String },

    #[error("{at:?} does not declare a {verb} operation")]
    VerbNotDeclared { at: String, verb: Verb },

    #[error("{at:?} is not an operation")]
    NotAnOperation { at: String },
}

/// Any failure a call through the client can produce.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed schema at tree-build time; fatal
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Navigation did not fit the tree
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// One or more arguments broke their constraints. All violations are
    /// collected before failing, so the caller sees the complete report.
    #[error("invalid arguments: {}", format_violations(violations))]
    Validation { violations: Vec<Violation> },

    /// The transport completed but the remote system reported failure.
    /// Carries the status and any structured error body; never retried.
    #[error("remote returned status {status}{}", format_reason(reason.as_deref()))]
    Remote {
        status: u16,
        reason: Option<String>,
        body: Option<serde_json::Value>,
    },

    /// A successful response did not fit the operation's declared result
    /// shape
    #[error("response field {field:?}: expected {expected}")]
    Decode { field: String, expected: String },

    /// The transport collaborator itself failed; passed through unmodified
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A credential could not be constructed or acquired
    #[error("credential error: {0}")]
    Credential(String),

    /// Client construction was incomplete or inconsistent
    #[error("client configuration error: {0}")]
    Config(String),
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_reason(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!(" ({reason})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pve_schema::Rule;

    #[test]
    fn validation_message_carries_every_violation() {
        let err = Error::Validation {
            violations: vec![
                Violation {
                    field: "vmid".to_string(),
                    rule: Rule::BelowMinimum { min: 100.0 },
                },
                Violation {
                    field: "name".to_string(),
                    rule: Rule::Missing,
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("vmid"), "{msg}");
        assert!(msg.contains("name"), "{msg}");
    }

    #[test]
    fn remote_message_includes_reason_when_present() {
        let err = Error::Remote {
            status: 401,
            reason: Some("invalid PVE ticket".to_string()),
            body: None,
        };
        assert_eq!(
            err.to_string(),
            "remote returned status 401 (invalid PVE ticket)"
        );
    }
}
