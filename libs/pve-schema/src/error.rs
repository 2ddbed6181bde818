// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Error types for pve-schema

use crate::node::Verb;
use thiserror::Error;

/// A malformed or self-contradictory schema detected at tree-build time.
///
/// These are fatal: construction aborts and the error is never recovered
/// from at runtime. Every variant points at a defect in the schema table,
/// not in caller input.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A regular-expression constraint failed to compile
    #[error("invalid pattern {pattern:?}: {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    /// A constraint declared both a pattern and an enumeration
    #[error("pattern {pattern:?} conflicts with an enumeration on the same constraint")]
    PatternEnumConflict { pattern: String },

    /// Two entries declared different placeholder names at one tree position
    #[error("conflicting placeholders at {path:?}: {existing:?} vs {proposed:?}")]
    PlaceholderConflict {
        path: String,
        existing: String,
        proposed: String,
    },

    /// The same placeholder name appears twice along one path template
    #[error("placeholder {name:?} appears twice in {path:?}")]
    DuplicatePlaceholder { path: String, name: String },

    /// Two entries declared the same verb at one tree position
    #[error("verb {verb} declared twice at {path:?}")]
    DuplicateVerb { path: String, verb: Verb },

    /// A parameter name was declared twice on one operation
    #[error("parameter {name:?} declared twice at {path:?}")]
    DuplicateParameter { path: String, name: String },

    /// An alias redirect points at a parameter the operation does not declare
    #[error("alias {alias:?} at {path:?} targets unknown parameter {target:?}")]
    UnknownAliasTarget {
        path: String,
        alias: String,
        target: String,
    },

    /// The raw-body override names an undeclared parameter, or the verb
    /// carries no request body
    #[error("invalid raw-body override {name:?} at {path:?}")]
    InvalidRawBody { path: String, name: String },

    /// A path template was empty or contained a malformed segment
    #[error("malformed segment {segment:?} in path template {path:?}")]
    MalformedSegment { path: String, segment: String },
}
