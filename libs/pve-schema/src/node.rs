// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! The navigable resource tree.
//!
//! Each [`ResourceNode`] corresponds to one URL path segment and exposes
//! named static children, at most one dynamic child (an edge traversed
//! with a runtime-supplied value such as a node name or vmid), and the
//! verb operations declared at that position. The tree is built once by
//! [`crate::builder::TreeBuilder`] and is read-only for its whole
//! lifetime, so any number of concurrent callers can navigate it without
//! coordination.

use crate::constraint::Constraint;
use std::collections::HashMap;
use std::fmt;

/// A verb operation attachable to a node.
///
/// Verbs generalize the wire methods: Proxmox VE has no PATCH, so both
/// `Replace` and `Update` ride PUT; they stay distinct in the model so a
/// node declares the semantics it actually has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Read,
    Create,
    Replace,
    Update,
    Delete,
}

impl Verb {
    pub fn wire_method(self) -> &'static str {
        match self {
            Verb::Read => "GET",
            Verb::Create => "POST",
            Verb::Replace | Verb::Update => "PUT",
            Verb::Delete => "DELETE",
        }
    }

    /// Whether non-path parameters travel in the request body rather than
    /// the query string
    pub fn sends_body(self) -> bool {
        matches!(self, Verb::Create | Verb::Replace | Verb::Update)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verb::Read => "read",
            Verb::Create => "create",
            Verb::Replace => "replace",
            Verb::Update => "update",
            Verb::Delete => "delete",
        };
        f.write_str(label)
    }
}

/// Declared shape of an operation's result payload.
#[derive(Debug, Clone)]
pub enum ResultShape {
    /// No declared fields; the payload passes through untouched
    Opaque,
    /// Declared fields by name. The schema is explicitly open: fields not
    /// listed here are preserved in the decoded result's side channel, not
    /// dropped.
    Fields(HashMap<String, Constraint>),
}

/// One verb attached to a node: its parameters, which of them are bound by
/// the path, its result shape, and the optional raw-body escape hatch.
#[derive(Debug, Clone)]
pub struct Operation {
    pub verb: Verb,
    /// Parameter name -> constraint, aliases included
    pub params: HashMap<String, Constraint>,
    /// Placeholders consumed by the path to this node, in path order.
    /// Each appears in `params` exactly once; the builder guarantees it.
    pub path_params: Vec<String>,
    pub returns: ResultShape,
    /// When set, a supplied argument of this name becomes the literal
    /// request body instead of a form field. The documented escape hatch
    /// for binary payloads; only valid on body-carrying verbs.
    pub raw_body_param: Option<String>,
}

impl Operation {
    pub fn param(&self, name: &str) -> Option<&Constraint> {
        self.params.get(name)
    }

    pub fn is_path_param(&self, name: &str) -> bool {
        self.path_params.iter().any(|p| p == name)
    }
}

/// The dynamic child of a node: a placeholder name plus the subtree it
/// leads to.
#[derive(Debug)]
pub struct DynamicChild {
    pub placeholder: String,
    pub node: ResourceNode,
}

/// One point in the navigable tree.
#[derive(Debug, Default)]
pub struct ResourceNode {
    pub(crate) children: HashMap<String, ResourceNode>,
    pub(crate) dynamic: Option<Box<DynamicChild>>,
    pub(crate) operations: HashMap<Verb, Operation>,
}

impl ResourceNode {
    pub fn static_child(&self, name: &str) -> Option<&ResourceNode> {
        self.children.get(name)
    }

    pub fn dynamic_child(&self) -> Option<&DynamicChild> {
        self.dynamic.as_deref()
    }

    pub fn operation(&self, verb: Verb) -> Option<&Operation> {
        self.operations.get(&verb)
    }

    /// Names of the static children, unordered
    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn verbs(&self) -> impl Iterator<Item = Verb> + '_ {
        self.operations.keys().copied()
    }
}

/// An immutable, fully built resource tree.
#[derive(Debug)]
pub struct ResourceTree {
    pub(crate) root: ResourceNode,
}

impl ResourceTree {
    pub fn root(&self) -> &ResourceNode {
        &self.root
    }
}
