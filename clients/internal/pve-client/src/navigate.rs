// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Tree navigation.
//!
//! A [`NodeRef`] is a cursor into the shared resource tree: the node
//! reached so far plus the recorded steps that got there. `child` descends
//! along a literal segment, `at` along the dynamic child with a
//! runtime-supplied value. Navigation touches nothing but the cursor -- no
//! network, no tree mutation -- so the same sequence of steps always lands
//! on the same place, and any number of cursors can walk the tree
//! concurrently.

use crate::error::{Error, StructuralError};
use crate::executor;
use crate::{Args, Decoded, PveClient};
use pve_schema::{ResourceNode, Verb};
use std::fmt;

/// One recorded navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A literal child name
    Static(String),
    /// A dynamic descent: which placeholder it filled, and the value
    Dynamic { placeholder: String, value: String },
}

/// Render steps as an unescaped path for messages and logs.
pub(crate) fn render_steps(steps: &[Step]) -> String {
    if steps.is_empty() {
        return "/".to_string();
    }
    let mut out = String::new();
    for step in steps {
        out.push('/');
        match step {
            Step::Static(name) => out.push_str(name),
            Step::Dynamic { value, .. } => out.push_str(value),
        }
    }
    out
}

/// A cursor into the resource tree, created by [`PveClient::root`].
#[derive(Clone)]
pub struct NodeRef<'a> {
    client: &'a PveClient,
    node: &'a ResourceNode,
    steps: Vec<Step>,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn root(client: &'a PveClient) -> Self {
        Self {
            client,
            node: client.tree().root(),
            steps: Vec::new(),
        }
    }

    /// Descend to the static child `name`.
    pub fn child(mut self, name: &str) -> Result<NodeRef<'a>, Error> {
        let node = self.node.static_child(name).ok_or_else(|| {
            StructuralError::NoSuchChild {
                at: render_steps(&self.steps),
                name: name.to_string(),
            }
        })?;
        self.steps.push(Step::Static(name.to_string()));
        Ok(NodeRef {
            client: self.client,
            node,
            steps: self.steps,
        })
    }

    /// Descend the dynamic child, binding `value` to its placeholder.
    pub fn at(mut self, value: impl fmt::Display) -> Result<NodeRef<'a>, Error> {
        let dynamic = self.node.dynamic_child().ok_or_else(|| {
            StructuralError::NotDynamic {
                at: render_steps(&self.steps),
            }
        })?;
        self.steps.push(Step::Dynamic {
            placeholder: dynamic.placeholder.clone(),
            value: value.to_string(),
        });
        Ok(NodeRef {
            client: self.client,
            node: &dynamic.node,
            steps: self.steps,
        })
    }

    /// The unescaped path navigated so far, for display
    pub fn path(&self) -> String {
        render_steps(&self.steps)
    }

    /// The node this cursor points at
    pub fn node(&self) -> &'a ResourceNode {
        self.node
    }

    pub(crate) fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Read (GET)
    pub async fn get(self, args: Args) -> Result<Decoded, Error> {
        self.call(Verb::Read, args).await
    }

    /// Create (POST)
    pub async fn create(self, args: Args) -> Result<Decoded, Error> {
        self.call(Verb::Create, args).await
    }

    /// Replace (PUT)
    pub async fn replace(self, args: Args) -> Result<Decoded, Error> {
        self.call(Verb::Replace, args).await
    }

    /// Partial update (PUT; PVE carries partial updates on PUT as well)
    pub async fn update(self, args: Args) -> Result<Decoded, Error> {
        self.call(Verb::Update, args).await
    }

    /// Delete (DELETE)
    pub async fn delete(self, args: Args) -> Result<Decoded, Error> {
        self.call(Verb::Delete, args).await
    }

    async fn call(self, verb: Verb, args: Args) -> Result<Decoded, Error> {
        executor::execute_call(self.client, self.node, &self.steps, verb, args).await
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("path", &self.path())
            .field("verbs", &self.node.verbs().collect::<Vec<_>>())
            .finish()
    }
}
