// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Order-independent construction of the resource tree from a declarative
//! entry table.
//!
//! Each entry names its full path template (`/nodes/{node}/qemu/{vmid}`),
//! one verb, the verb's parameters, and its result shape. The builder
//! inserts intermediate static nodes on demand, so entries can arrive in
//! any order. Contradictions between entries, such as two placeholder
//! names at one position or a verb declared twice, abort construction
//! with a [`SchemaError`]; a half-built tree is never handed out.

use crate::constraint::Constraint;
use crate::error::SchemaError;
use crate::node::{DynamicChild, Operation, ResourceNode, ResourceTree, ResultShape, Verb};
use std::collections::HashMap;

enum Segment {
    Literal(String),
    Placeholder(String),
}

fn parse_template(path: &str) -> Result<Vec<Segment>, SchemaError> {
    let malformed = |segment: &str| SchemaError::MalformedSegment {
        path: path.to_string(),
        segment: segment.to_string(),
    };

    let mut segments = Vec::new();
    for raw in path.split('/') {
        if raw.is_empty() {
            continue;
        }
        if let Some(name) = raw.strip_prefix('{') {
            let name = name.strip_suffix('}').ok_or_else(|| malformed(raw))?;
            if name.is_empty() || name.contains(['{', '}']) {
                return Err(malformed(raw));
            }
            segments.push(Segment::Placeholder(name.to_string()));
        } else if raw.contains(['{', '}']) {
            return Err(malformed(raw));
        } else {
            segments.push(Segment::Literal(raw.to_string()));
        }
    }
    Ok(segments)
}

/// Builds a [`ResourceTree`] from operation entries.
pub struct TreeBuilder {
    root: ResourceNode,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            root: ResourceNode::default(),
        }
    }

    /// Start an operation entry at `path` for `verb`. The entry only takes
    /// effect once [`OperationBuilder::insert`] succeeds.
    pub fn op(&mut self, path: &str, verb: Verb) -> OperationBuilder<'_> {
        OperationBuilder {
            tree: self,
            path: path.to_string(),
            verb,
            params: Vec::new(),
            returns: ResultShape::Opaque,
            raw_body_param: None,
        }
    }

    /// Finish construction. All consistency checks run per-insert, so this
    /// cannot fail; it only seals the tree.
    pub fn build(self) -> ResourceTree {
        ResourceTree { root: self.root }
    }

    fn insert_operation(
        &mut self,
        path: &str,
        verb: Verb,
        params: Vec<(String, Constraint)>,
        returns: ResultShape,
        raw_body_param: Option<String>,
    ) -> Result<(), SchemaError> {
        let segments = parse_template(path)?;

        // Walk or create the node chain, collecting placeholders in order.
        let mut placeholders: Vec<String> = Vec::new();
        let mut node = &mut self.root;
        for segment in &segments {
            node = match segment {
                Segment::Literal(name) => node.children.entry(name.clone()).or_default(),
                Segment::Placeholder(name) => {
                    if placeholders.iter().any(|p| p == name) {
                        return Err(SchemaError::DuplicatePlaceholder {
                            path: path.to_string(),
                            name: name.clone(),
                        });
                    }
                    placeholders.push(name.clone());
                    if let Some(existing) = &node.dynamic {
                        if existing.placeholder != *name {
                            return Err(SchemaError::PlaceholderConflict {
                                path: path.to_string(),
                                existing: existing.placeholder.clone(),
                                proposed: name.clone(),
                            });
                        }
                    }
                    let dynamic = node.dynamic.get_or_insert_with(|| {
                        Box::new(DynamicChild {
                            placeholder: name.clone(),
                            node: ResourceNode::default(),
                        })
                    });
                    &mut dynamic.node
                }
            };
        }

        if node.operations.contains_key(&verb) {
            return Err(SchemaError::DuplicateVerb {
                path: path.to_string(),
                verb,
            });
        }

        let mut param_map: HashMap<String, Constraint> = HashMap::with_capacity(params.len());
        for (name, constraint) in params {
            if param_map.insert(name.clone(), constraint).is_some() {
                return Err(SchemaError::DuplicateParameter {
                    path: path.to_string(),
                    name,
                });
            }
        }

        // Every placeholder consumed by the path must appear in the
        // effective parameter set exactly once; entries that do not declare
        // one get a synthesized required string.
        for placeholder in &placeholders {
            param_map
                .entry(placeholder.clone())
                .or_insert_with(|| Constraint::string().required());
        }

        for (name, constraint) in &param_map {
            if let Some(target) = &constraint.alias_of {
                let canonical = param_map.get(target);
                let target_ok =
                    canonical.is_some_and(|c| c.alias_of.is_none()) && !placeholders.contains(name);
                if !target_ok {
                    return Err(SchemaError::UnknownAliasTarget {
                        path: path.to_string(),
                        alias: name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        if let Some(raw) = &raw_body_param {
            if !verb.sends_body() || !param_map.contains_key(raw) {
                return Err(SchemaError::InvalidRawBody {
                    path: path.to_string(),
                    name: raw.clone(),
                });
            }
        }

        node.operations.insert(
            verb,
            Operation {
                verb,
                params: param_map,
                path_params: placeholders,
                returns,
                raw_body_param,
            },
        );
        Ok(())
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One in-flight entry; see [`TreeBuilder::op`].
pub struct OperationBuilder<'a> {
    tree: &'a mut TreeBuilder,
    path: String,
    verb: Verb,
    params: Vec<(String, Constraint)>,
    returns: ResultShape,
    raw_body_param: Option<String>,
}

impl OperationBuilder<'_> {
    pub fn param(mut self, name: &str, constraint: Constraint) -> Self {
        self.params.push((name.to_string(), constraint));
        self
    }

    /// Declare named result fields. Fields not declared here still survive
    /// decoding, in the result's additional-properties side channel.
    pub fn returns<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Constraint)>,
    {
        self.returns = ResultShape::Fields(
            fields
                .into_iter()
                .map(|(name, c)| (name.to_string(), c))
                .collect(),
        );
        self
    }

    /// Route a supplied argument of `name` to the literal request body
    pub fn raw_body(mut self, name: &str) -> Self {
        self.raw_body_param = Some(name.to_string());
        self
    }

    pub fn insert(self) -> Result<(), SchemaError> {
        self.tree.insert_operation(
            &self.path,
            self.verb,
            self.params,
            self.returns,
            self.raw_body_param,
        )
    }
}
