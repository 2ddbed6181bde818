// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Path resolution: turning a completed navigation plus a verb into a
//! bound path, and partitioning the caller's argument bag.
//!
//! The recorded steps are replayed from the root: literal segments
//! concatenate, dynamic values substitute their placeholder percent-
//! encoded. Arguments are then split three ways: names already consumed as
//! path placeholders come from navigation (a caller-supplied duplicate is
//! shadowed -- dropped with one warning, never an error); for read/delete
//! verbs the rest becomes the query string; for body verbs the rest
//! becomes the form body, except an operation's declared raw-body
//! parameter, which becomes the literal payload.
//!
//! A [`ResolvedCall`] lives for exactly one call. Dynamic values differ
//! per call, so nothing here is ever cached.

use crate::error::{Error, StructuralError};
use crate::navigate::{render_steps, Step};
use crate::Args;
use pve_schema::{Operation, ResourceNode, Verb};
use serde_json::Value;

/// A fully bound call: escaped path, the operation, the partitioned
/// arguments, and the names dropped along the way.
#[derive(Debug)]
pub(crate) struct ResolvedCall<'a> {
    /// Percent-encoded path below the API root, starting with `/`
    pub path: String,
    pub verb: Verb,
    pub operation: &'a Operation,
    /// Placeholder name -> raw bound value, in path order
    pub path_values: Vec<(String, String)>,
    /// Query or body fields after shadowing and alias redirects
    pub fields: Args,
    /// Argument names ignored because a path placeholder took precedence
    pub shadowed: Vec<String>,
    /// Alias names dropped because the canonical field was also supplied
    pub dropped_aliases: Vec<String>,
    /// Value routed to the raw-body escape hatch, when the operation
    /// declares one and the caller supplied it
    pub raw_body_value: Option<Value>,
}

pub(crate) fn resolve<'a>(
    node: &'a ResourceNode,
    steps: &[Step],
    verb: Verb,
    args: Args,
) -> Result<ResolvedCall<'a>, Error> {
    let at = render_steps(steps);
    let operation = node.operation(verb).ok_or_else(|| {
        if node.verbs().next().is_none() {
            StructuralError::NotAnOperation { at: at.clone() }
        } else {
            StructuralError::VerbNotDeclared {
                at: at.clone(),
                verb,
            }
        }
    })?;

    let mut path = String::new();
    let mut path_values = Vec::new();
    for step in steps {
        path.push('/');
        match step {
            Step::Static(name) => path.push_str(name),
            Step::Dynamic { placeholder, value } => {
                path.push_str(&urlencoding::encode(value));
                path_values.push((placeholder.clone(), value.clone()));
            }
        }
    }
    if path.is_empty() {
        path.push('/');
    }

    // Alias redirects first: a deprecated name becomes its canonical
    // parameter unless the canonical one was supplied as well, in which
    // case the canonical value wins and the alias is dropped.
    let mut fields = Args::new();
    let mut alias_entries = Vec::new();
    for (name, value) in args {
        if operation.param(&name).is_some_and(|c| c.alias_of.is_some()) {
            alias_entries.push((name, value));
        } else {
            fields.insert(name, value);
        }
    }
    let mut dropped_aliases = Vec::new();
    for (name, value) in alias_entries {
        let Some(target) = operation.param(&name).and_then(|c| c.alias_of.clone()) else {
            continue;
        };
        if fields.contains_key(&target) || operation.is_path_param(&target) {
            tracing::warn!(alias = %name, canonical = %target, path = %at,
                "alias dropped: canonical parameter takes precedence");
            dropped_aliases.push(name);
        } else {
            fields.insert(target, value);
        }
    }

    // Path placeholders win over the argument bag: the bound value came
    // from navigation and a duplicate in the bag is ignored with exactly
    // one warning.
    let mut shadowed = Vec::new();
    for (placeholder, _) in &path_values {
        if fields.remove(placeholder).is_some() {
            tracing::warn!(param = %placeholder, path = %at,
                "argument shadowed by path binding");
            shadowed.push(placeholder.clone());
        }
    }

    let raw_body_value = operation
        .raw_body_param
        .as_ref()
        .and_then(|name| fields.remove(name));

    Ok(ResolvedCall {
        path,
        verb,
        operation,
        path_values,
        fields,
        shadowed,
        dropped_aliases,
        raw_body_value,
    })
}
