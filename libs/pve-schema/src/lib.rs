// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Schema model for the Proxmox VE API client runtime.
//!
//! The PVE API surface is schema-as-data: thousands of declared resource
//! shapes drive one generic engine. This crate holds the data half --
//! field [`Constraint`]s with a pluggable [`FormatRegistry`], the
//! navigable [`ResourceTree`] of static and dynamic children, and the
//! [`TreeBuilder`] that assembles the tree from declarative path-template
//! entries. Everything here is pure and synchronous: no I/O, no async,
//! no shared mutable state. The wire side (path resolution, validation
//! aggregation, transport) lives in the `pve-client` crate.

pub mod builder;
pub mod constraint;
pub mod error;
pub mod format;
pub mod node;

pub use builder::{OperationBuilder, TreeBuilder};
pub use constraint::{Constraint, Kind, Pattern, Rule, Violation};
pub use error::SchemaError;
pub use format::FormatRegistry;
pub use node::{DynamicChild, Operation, ResourceNode, ResourceTree, ResultShape, Verb};
