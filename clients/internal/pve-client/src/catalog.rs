// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! The bundled Proxmox VE resource catalog.
//!
//! A representative slice of the PVE 8 API surface, expressed as
//! declarative tree-builder entries: cluster and node listings, the qemu
//! and lxc guest subtrees with their lifecycle verbs, storage content,
//! access tickets, and pools. The full generated schema is an order of
//! magnitude larger but purely more of the same data; everything the
//! runtime does is exercised by this slice.
//!
//! Constraint values (the vmid range, name patterns, memory minimums)
//! follow the upstream PVE schema.

use pve_schema::{Constraint, ResourceTree, SchemaError, TreeBuilder, Verb};

fn vmid() -> Constraint {
    Constraint::integer().bounds(100, 999_999_999)
}

fn node_name() -> Constraint {
    Constraint::string().format("pve-node")
}

fn storage_id() -> Constraint {
    Constraint::string().format("pve-storage-id")
}

/// Build the bundled catalog. Infallible in practice -- a failure here is
/// a defect in the table itself, surfaced on first use.
pub fn resource_tree() -> Result<ResourceTree, SchemaError> {
    let mut b = TreeBuilder::new();
    version(&mut b)?;
    cluster(&mut b)?;
    nodes(&mut b)?;
    qemu(&mut b)?;
    lxc(&mut b)?;
    storage(&mut b)?;
    access(&mut b)?;
    pools(&mut b)?;
    Ok(b.build())
}

fn version(b: &mut TreeBuilder) -> Result<(), SchemaError> {
    b.op("/version", Verb::Read)
        .returns([
            ("version", Constraint::string().required()),
            ("release", Constraint::string().required()),
            ("repoid", Constraint::string()),
        ])
        .insert()
}

fn cluster(b: &mut TreeBuilder) -> Result<(), SchemaError> {
    b.op("/cluster/status", Verb::Read).insert()?;
    b.op("/cluster/resources", Verb::Read)
        .param(
            "type",
            Constraint::enumeration(["vm", "storage", "node", "sdn"]),
        )
        .insert()?;
    b.op("/cluster/nextid", Verb::Read)
        .param("vmid", vmid())
        .insert()
}

fn nodes(b: &mut TreeBuilder) -> Result<(), SchemaError> {
    b.op("/nodes", Verb::Read).insert()?;
    b.op("/nodes/{node}/status", Verb::Read)
        .param("node", node_name())
        .insert()?;
    b.op("/nodes/{node}/status", Verb::Create)
        .param("node", node_name())
        .param(
            "command",
            Constraint::enumeration(["reboot", "shutdown"]).required(),
        )
        .insert()?;
    b.op("/nodes/{node}/tasks", Verb::Read)
        .param("node", node_name())
        .param("limit", Constraint::integer().min(0))
        .param("start", Constraint::integer().min(0))
        .param("errors", Constraint::boolean())
        .param("vmid", vmid())
        .insert()?;
    b.op("/nodes/{node}/tasks/{upid}/status", Verb::Read)
        .param("node", node_name())
        .returns([
            ("status", Constraint::enumeration(["running", "stopped"])),
            ("exitstatus", Constraint::string()),
            ("type", Constraint::string()),
            ("upid", Constraint::string()),
        ])
        .insert()
}

fn qemu(b: &mut TreeBuilder) -> Result<(), SchemaError> {
    b.op("/nodes/{node}/qemu", Verb::Read)
        .param("node", node_name())
        .param("full", Constraint::boolean())
        .insert()?;

    // Create guest. `cdrom` is the schema's deprecated alias of `ide2`.
    b.op("/nodes/{node}/qemu", Verb::Create)
        .param("node", node_name())
        .param("vmid", vmid().required())
        .param("name", Constraint::string().format("dns-name"))
        .param("memory", Constraint::integer().min(16))
        .param("cores", Constraint::integer().bounds(1, 128))
        .param("sockets", Constraint::integer().bounds(1, 4))
        .param(
            "ostype",
            Constraint::enumeration(["l24", "l26", "win10", "win11", "other"]),
        )
        .param("net0", Constraint::string())
        .param("ide2", Constraint::string())
        .param("cdrom", Constraint::alias("ide2"))
        .param("scsi0", Constraint::string())
        .param("pool", storage_id())
        .param("start", Constraint::boolean())
        .param("tags", Constraint::string())
        .insert()?;

    b.op("/nodes/{node}/qemu/{vmid}", Verb::Delete)
        .param("node", node_name())
        .param("vmid", vmid())
        .param("purge", Constraint::boolean())
        .param("destroy-unreferenced-disks", Constraint::boolean())
        .insert()?;

    b.op("/nodes/{node}/qemu/{vmid}/config", Verb::Read)
        .param("node", node_name())
        .param("vmid", vmid())
        .param("current", Constraint::boolean())
        .insert()?;
    b.op("/nodes/{node}/qemu/{vmid}/config", Verb::Update)
        .param("node", node_name())
        .param("vmid", vmid())
        .param("name", Constraint::string().format("dns-name"))
        .param("memory", Constraint::integer().min(16))
        .param("cores", Constraint::integer().bounds(1, 128))
        .param("ide2", Constraint::string())
        .param("cdrom", Constraint::alias("ide2"))
        .param("delete", Constraint::string())
        .insert()?;

    b.op("/nodes/{node}/qemu/{vmid}/status/current", Verb::Read)
        .param("node", node_name())
        .param("vmid", vmid())
        .returns([
            (
                "status",
                Constraint::enumeration(["running", "stopped"]).required(),
            ),
            ("qmpstatus", Constraint::string()),
            ("name", Constraint::string()),
            ("uptime", Constraint::integer()),
            ("cpus", Constraint::number()),
            ("maxmem", Constraint::integer()),
        ])
        .insert()?;

    for action in ["start", "stop", "shutdown", "reboot", "suspend", "resume"] {
        let mut op = b
            .op(&format!("/nodes/{{node}}/qemu/{{vmid}}/status/{action}"), Verb::Create)
            .param("node", node_name())
            .param("vmid", vmid());
        if matches!(action, "stop" | "shutdown" | "reboot") {
            op = op.param("timeout", Constraint::integer().min(0));
        }
        if action == "shutdown" {
            op = op.param("forceStop", Constraint::boolean());
        }
        op.insert()?;
    }
    Ok(())
}

fn lxc(b: &mut TreeBuilder) -> Result<(), SchemaError> {
    b.op("/nodes/{node}/lxc", Verb::Read)
        .param("node", node_name())
        .insert()?;
    b.op("/nodes/{node}/lxc", Verb::Create)
        .param("node", node_name())
        .param("vmid", vmid().required())
        .param("ostemplate", Constraint::string().required())
        .param("hostname", Constraint::string().format("dns-name"))
        .param("memory", Constraint::integer().min(16))
        .param("cores", Constraint::integer().bounds(1, 128))
        .param("net0", Constraint::string())
        .param("password", Constraint::string().min(5))
        .param("ssh-public-keys", Constraint::string())
        .param("unprivileged", Constraint::boolean())
        .insert()?;
    b.op("/nodes/{node}/lxc/{vmid}", Verb::Delete)
        .param("node", node_name())
        .param("vmid", vmid())
        .param("purge", Constraint::boolean())
        .insert()?;
    b.op("/nodes/{node}/lxc/{vmid}/config", Verb::Read)
        .param("node", node_name())
        .param("vmid", vmid())
        .insert()?;
    b.op("/nodes/{node}/lxc/{vmid}/interfaces", Verb::Read)
        .param("node", node_name())
        .param("vmid", vmid())
        .insert()?;
    b.op("/nodes/{node}/lxc/{vmid}/status/current", Verb::Read)
        .param("node", node_name())
        .param("vmid", vmid())
        .returns([
            (
                "status",
                Constraint::enumeration(["running", "stopped"]).required(),
            ),
            ("name", Constraint::string()),
            ("uptime", Constraint::integer()),
        ])
        .insert()?;
    for action in ["start", "stop", "shutdown", "reboot", "suspend", "resume"] {
        b.op(&format!("/nodes/{{node}}/lxc/{{vmid}}/status/{action}"), Verb::Create)
            .param("node", node_name())
            .param("vmid", vmid())
            .insert()?;
    }
    Ok(())
}

fn storage(b: &mut TreeBuilder) -> Result<(), SchemaError> {
    b.op("/storage", Verb::Read)
        .param(
            "type",
            Constraint::enumeration(["dir", "lvm", "lvmthin", "nfs", "zfspool"]),
        )
        .insert()?;
    b.op("/nodes/{node}/storage", Verb::Read)
        .param("node", node_name())
        .param("content", Constraint::string())
        .param("enabled", Constraint::boolean())
        .insert()?;
    b.op("/nodes/{node}/storage/{storage}/content", Verb::Read)
        .param("node", node_name())
        .param("storage", storage_id())
        .param("content", Constraint::string())
        .param("vmid", vmid())
        .insert()?;
    // Upload routes the file contents through the raw-body escape hatch
    // instead of form fields.
    b.op("/nodes/{node}/storage/{storage}/upload", Verb::Create)
        .param("node", node_name())
        .param("storage", storage_id())
        .param(
            "content",
            Constraint::enumeration(["iso", "vztmpl"]).required(),
        )
        .param("filename", Constraint::string().required())
        .param("filedata", Constraint::string().required())
        .raw_body("filedata")
        .insert()
}

fn access(b: &mut TreeBuilder) -> Result<(), SchemaError> {
    b.op("/access/ticket", Verb::Create)
        .param("username", Constraint::string().required().min(1))
        .param("password", Constraint::string().required().min(1))
        .param("realm", Constraint::string())
        .param("otp", Constraint::string())
        .returns([
            ("ticket", Constraint::string().required()),
            ("CSRFPreventionToken", Constraint::string()),
            ("username", Constraint::string()),
        ])
        .insert()?;
    b.op("/access/users", Verb::Read)
        .param("enabled", Constraint::boolean())
        .insert()
}

fn pools(b: &mut TreeBuilder) -> Result<(), SchemaError> {
    b.op("/pools", Verb::Read).insert()?;
    b.op("/pools", Verb::Create)
        .param(
            "poolid",
            Constraint::string().required().matches(r"[A-Za-z0-9\.\-_]+")?,
        )
        .param("comment", Constraint::string())
        .insert()?;
    b.op("/pools/{poolid}", Verb::Read).insert()?;
    b.op("/pools/{poolid}", Verb::Delete).insert()
}
