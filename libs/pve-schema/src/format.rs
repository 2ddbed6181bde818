// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Named semantic format validators.
//!
//! Format tags are orthogonal to structural pattern/bounds checks: a
//! constraint may say "string, 1..=64 chars" structurally and "cidr"
//! semantically. Each format is a pure `&str -> bool` predicate keyed by
//! name, and embedding applications can register additional formats
//! without touching the core -- the registry is just a map.
//!
//! The built-in set covers the format names the Proxmox VE schema leans on
//! most heavily (`address`, `cidr`, `mac-addr`, `email-list`, `pve-node`,
//! `pve-storage-id`, ...).

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Registry of named format validators: `name -> (value) -> bool`.
#[derive(Clone)]
pub struct FormatRegistry {
    formats: HashMap<String, Predicate>,
}

impl FormatRegistry {
    /// An empty registry with no formats at all
    pub fn empty() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    /// The built-in format set used by the bundled PVE catalog
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        reg.register("address", |s| s.parse::<IpAddr>().is_ok());
        reg.register("ipv4", |s| s.parse::<Ipv4Addr>().is_ok());
        reg.register("ipv6", |s| s.parse::<Ipv6Addr>().is_ok());
        reg.register("cidr", is_cidr);
        reg.register("ipv4-cidr", is_ipv4_cidr);
        reg.register("mac-addr", is_mac_addr);
        reg.register("email", is_email);
        reg.register("email-list", is_email_list);
        reg.register("dns-name", is_dns_name);
        reg.register("pve-node", is_dns_name);
        reg.register("pve-storage-id", is_storage_id);
        reg.register("pve-vmid", is_vmid);
        reg
    }

    /// Register (or replace) a format validator under `name`.
    pub fn register<F>(&mut self, name: &str, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.insert(name.to_string(), Arc::new(predicate));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Run the named validator. `None` when no such format is registered.
    pub fn check(&self, name: &str, value: &str) -> Option<bool> {
        self.formats.get(name).map(|p| p(value))
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FormatRegistry")
            .field("formats", &names)
            .finish()
    }
}

fn anchored(source: &str) -> Option<Regex> {
    Regex::new(&format!("^(?:{source})$")).ok()
}

static MAC_ADDR: LazyLock<Option<Regex>> =
    LazyLock::new(|| anchored(r"[0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2}){5}"));

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| anchored(r"[^\s@]+@[^\s@]+\.[^\s@]+"));

// Hostname labels per RFC 1123: alphanumeric, hyphens inside only.
static DNS_LABEL: LazyLock<Option<Regex>> =
    LazyLock::new(|| anchored(r"[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?"));

static STORAGE_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| anchored(r"[A-Za-z][A-Za-z0-9\-_.]*"));

fn regex_match(re: &LazyLock<Option<Regex>>, s: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(s))
}

fn is_cidr(s: &str) -> bool {
    let Some((addr, prefix)) = s.split_once('/') else {
        return false;
    };
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    match addr.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => prefix <= 32,
        Ok(IpAddr::V6(_)) => prefix <= 128,
        Err(_) => false,
    }
}

fn is_ipv4_cidr(s: &str) -> bool {
    let Some((addr, prefix)) = s.split_once('/') else {
        return false;
    };
    addr.parse::<Ipv4Addr>().is_ok() && prefix.parse::<u8>().is_ok_and(|p| p <= 32)
}

fn is_mac_addr(s: &str) -> bool {
    regex_match(&MAC_ADDR, s)
}

fn is_email(s: &str) -> bool {
    regex_match(&EMAIL, s)
}

/// Comma or semicolon separated list of addresses, at least one entry
fn is_email_list(s: &str) -> bool {
    let mut entries = s.split([',', ';']).map(str::trim);
    let mut any = false;
    for entry in entries.by_ref() {
        if entry.is_empty() || !is_email(entry) {
            return false;
        }
        any = true;
    }
    any
}

fn is_dns_name(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 253
        && s.split('.').all(|label| regex_match(&DNS_LABEL, label))
}

fn is_storage_id(s: &str) -> bool {
    regex_match(&STORAGE_ID, s)
}

fn is_vmid(s: &str) -> bool {
    s.parse::<u64>().is_ok_and(|v| (100..=999_999_999).contains(&v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("address", "192.168.1.1", true)]
    #[test_case("address", "fe80::1", true)]
    #[test_case("address", "192.168.1.256", false)]
    #[test_case("cidr", "10.0.0.0/8", true)]
    #[test_case("cidr", "fe80::/64", true)]
    #[test_case("cidr", "10.0.0.0/33", false)]
    #[test_case("cidr", "10.0.0.0", false)]
    #[test_case("ipv4-cidr", "10.0.0.0/24", true)]
    #[test_case("ipv4-cidr", "fe80::/64", false)]
    #[test_case("mac-addr", "AA:BB:CC:DD:EE:FF", true)]
    #[test_case("mac-addr", "aa:bb:cc:dd:ee", false)]
    #[test_case("email", "ops@example.com", true)]
    #[test_case("email", "not-an-email", false)]
    #[test_case("email-list", "a@x.io, b@y.io;c@z.io", true)]
    #[test_case("email-list", "a@x.io,,b@y.io", false)]
    #[test_case("email-list", "", false)]
    #[test_case("dns-name", "pve1.example.com", true)]
    #[test_case("dns-name", "-bad.example.com", false)]
    #[test_case("pve-node", "pve1", true)]
    #[test_case("pve-storage-id", "local-lvm", true)]
    #[test_case("pve-storage-id", "9bad", false)]
    #[test_case("pve-vmid", "100", true)]
    #[test_case("pve-vmid", "99", false)]
    fn builtin_formats(name: &str, value: &str, expected: bool) {
        let reg = FormatRegistry::builtin();
        assert_eq!(reg.check(name, value), Some(expected), "{name} {value:?}");
    }

    #[test]
    fn unknown_format_reports_none() {
        let reg = FormatRegistry::builtin();
        assert_eq!(reg.check("nope", "x"), None);
    }

    #[test]
    fn registration_is_additive() {
        let mut reg = FormatRegistry::builtin();
        assert!(!reg.contains("upid"));
        reg.register("upid", |s| s.starts_with("UPID:"));
        assert_eq!(reg.check("upid", "UPID:pve1:0000"), Some(true));
        assert_eq!(reg.check("upid", "nope"), Some(false));
        // Existing formats are untouched.
        assert_eq!(reg.check("ipv4", "10.0.0.1"), Some(true));
    }
}
