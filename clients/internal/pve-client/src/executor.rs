// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Request execution: validate, serialize, exchange, decode.
//!
//! Validation collects every violation before failing, so one round of
//! fixes is enough for the caller, and no network I/O happens when any
//! argument is bad. A completed exchange with a failure status becomes
//! [`Error::Remote`]; a failed exchange becomes [`Error::Transport`];
//! neither is retried here -- create/destroy/migrate style endpoints are
//! not safely idempotent, so retry policy belongs to the caller, who
//! knows the idempotency context.

use crate::decode::{decode, Decoded};
use crate::error::Error;
use crate::navigate::Step;
use crate::resolve::{resolve, ResolvedCall};
use crate::transport::WireRequest;
use crate::{Args, PveClient};
use http::header::ACCEPT;
use http::{HeaderValue, Method};
use pve_schema::{Kind, Operation, ResourceNode, Rule, Verb, Violation};
use serde_json::Value;

const API_ROOT: &str = "/api2/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const RAW_CONTENT_TYPE: &str = "application/octet-stream";

pub(crate) async fn execute_call(
    client: &PveClient,
    node: &ResourceNode,
    steps: &[Step],
    verb: Verb,
    args: Args,
) -> Result<Decoded, Error> {
    let resolved = resolve(node, steps, verb, args)?;

    let violations = validate_call(client, &resolved);
    if !violations.is_empty() {
        return Err(Error::Validation { violations });
    }

    let mut request = build_request(client, &resolved);
    let mut headers = client
        .credentials()
        .headers(client.transport(), client.base())
        .await?;
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    request.headers = headers;
    tracing::debug!(method = %request.method, url = %request.url, "pve api call");

    let response = client.transport().execute(request).await?;

    if (200..300).contains(&response.status) {
        return decode(&resolved.operation.returns, &response.body);
    }

    let reason = http::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_string);
    let body = if response.body.is_empty() {
        None
    } else {
        // PVE error bodies are JSON when the server got far enough to
        // produce one; keep whatever text came back otherwise.
        Some(serde_json::from_slice(&response.body).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&response.body).into_owned())
        }))
    };
    Err(Error::Remote {
        status: response.status,
        reason,
        body,
    })
}

/// Validate every supplied argument and every path binding, collecting all
/// violations rather than stopping at the first.
fn validate_call(client: &PveClient, resolved: &ResolvedCall<'_>) -> Vec<Violation> {
    let operation = resolved.operation;
    let formats = client.formats();
    let mut violations = Vec::new();

    let mut effective = resolved.fields.clone();
    for (placeholder, raw) in &resolved.path_values {
        let kind = operation
            .param(placeholder)
            .map(|c| c.kind)
            .unwrap_or(Kind::String);
        effective.insert(placeholder.clone(), coerce_path_value(kind, raw));
    }

    for (name, constraint) in &operation.params {
        if constraint.alias_of.is_some() {
            continue;
        }
        if operation.raw_body_param.as_deref() == Some(name.as_str()) {
            if let Err(v) = constraint.validate(name, resolved.raw_body_value.as_ref(), formats) {
                violations.push(v);
            }
            continue;
        }
        if let Err(v) = constraint.validate(name, effective.get(name), formats) {
            violations.push(v);
        }
    }

    // Input is closed: names the operation does not declare are rejected,
    // not silently dropped.
    for name in resolved.fields.keys() {
        if operation.param(name).is_none() {
            violations.push(Violation {
                field: name.clone(),
                rule: Rule::Unknown,
            });
        }
    }

    violations.sort_by(|a, b| a.field.cmp(&b.field));
    violations
}

fn build_request(client: &PveClient, resolved: &ResolvedCall<'_>) -> WireRequest {
    let mut url = client.base().clone();
    url.set_path(&format!("{API_ROOT}{}", resolved.path));

    let mut body = None;
    let mut content_type = None;
    if resolved.verb.sends_body() {
        if let Some(raw) = &resolved.raw_body_value {
            // The raw-body override takes the whole payload; companion
            // fields ride the query string instead of a form body.
            body = Some(raw_body_bytes(raw));
            content_type = Some(RAW_CONTENT_TYPE);
            let query = encode_fields(resolved.operation, &resolved.fields);
            if !query.is_empty() {
                url.set_query(Some(&query));
            }
        } else {
            let form = encode_fields(resolved.operation, &resolved.fields);
            if !form.is_empty() {
                body = Some(form.into_bytes());
                content_type = Some(FORM_CONTENT_TYPE);
            }
        }
    } else {
        let query = encode_fields(resolved.operation, &resolved.fields);
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
    }

    WireRequest {
        method: wire_method(resolved.verb),
        url,
        headers: http::HeaderMap::new(),
        body,
        content_type,
    }
}

fn wire_method(verb: Verb) -> Method {
    match verb {
        Verb::Read => Method::GET,
        Verb::Create => Method::POST,
        Verb::Replace | Verb::Update => Method::PUT,
        Verb::Delete => Method::DELETE,
    }
}

/// Form/query encoding per the PVE wire convention: booleans as `1`/`0`,
/// arrays as repeated keys, explicit nulls only for nullable fields.
fn encode_fields(operation: &Operation, fields: &Args) -> String {
    let mut ser = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in fields {
        match value {
            Value::Null => {
                if operation.param(name).is_some_and(|c| c.nullable) {
                    ser.append_pair(name, "");
                }
            }
            Value::Array(items) => {
                for item in items {
                    ser.append_pair(name, &wire_scalar(item));
                }
            }
            other => {
                ser.append_pair(name, &wire_scalar(other));
            }
        }
    }
    ser.finish()
}

fn wire_scalar(value: &Value) -> String {
    match value {
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn raw_body_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.clone().into_bytes(),
        other => other.to_string().into_bytes(),
    }
}

/// Navigation binds dynamic values as display strings; constraints see
/// them re-typed so `at(100)` satisfies an integer-kinded placeholder.
fn coerce_path_value(kind: Kind, raw: &str) -> Value {
    match kind {
        Kind::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Kind::Number => raw
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Kind::Boolean => match raw {
            "1" | "true" => Value::Bool(true),
            "0" | "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!(true), "1")]
    #[test_case(json!(false), "0")]
    #[test_case(json!("local-lvm"), "local-lvm")]
    #[test_case(json!(2048), "2048")]
    #[test_case(json!(1.5), "1.5")]
    fn wire_scalar_encoding(value: Value, expected: &str) {
        assert_eq!(wire_scalar(&value), expected);
    }

    #[test_case(Kind::Integer, "100", json!(100))]
    #[test_case(Kind::Integer, "pve1", json!("pve1"))]
    #[test_case(Kind::Number, "1.5", json!(1.5))]
    #[test_case(Kind::Boolean, "1", json!(true))]
    #[test_case(Kind::Boolean, "false", json!(false))]
    #[test_case(Kind::String, "100", json!("100"))]
    fn path_values_are_retyped_by_kind(kind: Kind, raw: &str, expected: Value) {
        assert_eq!(coerce_path_value(kind, raw), expected);
    }

    #[test]
    fn raw_body_strings_are_sent_unquoted() {
        assert_eq!(raw_body_bytes(&json!("payload")), b"payload");
        assert_eq!(raw_body_bytes(&json!({"a": 1})), br#"{"a":1}"#);
    }
}
