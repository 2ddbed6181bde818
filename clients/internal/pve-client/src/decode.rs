// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Response decoding against a declared result shape.
//!
//! PVE wraps every payload in a `{"data": ...}` envelope; the engine
//! unwraps it and checks declared fields against their kind. Input-style
//! constraints (patterns, bounds, formats) are deliberately not re-applied
//! to responses -- the server is the source of truth for its own data.
//! The schema is explicitly open: fields the shape does not declare are
//! preserved in [`Decoded::additional`] rather than dropped, so a growing
//! remote schema never loses data through this client.

use crate::error::Error;
use pve_schema::ResultShape;
use serde_json::{Map, Value};

/// A decoded result payload.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    /// The untouched `data` payload. For list endpoints and opaque shapes
    /// this is where the result lives.
    pub raw: Value,
    /// Declared fields present in the payload
    pub fields: Map<String, Value>,
    /// Catch-all side channel: payload members the shape does not declare
    pub additional: Map<String, Value>,
}

impl Decoded {
    /// Look up a declared field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

pub(crate) fn decode(shape: &ResultShape, body: &[u8]) -> Result<Decoded, Error> {
    if body.is_empty() {
        return Ok(Decoded::default());
    }

    let payload: Value = serde_json::from_slice(body).map_err(|e| Error::Decode {
        field: "<body>".to_string(),
        expected: format!("valid JSON: {e}"),
    })?;

    // Unwrap the PVE envelope when present; tolerate a bare payload.
    let data = match payload {
        Value::Object(mut envelope) if envelope.contains_key("data") => {
            envelope.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };

    let declared = match shape {
        ResultShape::Opaque => {
            return Ok(Decoded {
                raw: data,
                ..Decoded::default()
            });
        }
        ResultShape::Fields(declared) => declared,
    };

    let object = match &data {
        Value::Object(object) => object.clone(),
        Value::Null => Map::new(),
        _ => {
            return Err(Error::Decode {
                field: "<data>".to_string(),
                expected: "object".to_string(),
            });
        }
    };

    let mut fields = Map::new();
    let mut additional = Map::new();
    for (name, value) in object {
        match declared.get(&name) {
            Some(constraint) => {
                if !value.is_null() && !constraint.kind.accepts(&value) {
                    return Err(Error::Decode {
                        field: name,
                        expected: constraint.kind.label().to_string(),
                    });
                }
                fields.insert(name, value);
            }
            None => {
                additional.insert(name, value);
            }
        }
    }

    Ok(Decoded {
        raw: data,
        fields,
        additional,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pve_schema::Constraint;
    use serde_json::json;

    fn version_shape() -> ResultShape {
        ResultShape::Fields(
            [
                ("version".to_string(), Constraint::string()),
                ("release".to_string(), Constraint::string()),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn envelope_is_unwrapped_and_fields_split_from_additional() {
        let body = br#"{"data":{"version":"8.2.4","release":"8.2","repoid":"faa83925"}}"#;
        let decoded = decode(&version_shape(), body).unwrap();
        assert_eq!(decoded.field("version"), Some(&json!("8.2.4")));
        assert_eq!(decoded.field("release"), Some(&json!("8.2")));
        // The undeclared field survives in the side channel.
        assert_eq!(decoded.additional.get("repoid"), Some(&json!("faa83925")));
        assert!(decoded.fields.get("repoid").is_none());
    }

    #[test]
    fn declared_field_of_wrong_kind_is_a_decode_error() {
        let body = br#"{"data":{"version":824}}"#;
        let err = decode(&version_shape(), body).unwrap_err();
        assert!(
            matches!(err, Error::Decode { ref field, ref expected }
                if field == "version" && expected == "string"),
            "{err}"
        );
    }

    #[test]
    fn opaque_shape_passes_payload_through() {
        let body = br#"{"data":[{"vmid":100},{"vmid":101}]}"#;
        let decoded = decode(&ResultShape::Opaque, body).unwrap();
        assert_eq!(decoded.raw, json!([{"vmid": 100}, {"vmid": 101}]));
        assert!(decoded.fields.is_empty());
        assert!(decoded.additional.is_empty());
    }

    #[test]
    fn null_data_and_empty_body_decode_to_nothing() {
        let decoded = decode(&version_shape(), br#"{"data":null}"#).unwrap();
        assert_eq!(decoded.raw, Value::Null);
        let decoded = decode(&version_shape(), b"").unwrap();
        assert_eq!(decoded.raw, Value::Null);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = decode(&ResultShape::Opaque, b"not json").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
