// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Field-level constraint model and the pure validator that applies it.
//!
//! A [`Constraint`] describes what makes one field valid: its kind, an
//! optional named format tag, an optional anchored pattern, inclusive
//! numeric or length bounds, an optional closed value set, and whether the
//! field is required. Constraints are plain data, built once when the
//! resource tree is constructed and immutable afterwards.
//!
//! Validation is a pure function of `(Constraint, value)` -- no I/O and no
//! shared state -- so it can run concurrently across calls without
//! coordination. Checks short-circuit in a fixed order: presence, kind,
//! enum membership, pattern, bounds, format tag.

use crate::error::SchemaError;
use crate::format::FormatRegistry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The kind of value a constraint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Integer,
    Number,
    Boolean,
    Enum,
    Array,
    /// Opaque structured value; members are not inspected
    Object,
}

impl Kind {
    /// Whether a JSON value is of this kind. Integers reject fractional
    /// numbers; enums accept any string here (membership is a separate
    /// check).
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Kind::String | Kind::Enum => value.is_string(),
            Kind::Integer => value.is_i64() || value.is_u64(),
            Kind::Number => value.is_number(),
            Kind::Boolean => value.is_boolean(),
            Kind::Array => value.is_array(),
            Kind::Object => value.is_object(),
        }
    }

    /// Short label used in violation and decode messages
    pub fn label(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Enum => "enum",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An anchored regular-expression constraint.
///
/// The source expression is wrapped in `^(?:...)$` at construction, so a
/// match always covers the full string, never a substring.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub(crate) fn new(source: &str) -> Result<Self, SchemaError> {
        let regex =
            Regex::new(&format!("^(?:{source})$")).map_err(|e| SchemaError::BadPattern {
                pattern: source.to_string(),
                source: Box::new(e),
            })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as declared in the schema, without anchors
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// Validity description for one field.
///
/// `pattern` and `enum_values` are mutually exclusive; the constructors
/// make the conflicting combination unrepresentable. Either may combine
/// with bounds.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub kind: Kind,
    /// Named semantic validator, dispatched through the [`FormatRegistry`]
    pub format: Option<String>,
    /// Inclusive lower bound: numeric value for Integer/Number, length for
    /// String/Array
    pub min: Option<f64>,
    /// Inclusive upper bound, same interpretation as `min`
    pub max: Option<f64>,
    pub enum_values: Option<Vec<String>>,
    pub required: bool,
    /// An explicitly nullable field may be sent as an empty value; anything
    /// else that is absent is simply omitted from the wire
    pub nullable: bool,
    /// Deprecated-name redirect: arguments supplied under this field's name
    /// are validated and sent as the named canonical parameter instead
    pub alias_of: Option<String>,
    pattern: Option<Pattern>,
}

impl Constraint {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            format: None,
            min: None,
            max: None,
            enum_values: None,
            required: false,
            nullable: false,
            alias_of: None,
            pattern: None,
        }
    }

    pub fn string() -> Self {
        Self::new(Kind::String)
    }

    pub fn integer() -> Self {
        Self::new(Kind::Integer)
    }

    pub fn number() -> Self {
        Self::new(Kind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(Kind::Boolean)
    }

    pub fn array() -> Self {
        Self::new(Kind::Array)
    }

    pub fn object() -> Self {
        Self::new(Kind::Object)
    }

    /// A closed set of string literals
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut c = Self::new(Kind::Enum);
        c.enum_values = Some(values.into_iter().map(Into::into).collect());
        c
    }

    /// A redirect for a deprecated field name. Carries no checks of its
    /// own; the canonical parameter's constraint applies after the rename.
    pub fn alias(canonical: &str) -> Self {
        let mut c = Self::new(Kind::String);
        c.alias_of = Some(canonical.to_string());
        c
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn format(mut self, name: &str) -> Self {
        self.format = Some(name.to_string());
        self
    }

    /// Attach an anchored pattern. Fails at build time on an invalid
    /// expression or when an enumeration is already declared.
    pub fn matches(mut self, pattern: &str) -> Result<Self, SchemaError> {
        if self.enum_values.is_some() {
            return Err(SchemaError::PatternEnumConflict {
                pattern: pattern.to_string(),
            });
        }
        self.pattern = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    pub fn min(mut self, min: impl Into<f64>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<f64>) -> Self {
        self.max = Some(max.into());
        self
    }

    /// Inclusive bounds at both ends
    pub fn bounds(self, min: impl Into<f64>, max: impl Into<f64>) -> Self {
        self.min(min).max(max)
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    /// Validate one candidate value against this constraint.
    ///
    /// `value` is `None` when the caller did not supply the field at all.
    /// Checks run in declaration order and stop at the first failure;
    /// callers that want a complete report validate each field and collect
    /// the per-field violations themselves.
    ///
    /// Wire normalization (booleans to `1`/`0`, numbers to decimal strings)
    /// is a serialization concern and does not happen here.
    pub fn validate(
        &self,
        field: &str,
        value: Option<&Value>,
        formats: &FormatRegistry,
    ) -> Result<(), Violation> {
        let violation = |rule: Rule| Violation {
            field: field.to_string(),
            rule,
        };

        let value = match value {
            Some(Value::Null) if self.nullable => return Ok(()),
            Some(Value::Null) | None => {
                if self.required {
                    return Err(violation(Rule::Missing));
                }
                return Ok(());
            }
            Some(v) => v,
        };

        if !self.kind.accepts(value) {
            return Err(violation(Rule::WrongKind {
                expected: self.kind,
            }));
        }

        if let (Some(allowed), Some(s)) = (&self.enum_values, value.as_str()) {
            if !allowed.iter().any(|a| a == s) {
                return Err(violation(Rule::NotInEnum));
            }
        }

        if let (Some(pattern), Some(s)) = (&self.pattern, value.as_str()) {
            if !pattern.is_match(s) {
                return Err(violation(Rule::PatternMismatch {
                    pattern: pattern.source().to_string(),
                }));
            }
        }

        self.check_bounds(value).map_err(violation)?;

        if let (Some(format), Some(s)) = (&self.format, value.as_str()) {
            // Unknown format names fail closed: a typo in the schema or a
            // missing registration must not silently accept every value.
            if !formats.check(format, s).unwrap_or(false) {
                return Err(violation(Rule::BadFormat {
                    format: format.clone(),
                }));
            }
        }

        Ok(())
    }

    fn check_bounds(&self, value: &Value) -> Result<(), Rule> {
        match self.kind {
            Kind::Integer | Kind::Number => {
                // Kind check already passed, so a numeric view exists.
                let n = value.as_f64().unwrap_or_default();
                if let Some(min) = self.min {
                    if n < min {
                        return Err(Rule::BelowMinimum { min });
                    }
                }
                if let Some(max) = self.max {
                    if n > max {
                        return Err(Rule::AboveMaximum { max });
                    }
                }
            }
            Kind::String | Kind::Enum => {
                if let Some(s) = value.as_str() {
                    self.check_length(s.chars().count())?;
                }
            }
            Kind::Array => {
                if let Some(a) = value.as_array() {
                    self.check_length(a.len())?;
                }
            }
            Kind::Boolean | Kind::Object => {}
        }
        Ok(())
    }

    fn check_length(&self, len: usize) -> Result<(), Rule> {
        if let Some(min) = self.min {
            if (len as f64) < min {
                return Err(Rule::TooShort { min: min as usize });
            }
        }
        if let Some(max) = self.max {
            if (len as f64) > max {
                return Err(Rule::TooLong { max: max as usize });
            }
        }
        Ok(())
    }
}

/// One rejected field: which field, and which rule it broke.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {rule}")]
pub struct Violation {
    pub field: String,
    pub rule: Rule,
}

/// The rule a candidate value broke.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rule {
    #[error("required but absent")]
    Missing,

    #[error("expected {expected}")]
    WrongKind { expected: Kind },

    #[error("not one of the allowed values")]
    NotInEnum,

    #[error("does not match pattern {pattern:?}")]
    PatternMismatch { pattern: String },

    #[error("below minimum {min}")]
    BelowMinimum { min: f64 },

    #[error("above maximum {max}")]
    AboveMaximum { max: f64 },

    #[error("shorter than minimum length {min}")]
    TooShort { min: usize },

    #[error("longer than maximum length {max}")]
    TooLong { max: usize },

    #[error("not a valid {format:?} value")]
    BadFormat { format: String },

    #[error("not a declared parameter")]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    fn formats() -> FormatRegistry {
        FormatRegistry::builtin()
    }

    #[test]
    fn required_but_absent_is_rejected() {
        let c = Constraint::string().required();
        let err = c.validate("name", None, &formats()).unwrap_err();
        assert_eq!(err.rule, Rule::Missing);
    }

    #[test]
    fn optional_absent_is_accepted() {
        let c = Constraint::string();
        assert!(c.validate("name", None, &formats()).is_ok());
    }

    #[test]
    fn null_counts_as_absent_unless_nullable() {
        let c = Constraint::string().required();
        let err = c.validate("name", Some(&Value::Null), &formats()).unwrap_err();
        assert_eq!(err.rule, Rule::Missing);

        let c = Constraint::string().required().nullable();
        assert!(c.validate("name", Some(&Value::Null), &formats()).is_ok());
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let c = Constraint::integer();
        let err = c.validate("vmid", Some(&json!("100")), &formats()).unwrap_err();
        assert_eq!(
            err.rule,
            Rule::WrongKind {
                expected: Kind::Integer
            }
        );
    }

    #[test]
    fn integer_rejects_fractional_numbers() {
        let c = Constraint::integer();
        assert!(c.validate("cores", Some(&json!(1.5)), &formats()).is_err());
        assert!(c.validate("cores", Some(&json!(2)), &formats()).is_ok());
    }

    #[test_case(100, true; "exact lower bound")]
    #[test_case(999_999_999, true; "exact upper bound")]
    #[test_case(99, false; "one below minimum")]
    #[test_case(1_000_000_000, false; "one above maximum")]
    fn numeric_bounds_are_inclusive(value: i64, ok: bool) {
        let c = Constraint::integer().bounds(100, 999_999_999);
        assert_eq!(c.validate("vmid", Some(&json!(value)), &formats()).is_ok(), ok);
    }

    #[test]
    fn enum_membership() {
        let c = Constraint::enumeration(["running", "stopped"]);
        assert!(c.validate("status", Some(&json!("running")), &formats()).is_ok());
        let err = c
            .validate("status", Some(&json!("paused")), &formats())
            .unwrap_err();
        assert_eq!(err.rule, Rule::NotInEnum);
    }

    #[test]
    fn pattern_is_anchored_full_string() {
        let c = Constraint::string().matches("[a-z]+").unwrap();
        assert!(c.validate("id", Some(&json!("abc")), &formats()).is_ok());
        // A substring match must not be enough.
        assert!(c.validate("id", Some(&json!("abc1")), &formats()).is_err());
        assert!(c.validate("id", Some(&json!("1abc")), &formats()).is_err());
        // Empty string against a pattern requiring at least one character.
        assert!(c.validate("id", Some(&json!("")), &formats()).is_err());
    }

    #[test]
    fn pattern_and_enum_are_mutually_exclusive() {
        let res = Constraint::enumeration(["a", "b"]).matches("[ab]");
        assert!(matches!(res, Err(SchemaError::PatternEnumConflict { .. })));
    }

    #[test]
    fn invalid_pattern_is_a_schema_error() {
        let res = Constraint::string().matches("(unclosed");
        assert!(matches!(res, Err(SchemaError::BadPattern { .. })));
    }

    #[test]
    fn string_length_bounds() {
        let c = Constraint::string().bounds(2, 4);
        assert!(c.validate("name", Some(&json!("ab")), &formats()).is_ok());
        assert!(c.validate("name", Some(&json!("abcd")), &formats()).is_ok());
        let err = c.validate("name", Some(&json!("a")), &formats()).unwrap_err();
        assert_eq!(err.rule, Rule::TooShort { min: 2 });
        let err = c
            .validate("name", Some(&json!("abcde")), &formats())
            .unwrap_err();
        assert_eq!(err.rule, Rule::TooLong { max: 4 });
    }

    #[test]
    fn format_tag_dispatches_to_registry() {
        let c = Constraint::string().format("cidr");
        assert!(c.validate("net", Some(&json!("10.0.0.0/8")), &formats()).is_ok());
        let err = c
            .validate("net", Some(&json!("10.0.0.0/64")), &formats())
            .unwrap_err();
        assert_eq!(
            err.rule,
            Rule::BadFormat {
                format: "cidr".to_string()
            }
        );
    }

    #[test]
    fn unknown_format_fails_closed() {
        let c = Constraint::string().format("no-such-format");
        assert!(c.validate("x", Some(&json!("anything")), &formats()).is_err());
    }

    #[test]
    fn checks_short_circuit_in_order() {
        // Wrong kind is reported before the pattern is ever consulted.
        let c = Constraint::string().matches("[a-z]+").unwrap();
        let err = c.validate("id", Some(&json!(7)), &formats()).unwrap_err();
        assert_eq!(
            err.rule,
            Rule::WrongKind {
                expected: Kind::String
            }
        );
    }
}
