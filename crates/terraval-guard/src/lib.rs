//! Terraval Guard - Remote Valuation Validator
//!
//! When an agent lets a remote model propose the whole valuation, the
//! returned text is untrusted. This crate turns it into a [`Valuation`]
//! or rejects it.
//!
//! # Key Principle
//!
//! **The remote answer is validated, NEVER repaired.**
//!
//! The payload must be one JSON object with exactly these keys:
//! - `valuation`: non-negative number (fraction truncated toward zero)
//! - `confidence`: number in `[0, 100]` (fraction truncated)
//! - `reasoning`: string
//! - `risk_factors`: array of non-empty strings
//!
//! The only accommodation is unwrapping a single markdown code fence,
//! which chat models add around JSON even when asked not to.

use serde_json::{Map, Value};
use terraval_types::Valuation;
use thiserror::Error;

/// Keys a remote valuation must carry, and nothing else
pub const REQUIRED_KEYS: [&str; 4] = ["valuation", "confidence", "reasoning", "risk_factors"];

/// Errors that can occur during validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Invalid JSON structure: {message}")]
    InvalidJson { message: String },

    #[error("Expected a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Unexpected field: {field}")]
    UnexpectedField { field: String },

    #[error("Field {field} must be {expected}, got {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("Field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: String },

    #[error("risk_factors[{index}] is empty")]
    EmptyRiskFactor { index: usize },
}

pub type Result<T> = std::result::Result<T, GuardError>;

/// The Terraval Guard
///
/// Validates remote valuation proposals before they are reported.
#[derive(Debug, Clone, Default)]
pub struct Guard;

impl Guard {
    pub fn new() -> Self {
        Self
    }

    /// Parse and validate a raw model response
    pub fn parse_valuation(&self, raw: &str) -> Result<Valuation> {
        let body = strip_code_fence(raw);
        let value: Value = serde_json::from_str(body).map_err(|e| GuardError::InvalidJson {
            message: e.to_string(),
        })?;
        self.validate_value(&value)
    }

    /// Validate an already-parsed JSON value
    pub fn validate_value(&self, value: &Value) -> Result<Valuation> {
        let object = value.as_object().ok_or(GuardError::NotAnObject {
            found: type_name(value),
        })?;

        if let Some(extra) = object
            .keys()
            .find(|key| !REQUIRED_KEYS.contains(&key.as_str()))
        {
            return Err(GuardError::UnexpectedField {
                field: extra.clone(),
            });
        }

        let valuation = truncated_number(object, "valuation", 0.0, u64::MAX as f64)?;
        let confidence = truncated_number(object, "confidence", 0.0, 100.0)?;

        let reasoning = match required(object, "reasoning")? {
            Value::String(text) => text.clone(),
            other => return Err(wrong_type("reasoning", "a string", other)),
        };

        let risk_factors = match required(object, "risk_factors")? {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::String(s) if s.trim().is_empty() => {
                        Err(GuardError::EmptyRiskFactor { index })
                    }
                    Value::String(s) => Ok(s.clone()),
                    other => Err(wrong_type("risk_factors", "an array of strings", other)),
                })
                .collect::<Result<Vec<_>>>()?,
            other => return Err(wrong_type("risk_factors", "an array", other)),
        };

        Ok(Valuation {
            valuation: valuation as u64,
            confidence: confidence as u8,
            reasoning,
            risk_factors,
        })
    }
}

/// Unwrap one enclosing ```` ```json ... ``` ```` fence, if present
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...) on the opening line
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}

fn required<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value> {
    object.get(field).ok_or(GuardError::MissingField { field })
}

fn truncated_number(
    object: &Map<String, Value>,
    field: &'static str,
    min: f64,
    max: f64,
) -> Result<f64> {
    let value = required(object, field)?;
    let number = value
        .as_f64()
        .ok_or_else(|| wrong_type(field, "a number", value))?;
    if !(min..=max).contains(&number) {
        return Err(GuardError::OutOfRange {
            field,
            value: number.to_string(),
        });
    }
    Ok(number.trunc())
}

fn wrong_type(field: &'static str, expected: &'static str, found: &Value) -> GuardError {
    GuardError::WrongType {
        field,
        expected,
        found: type_name(found).to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "valuation": 1250000,
        "confidence": 78,
        "reasoning": "Healthy vegetation and complete title documents.",
        "risk_factors": ["Flood plain proximity"]
    }"#;

    #[test]
    fn test_valid_payload() {
        let v = Guard::new().parse_valuation(VALID).unwrap();
        assert_eq!(v.valuation, 1_250_000);
        assert_eq!(v.confidence, 78);
        assert_eq!(v.risk_factors, vec!["Flood plain proximity".to_string()]);
    }

    #[test]
    fn test_fractional_numbers_truncate() {
        let raw = r#"{"valuation": 1999.99, "confidence": 79.9, "reasoning": "", "risk_factors": []}"#;
        let v = Guard::new().parse_valuation(raw).unwrap();
        assert_eq!(v.valuation, 1999);
        assert_eq!(v.confidence, 79);
        assert!(v.reasoning.is_empty());
    }

    #[test]
    fn test_fenced_payload_is_unwrapped() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert!(Guard::new().parse_valuation(&fenced).is_ok());

        let bare_fence = format!("```\n{}\n```", VALID);
        assert!(Guard::new().parse_valuation(&bare_fence).is_ok());
    }

    #[test]
    fn test_prose_is_rejected() {
        let result = Guard::new().parse_valuation("The parcel is worth about $1.2M.");
        assert!(matches!(result, Err(GuardError::InvalidJson { .. })));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let result = Guard::new().parse_valuation("[1, 2, 3]");
        assert_eq!(result, Err(GuardError::NotAnObject { found: "an array" }));
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let raw = r#"{"valuation": 1, "confidence": 50, "reasoning": "x"}"#;
        assert_eq!(
            Guard::new().parse_valuation(raw),
            Err(GuardError::MissingField {
                field: "risk_factors"
            })
        );
    }

    #[test]
    fn test_extra_key_is_rejected() {
        let raw = r#"{"valuation": 1, "confidence": 50, "reasoning": "x", "risk_factors": [], "currency": "USD"}"#;
        assert_eq!(
            Guard::new().parse_valuation(raw),
            Err(GuardError::UnexpectedField {
                field: "currency".to_string()
            })
        );
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        let guard = Guard::new();
        let cases = [
            r#"{"valuation": "1000", "confidence": 50, "reasoning": "x", "risk_factors": []}"#,
            r#"{"valuation": 1000, "confidence": null, "reasoning": "x", "risk_factors": []}"#,
            r#"{"valuation": 1000, "confidence": 50, "reasoning": 7, "risk_factors": []}"#,
            r#"{"valuation": 1000, "confidence": 50, "reasoning": "x", "risk_factors": "none"}"#,
            r#"{"valuation": 1000, "confidence": 50, "reasoning": "x", "risk_factors": [1]}"#,
        ];
        for raw in cases {
            assert!(
                matches!(guard.parse_valuation(raw), Err(GuardError::WrongType { .. })),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_out_of_range_numbers_are_rejected() {
        let guard = Guard::new();
        let negative = r#"{"valuation": -5, "confidence": 50, "reasoning": "x", "risk_factors": []}"#;
        let too_sure = r#"{"valuation": 5, "confidence": 101, "reasoning": "x", "risk_factors": []}"#;
        assert!(matches!(
            guard.parse_valuation(negative),
            Err(GuardError::OutOfRange { field: "valuation", .. })
        ));
        assert!(matches!(
            guard.parse_valuation(too_sure),
            Err(GuardError::OutOfRange { field: "confidence", .. })
        ));
    }

    #[test]
    fn test_blank_risk_factor_is_rejected() {
        let raw = r#"{"valuation": 5, "confidence": 50, "reasoning": "x", "risk_factors": ["ok", "  "]}"#;
        assert_eq!(
            Guard::new().parse_valuation(raw),
            Err(GuardError::EmptyRiskFactor { index: 1 })
        );
    }

    #[test]
    fn test_strip_code_fence_leaves_plain_text() {
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n{}"), "```json\n{}");
    }
}
