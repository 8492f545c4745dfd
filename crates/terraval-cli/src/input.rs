//! Feature record input: one JSON object from an argument or stdin

use std::io::Read;

use anyhow::Context;
use terraval_types::FeatureRecord;

/// `None` or `-` reads standard input
pub fn read_raw(arg: Option<String>) -> anyhow::Result<String> {
    match arg {
        Some(raw) if raw != "-" => Ok(raw),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read feature record from stdin")?;
            Ok(buffer)
        }
    }
}

pub fn parse_record(raw: &str) -> anyhow::Result<FeatureRecord> {
    if raw.trim().is_empty() {
        anyhow::bail!("no feature record supplied (pass JSON as an argument or on stdin)");
    }
    Ok(FeatureRecord::from_json(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_is_used_verbatim() {
        let raw = read_raw(Some(r#"{"latitude": 1, "longitude": 2}"#.to_string())).unwrap();
        assert_eq!(raw, r#"{"latitude": 1, "longitude": 2}"#);
    }

    #[test]
    fn test_parse_applies_defaults() {
        let record = parse_record(r#"{"latitude": 40.7, "longitude": -74.0}"#).unwrap();
        assert_eq!(record.area_sqm(), 200.0);
        assert_eq!(record.ndvi(), 0.5);
        assert_eq!(record.document_count(), 0);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_record("  ").is_err());
        assert!(parse_record("not json").is_err());
        assert!(parse_record(r#"{"latitude": 95, "longitude": 0}"#).is_err());
    }
}
