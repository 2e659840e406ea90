use serde_json::Value;

use crate::error::{ApiError, Result};

/// Checks that `data` is a JSON object holding every key in `required_fields`.
///
/// `data_type` names the payload in the error message, e.g. "row data".
pub fn validate_input(data: &Value, required_fields: &[&str], data_type: &str) -> Result<()> {
    let Some(map) = data.as_object() else {
        return Err(ApiError::validation(format!("{} must be a dictionary", data_type)).into());
    };

    let missing: Vec<&str> = required_fields
        .iter()
        .copied()
        .filter(|field| !map.contains_key(*field))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "Missing required fields in {}: {:?}",
            data_type, missing
        ))
        .into())
    }
}

/// [`validate_input`] with the payload described as "input".
pub fn validate_fields(data: &Value, required_fields: &[&str]) -> Result<()> {
    validate_input(data, required_fields, "input")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_all_fields_present() {
        assert!(validate_fields(&json!({"a": 1, "b": 2}), &["a", "b"]).is_ok());
        assert!(validate_fields(&json!({"a": null}), &["a"]).is_ok());
        assert!(validate_fields(&json!({}), &[]).is_ok());
    }

    #[test]
    fn test_missing_field_is_listed() {
        let err = validate_fields(&json!({"a": 1}), &["a", "b"]).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Validation));
        assert_eq!(err.to_string(), r#"Missing required fields in input: ["b"]"#);
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_missing_fields_keep_requested_order() {
        let required = ["start", "summary", "end"];
        let err = validate_input(&json!({"summary": "x"}), &required, "event data").unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Missing required fields in event data: ["start", "end"]"#
        );
    }

    #[test]
    fn test_non_object_is_rejected() {
        for value in [json!([1, 2]), json!("a"), json!(null), json!(3)] {
            let err = validate_input(&value, &["a"], "row data").unwrap_err();
            assert_eq!(err.kind(), Some(ErrorKind::Validation));
            assert_eq!(err.to_string(), "row data must be a dictionary");
        }
    }
}
