//! Field-level validation of request payloads.
//!
//! Each check records human-readable messages per field into a
//! [`FieldErrors`] map; a payload is accepted only when the map stays empty.

use serde_json::{Map, Value};

use crate::types::FieldErrors;

pub mod payment_debt;

pub use payment_debt::{validate_changes, validate_new, PaymentDebtChanges, ValidationMode};

pub const REQUIRED: &str = "This field is required.";
pub const NULL: &str = "This field may not be null.";
pub const BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub fn push_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors.entry(field.to_string()).or_default().push(message.into());
}

/// The payload as a JSON object, or a `non_field_errors` entry naming what was sent instead.
pub fn expect_object(payload: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    payload.as_object().ok_or_else(|| {
        let mut errors = FieldErrors::new();
        push_error(
            &mut errors,
            NON_FIELD_ERRORS,
            format!("Invalid data. Expected a dictionary, but got {}.", type_name(payload)),
        );
        errors
    })
}

/// Fetch a present, non-null string field, recording required/null/blank errors.
/// Numbers are accepted and kept in their textual form.
pub fn required_string(
    object: &Map<String, Value>,
    field: &str,
    trim: bool,
    errors: &mut FieldErrors,
) -> Option<String> {
    match object.get(field) {
        None => {
            push_error(errors, field, REQUIRED);
            None
        }
        Some(value) => string_value(value, field, trim, errors),
    }
}

/// Validate an already-present value as a non-blank string.
pub fn string_value(value: &Value, field: &str, trim: bool, errors: &mut FieldErrors) -> Option<String> {
    let text = match value {
        Value::Null => {
            push_error(errors, field, NULL);
            return None;
        }
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            push_error(errors, field, NOT_A_STRING);
            return None;
        }
    };

    let text = if trim { text.trim().to_string() } else { text };
    if text.is_empty() {
        push_error(errors, field, BLANK);
        return None;
    }
    Some(text)
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expect_object_names_the_received_type() {
        let errors = expect_object(&json!([1, 2])).unwrap_err();
        assert_eq!(
            errors[NON_FIELD_ERRORS],
            vec!["Invalid data. Expected a dictionary, but got list.".to_string()]
        );
        assert!(expect_object(&json!({})).is_ok());
    }

    #[test]
    fn required_string_reports_each_failure() {
        let object = json!({"blank": "  ", "null": null, "list": [], "number": 42, "ok": " x "});
        let object = object.as_object().unwrap();
        let mut errors = FieldErrors::new();

        assert_eq!(required_string(object, "missing", true, &mut errors), None);
        assert_eq!(required_string(object, "blank", true, &mut errors), None);
        assert_eq!(required_string(object, "null", true, &mut errors), None);
        assert_eq!(required_string(object, "list", true, &mut errors), None);
        assert_eq!(required_string(object, "number", true, &mut errors), Some("42".to_string()));
        assert_eq!(required_string(object, "ok", true, &mut errors), Some("x".to_string()));
        assert_eq!(required_string(object, "ok", false, &mut errors), Some(" x ".to_string()));

        assert_eq!(errors["missing"], vec![REQUIRED.to_string()]);
        assert_eq!(errors["blank"], vec![BLANK.to_string()]);
        assert_eq!(errors["null"], vec![NULL.to_string()]);
        assert_eq!(errors["list"], vec![NOT_A_STRING.to_string()]);
        assert_eq!(errors.len(), 4);
    }
}
