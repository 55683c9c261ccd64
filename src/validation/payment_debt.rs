use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use validator::ValidateEmail;

use super::{expect_object, push_error, string_value, NON_FIELD_ERRORS, NULL, REQUIRED};
use crate::database::models::{PaymentDebt, PaymentDebtStatus};
use crate::types::FieldErrors;

const NAME_MAX_LENGTH: usize = 100;
const EMAIL_MAX_LENGTH: usize = 254;
const AMOUNT_MAX_DIGITS: usize = 10;
const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Which fields an incoming payload must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// POST: every field except `status`
    Create,
    /// PUT: every field except `status`; `debt_id` comes from the path
    Replace,
    /// PATCH: only the fields present are checked
    Partial,
}

/// Validated subset of payment debt fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentDebtChanges {
    pub debt_id: Option<i32>,
    pub name: Option<String>,
    pub government_id: Option<i64>,
    pub email: Option<String>,
    pub debt_amount: Option<Decimal>,
    pub debt_due_date: Option<NaiveDate>,
    pub status: Option<PaymentDebtStatus>,
}

impl PaymentDebtChanges {
    /// Overlay these changes on an existing record. The key never changes.
    pub fn apply(self, existing: PaymentDebt) -> PaymentDebt {
        PaymentDebt {
            debt_id: existing.debt_id,
            name: self.name.unwrap_or(existing.name),
            government_id: self.government_id.unwrap_or(existing.government_id),
            email: self.email.unwrap_or(existing.email),
            debt_amount: self.debt_amount.unwrap_or(existing.debt_amount),
            debt_due_date: self.debt_due_date.unwrap_or(existing.debt_due_date),
            status: self.status.unwrap_or(existing.status),
        }
    }
}

/// Validate a create payload into a complete record (status defaults to open).
pub fn validate_new(payload: &Value) -> Result<PaymentDebt, FieldErrors> {
    match validate_changes(payload, ValidationMode::Create)? {
        PaymentDebtChanges {
            debt_id: Some(debt_id),
            name: Some(name),
            government_id: Some(government_id),
            email: Some(email),
            debt_amount: Some(debt_amount),
            debt_due_date: Some(debt_due_date),
            status,
        } => Ok(PaymentDebt {
            debt_id,
            name,
            government_id,
            email,
            debt_amount,
            debt_due_date,
            status: status.unwrap_or_default(),
        }),
        _ => {
            let mut errors = FieldErrors::new();
            push_error(&mut errors, NON_FIELD_ERRORS, "Incomplete payment debt.");
            Err(errors)
        }
    }
}

pub fn validate_changes(payload: &Value, mode: ValidationMode) -> Result<PaymentDebtChanges, FieldErrors> {
    let object = expect_object(payload)?;
    let mut errors = FieldErrors::new();
    let mut changes = PaymentDebtChanges::default();

    if mode == ValidationMode::Create {
        changes.debt_id = field(object, "debt_id", true, &mut errors)
            .and_then(|v| integer_in_range(v, "debt_id", i32::MIN.into(), i32::MAX.into(), &mut errors))
            .map(|v| v as i32);
    }

    let required = mode != ValidationMode::Partial;

    changes.name = field(object, "name", required, &mut errors)
        .and_then(|v| string_value(v, "name", true, &mut errors))
        .and_then(|name| max_length(name, "name", NAME_MAX_LENGTH, &mut errors));

    changes.government_id = field(object, "government_id", required, &mut errors)
        .and_then(|v| integer_in_range(v, "government_id", i64::MIN.into(), i64::MAX.into(), &mut errors))
        .map(|v| v as i64);

    changes.email = field(object, "email", required, &mut errors)
        .and_then(|v| string_value(v, "email", true, &mut errors))
        .and_then(|email| max_length(email, "email", EMAIL_MAX_LENGTH, &mut errors))
        .and_then(|email| valid_email(email, &mut errors));

    changes.debt_amount = field(object, "debt_amount", required, &mut errors)
        .and_then(|v| decimal_amount(v, &mut errors));

    changes.debt_due_date = field(object, "debt_due_date", required, &mut errors)
        .and_then(|v| iso_date(v, &mut errors));

    changes.status = field(object, "status", false, &mut errors).and_then(|v| status_choice(v, &mut errors));

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}

/// Present and non-null value of `name`, recording required/null errors.
fn field<'a>(
    object: &'a Map<String, Value>,
    name: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<&'a Value> {
    match object.get(name) {
        None => {
            if required {
                push_error(errors, name, REQUIRED);
            }
            None
        }
        Some(Value::Null) => {
            push_error(errors, name, NULL);
            None
        }
        Some(value) => Some(value),
    }
}

fn max_length(value: String, name: &str, limit: usize, errors: &mut FieldErrors) -> Option<String> {
    if value.chars().count() > limit {
        push_error(
            errors,
            name,
            format!("Ensure this field has no more than {} characters.", limit),
        );
        return None;
    }
    Some(value)
}

fn integer_in_range(value: &Value, name: &str, min: i128, max: i128, errors: &mut FieldErrors) -> Option<i128> {
    let Some(parsed) = parse_integer(value) else {
        push_error(errors, name, "A valid integer is required.");
        return None;
    };

    if parsed > max {
        push_error(errors, name, format!("Ensure this value is less than or equal to {}.", max));
        None
    } else if parsed < min {
        push_error(errors, name, format!("Ensure this value is greater than or equal to {}.", min));
        None
    } else {
        Some(parsed)
    }
}

/// JSON integers, integral floats and numeric strings
fn parse_integer(value: &Value) -> Option<i128> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.into())
            } else if let Some(u) = n.as_u64() {
                Some(u.into())
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i128)
            }
        }
        Value::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    }
}

fn valid_email(email: String, errors: &mut FieldErrors) -> Option<String> {
    if email.as_str().validate_email() {
        Some(email)
    } else {
        push_error(errors, "email", "Enter a valid email address.");
        None
    }
}

fn decimal_amount(value: &Value, errors: &mut FieldErrors) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };

    let Ok(mut amount) = text.parse::<Decimal>() else {
        push_error(errors, "debt_amount", "A valid number is required.");
        return None;
    };

    // Trailing zeros count: "1.500" has three decimal places.
    let digits = amount.mantissa().unsigned_abs().to_string().len();
    let decimals = amount.scale() as usize;
    let (total, whole) = if decimals > digits {
        (decimals, 0)
    } else {
        (digits, digits - decimals)
    };

    let max_whole = AMOUNT_MAX_DIGITS - AMOUNT_DECIMAL_PLACES as usize;
    if total > AMOUNT_MAX_DIGITS {
        push_error(
            errors,
            "debt_amount",
            format!("Ensure that there are no more than {} digits in total.", AMOUNT_MAX_DIGITS),
        );
        return None;
    }
    if decimals > AMOUNT_DECIMAL_PLACES as usize {
        push_error(
            errors,
            "debt_amount",
            format!("Ensure that there are no more than {} decimal places.", AMOUNT_DECIMAL_PLACES),
        );
        return None;
    }
    if whole > max_whole {
        push_error(
            errors,
            "debt_amount",
            format!("Ensure that there are no more than {} digits before the decimal point.", max_whole),
        );
        return None;
    }

    amount.rescale(AMOUNT_DECIMAL_PLACES);
    Some(amount)
}

fn iso_date(value: &Value, errors: &mut FieldErrors) -> Option<NaiveDate> {
    let parsed = value
        .as_str()
        .map(str::trim)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

    if parsed.is_none() {
        let is_datetime = value
            .as_str()
            .and_then(|s| s.trim().split_once('T'))
            .is_some_and(|(date, _)| NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
        let message = if is_datetime {
            "Expected a date but got a datetime."
        } else {
            "Date has wrong format. Use one of these formats instead: YYYY-MM-DD."
        };
        push_error(errors, "debt_due_date", message);
    }
    parsed
}

fn status_choice(value: &Value, errors: &mut FieldErrors) -> Option<PaymentDebtStatus> {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    match raw.parse::<PaymentDebtStatus>() {
        Ok(status) => Some(status),
        Err(message) => {
            push_error(errors, "status", message);
            None
        }
    }
}
