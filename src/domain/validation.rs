//! Input validation helpers shared by the entity drafts.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::amount::{Amount, AmountError, Budget};
use super::error::{DomainError, FieldError};

/// Trim and check a required text field against its column width.
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, "must not be blank"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(FieldError::new(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Parse a required price (strictly positive).
pub(crate) fn required_amount(field: &'static str, value: &str) -> Result<Amount, FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, "is required"));
    }
    value
        .parse::<Amount>()
        .map_err(|e| FieldError::new(field, amount_message(e)))
}

/// Parse an optional budget, defaulting to zero.
pub(crate) fn optional_budget(field: &'static str, value: Option<&str>) -> Result<Budget, FieldError> {
    match value.map(str::trim) {
        None | Some("") => Ok(Budget::zero()),
        Some(text) => Decimal::from_str(text)
            .map_err(|e| AmountError::ParseError(e.to_string()))
            .and_then(Budget::new)
            .map_err(|e| FieldError::new(field, amount_message(e))),
    }
}

fn amount_message(error: AmountError) -> String {
    match error {
        AmountError::ParseError(_) => "must be a decimal number".to_string(),
        other => other.to_string(),
    }
}

/// Fold collected field failures into a single domain error.
pub(crate) fn into_result<T>(value: Option<T>, errors: Vec<FieldError>) -> Result<T, DomainError> {
    match value {
        Some(value) if errors.is_empty() => Ok(value),
        _ => Err(DomainError::InvalidFields(errors)),
    }
}
