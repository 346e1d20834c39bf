//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

/// Domain-specific errors
///
/// These errors represent business rule violations and invalid input.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// The store cannot pay for the car
    #[error("Insufficient budget: required {required}, available {available}")]
    InsufficientBudget {
        required: Decimal,
        available: Decimal,
    },

    /// The resulting budget would not fit the budget column
    #[error("Budget overflow: applying {change} to {available} exceeds the maximum budget")]
    BudgetOverflow { available: Decimal, change: Decimal },

    /// One or more input fields failed validation
    #[error("Invalid input: {}", join_fields(.0))]
    InvalidFields(Vec<FieldError>),
}

/// A single field validation failure
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    /// Create an insufficient budget error
    pub fn insufficient_budget(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientBudget {
            required,
            available,
        }
    }

    /// Check if this is a validation error (caller must correct the input)
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFields(_) | Self::BudgetOverflow { .. }
        )
    }
}
