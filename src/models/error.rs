//! Validation error types for LotLedger models
//!
//! This module defines error types specifically for field validation of
//! ingested rows, separate from the fatal application errors.

use std::fmt;
use thiserror::Error;

/// Main validation error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The kind of validation error
    pub kind: ValidationErrorKind,
    /// The field that failed validation
    pub field: String,
    /// Optional additional context
    pub context: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(kind: ValidationErrorKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            context: None,
        }
    }

    /// Create a validation error with additional context
    pub fn with_context(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            context: Some(context.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({})", ctx)?;
        }
        Ok(())
    }
}

/// Specific validation error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Plate is empty or contains no alphanumeric characters
    #[error("Plate is empty after cleaning")]
    EmptyPlate,

    /// Plate is shorter than the configured minimum
    #[error("Plate is below minimum length")]
    PlateTooShort { min: usize },

    /// Timestamp matches none of the accepted formats
    #[error("Unrecognised timestamp format")]
    InvalidTimestamp,

    /// Row has the wrong number of columns
    #[error("Wrong column count")]
    ColumnCount { expected: &'static str, found: usize },

    /// Entry timestamp is after the exit timestamp on the same row
    #[error("Entry time is after exit time")]
    EntryAfterExit,

    /// Event kind keyword is not recognised
    #[error("Invalid event kind (expected: entry, exit or unknown)")]
    InvalidEventKind,

    /// Field is required but missing
    #[error("Required field is missing")]
    RequiredField,

    /// Custom validation error
    #[error("{0}")]
    Custom(String),
}

/// Collection of validation errors
#[derive(Debug, Default, Clone)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Convert to a Result
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Single line, so the text fits a rejection detail
impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid field(s)", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
