//! Request payloads and the rules they are checked against.
//!
//! Field rules are declared with `validator` derives; the results are
//! flattened into [`FieldErrors`], a field → messages map that the HTTP
//! layer renders verbatim.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::{NewTicket, TicketChanges};

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 255;

/// Maximum description length, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Message reported under `description` when an update carries no fields.
pub const AT_LEAST_ONE_FIELD: &str = "You need to provide at least one of the fields";

/// Body of a create request. Fields are optional so that absence is reported
/// as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateTicketRequest {
    #[validate(
        required(message = "The title field is required for the ticket"),
        custom(function = "validate_title")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "The description field is required for the ticket"),
        custom(function = "validate_description")
    )]
    pub description: Option<String>,
}

/// Body of a partial update request. An empty JSON array is accepted as an
/// empty payload.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateTicketRequest {
    #[validate(custom(function = "validate_title"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_description"))]
    pub description: Option<String>,
}

/// Validation failures keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(&field, message);
            }
        }
        out
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    check_text("title", title, TITLE_MAX_CHARS)
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    check_text("description", description, DESCRIPTION_MAX_CHARS)
}

/// Shared rule for text fields: non-blank and at most `max` characters.
fn check_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Owned(format!(
            "The {} field is required for the ticket",
            field
        ))));
    }

    if value.chars().count() > max {
        return Err(ValidationError::new("max").with_message(Cow::Owned(format!(
            "The {} field can only have up to {} characters",
            field, max
        ))));
    }

    Ok(())
}

/// Surrounding whitespace is dropped before any rule runs, so limits apply to
/// the stored value. A blank string stays present and fails as empty.
fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string())
}

/// Check a create request, returning the fields to insert.
pub fn validate_create(request: CreateTicketRequest) -> Result<NewTicket, FieldErrors> {
    let request = CreateTicketRequest {
        title: trimmed(request.title),
        description: trimmed(request.description),
    };
    request.validate().map_err(FieldErrors::from)?;

    // `required` has already rejected missing fields.
    Ok(NewTicket {
        title: request.title.unwrap_or_default(),
        description: request.description.unwrap_or_default(),
    })
}

/// Check an update request, returning the change set to apply.
pub fn validate_update(request: UpdateTicketRequest) -> Result<TicketChanges, FieldErrors> {
    if request.title.is_none() && request.description.is_none() {
        let mut errors = FieldErrors::new();
        errors.add("description", AT_LEAST_ONE_FIELD);
        return Err(errors);
    }

    let request = UpdateTicketRequest {
        title: trimmed(request.title),
        description: trimmed(request.description),
    };
    request.validate().map_err(FieldErrors::from)?;

    Ok(TicketChanges {
        title: request.title,
        description: request.description,
        closed_at: None,
    })
}
