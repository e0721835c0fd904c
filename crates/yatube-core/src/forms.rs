//! Post form binding and validation.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::Post;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Key under which errors that belong to no single field are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Raw submission of the create/edit post form.
///
/// `group` is the selected group id as sent by the `<select>`; an empty
/// string means "no group".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(custom(function = "validate_required_text"))]
    pub text: String,

    #[serde(default)]
    #[validate(custom(function = "validate_group_choice"))]
    pub group: String,
}

/// Validated form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostData {
    pub text: String,
    pub group_id: Option<i32>,
}

impl PostForm {
    pub fn new(text: impl Into<String>, group_id: Option<i32>) -> Self {
        Self {
            text: text.into(),
            group: group_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }

    /// Form pre-filled with an existing post, as shown on the edit page.
    pub fn from_post(post: &Post) -> Self {
        Self::new(post.text.clone(), post.group_id)
    }

    /// The group id currently selected, if it parses.
    pub fn selected_group(&self) -> Option<i32> {
        parse_group_choice(&self.group).ok().flatten()
    }

    /// Validate the submission and return its cleaned data.
    ///
    /// Text is trimmed; whether the chosen group exists is checked by the
    /// caller, which owns the group repository.
    pub fn clean(&self) -> Result<PostData, FormErrors> {
        self.validate()?;

        let group_id = parse_group_choice(&self.group).map_err(|_| {
            let mut errors = FormErrors::default();
            errors.add("group", INVALID_CHOICE_MESSAGE);
            errors
        })?;

        Ok(PostData {
            text: self.text.trim().to_string(),
            group_id,
        })
    }
}

fn parse_group_choice(raw: &str) -> Result<Option<i32>, std::num::ParseIntError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some)
}

fn validate_required_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::Borrowed(REQUIRED_MESSAGE));
        return Err(error);
    }
    Ok(())
}

fn validate_group_choice(group: &str) -> Result<(), ValidationError> {
    if parse_group_choice(group).is_err() {
        let mut error = ValidationError::new("invalid_choice");
        error.message = Some(Cow::Borrowed(INVALID_CHOICE_MESSAGE));
        return Err(error);
    }
    Ok(())
}

/// Field-level error messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages attached to `field`; empty when the field is valid.
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn non_field(&self) -> &[String] {
        self.field(NON_FIELD_ERRORS)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = Self::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                form_errors.add(&field, message);
            }
        }
        form_errors
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}
