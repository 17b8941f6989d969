//! Client-facing error entries.
//!
//! Every error that reaches a client is an [`ErrorItem`]: a rendered message,
//! the template it came from, a machine-readable code and, for form input, the
//! path of the field that failed.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use utoipa::ToSchema;

pub use crate::config::VALIDATION_ERROR_CODE;

/// A single error entry in a response body.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorItem {
    /// Rendered, human-readable message
    pub message: String,
    /// Message before parameter substitution
    pub template: String,
    /// Values substituted into the template
    #[serde(skip_serializing_if = "Map::is_empty")]
    #[schema(value_type = Object)]
    pub parameters: Map<String, Value>,
    /// Plural form selector, when the message has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pluralization: Option<i64>,
    /// Machine-readable error code
    pub code: String,
    /// Field path of the offending input, e.g. `product[dimensions][width]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl ErrorItem {
    /// Create an error whose message needs no rendering.
    #[must_use]
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            template: message.clone(),
            message,
            parameters: Map::new(),
            pluralization: None,
            code: code.into(),
            origin: None,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

impl fmt::Display for ErrorItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{origin}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// An ordered collection of [`ErrorItem`]s sharing a list-level code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorList {
    code: String,
    errors: Vec<ErrorItem>,
}

impl ErrorList {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            errors: Vec::new(),
        }
    }

    pub fn add(&mut self, error: ErrorItem) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Append every entry of `other`, keeping this list's code.
    pub fn merge(&mut self, other: Self) -> &mut Self {
        self.errors.extend(other.errors);
        self
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ErrorItem] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ErrorItem> {
        self.errors.iter()
    }

    /// `Ok(())` when empty, otherwise the list itself.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Default for ErrorList {
    fn default() -> Self {
        Self::new(VALIDATION_ERROR_CODE)
    }
}

impl IntoIterator for ErrorList {
    type Item = ErrorItem;
    type IntoIter = std::vec::IntoIter<ErrorItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a ErrorItem;
    type IntoIter = std::slice::Iter<'a, ErrorItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} error(s))", self.code, self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}
