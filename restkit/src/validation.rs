//! # Form Validation Errors
//!
//! Request payloads are validated with the `validator` crate. Its nested
//! [`ValidationErrors`] tree is flattened by [`FormErrorAdapter`] into an
//! [`ErrorList`] where each entry names the failing field in bracket
//! notation:
//!
//! ```text
//! product[name]               length     "Must be between 3 and 80 characters"
//! product[dimensions][width]  range      "This value should be 1 or more."
//! product[tags][2][label]     required   "This value is not valid."
//! ```

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use md5::{Digest, Md5};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::config::{RestkitConfig, VALIDATION_ERROR_CODE};
use crate::error_list::{ErrorItem, ErrorList};
use crate::errors::ApiError;

/// Template used when a validator supplies no message.
pub const DEFAULT_TEMPLATE: &str = "This value is not valid.";
/// Key under which `validator` reports struct-level (schema) errors.
const SCHEMA_ERRORS_KEY: &str = "__all__";
const PLURALIZATION_PARAM: &str = "count";

pub struct FormErrorAdapter;

impl FormErrorAdapter {
    /// Flatten `errors` raised for the form `form_name` into an [`ErrorList`]
    /// carrying `list_code`. Fields are visited in name order.
    #[must_use]
    pub fn adapt(errors: &ValidationErrors, form_name: &str, list_code: &str) -> ErrorList {
        let mut list = ErrorList::new(list_code);
        collect(errors, form_name, &mut list);
        list
    }
}

/// `parent[name]`, or just `name` under an unnamed root.
fn child_origin(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}[{name}]")
    }
}

fn collect(errors: &ValidationErrors, origin: &str, list: &mut ErrorList) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let name: &str = field;
        let field_origin = if name == SCHEMA_ERRORS_KEY {
            origin.to_string()
        } else {
            child_origin(origin, name)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    list.add(to_item(error, &field_origin));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &field_origin, list),
            ValidationErrorsKind::List(entries) => {
                for (index, nested) in entries {
                    collect(nested, &child_origin(&field_origin, &index.to_string()), list);
                }
            }
        }
    }
}

fn render(template: &str, parameters: &Map<String, Value>) -> String {
    parameters
        .iter()
        .fold(template.to_string(), |message, (key, value)| {
            let replacement = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            message
                .replace(&format!("{{{{ {key} }}}}"), &replacement)
                .replace(&format!("{{{{{key}}}}}"), &replacement)
        })
}

fn hashed_code(template: &str) -> String {
    hex::encode(Md5::digest(template.as_bytes()))
}

fn to_item(error: &ValidationError, origin: &str) -> ErrorItem {
    let template = error
        .message
        .as_deref()
        .unwrap_or(DEFAULT_TEMPLATE)
        .to_string();
    let parameters: Map<String, Value> = error
        .params
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    let code = if error.code.is_empty() {
        hashed_code(&template)
    } else {
        error.code.to_string()
    };

    ErrorItem {
        message: render(&template, &parameters),
        pluralization: parameters.get(PLURALIZATION_PARAM).and_then(Value::as_i64),
        template,
        parameters,
        code,
        origin: (!origin.is_empty()).then(|| origin.to_string()),
    }
}

/// Map a JSON body rejection onto a 400.
#[must_use]
pub fn payload_error(rejection: &JsonRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

/// JSON extractor that validates the deserialized value.
///
/// Malformed JSON and validation failures both become 400 responses; the
/// latter list every failing field. The list code is taken from a
/// [`RestkitConfig`] request extension when one is attached, e.g. through
/// `Router::layer(Extension(config))`.
#[derive(Debug)]
pub struct ValidatedForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let list_code = req
            .extensions()
            .get::<RestkitConfig>()
            .map_or_else(|| VALIDATION_ERROR_CODE.to_string(), |config| {
                config.validation_error_code.clone()
            });
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| payload_error(&rejection))?;
        value.validate().map_err(|errors| {
            ApiError::validation_failed(FormErrorAdapter::adapt(&errors, "", &list_code))
        })?;
        Ok(Self(value))
    }
}
