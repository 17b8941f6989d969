use axum::{
    Json,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use super::{Transformer, language::preferred_language};
use crate::error_list::{ErrorItem, ErrorList};
use crate::errors::ApiError;

const DATA_KEY: &str = "data";
const INCLUDED_KEY: &str = "included";
const ERRORS_KEY: &str = "errors";
const CODE_KEY: &str = "code";
const META_KEY: &str = "meta";

#[derive(Debug, Clone, Default)]
struct RequestContext {
    preferred_language: Option<String>,
}

/// Assembles a JSON response body plus headers.
///
/// Setters return `&mut Self` for chaining; [`build`](Self::build) consumes the
/// builder.
#[derive(Debug, Default)]
pub struct JsonResponseBuilder {
    body: Map<String, Value>,
    errors: Vec<ErrorItem>,
    error_code: Option<String>,
    headers: HeaderMap,
    includes: Vec<String>,
    request: Option<RequestContext>,
}

impl JsonResponseBuilder {
    /// A builder with no request context; translatable transformers are rejected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder bound to the current request's `Accept-Language`.
    #[must_use]
    pub fn for_request(headers: &HeaderMap) -> Self {
        Self {
            request: Some(RequestContext {
                preferred_language: preferred_language(headers),
            }),
            ..Self::default()
        }
    }

    /// Names of related resources to side-load; unknown names are ignored.
    pub fn with_includes(&mut self, includes: Vec<String>) -> &mut Self {
        self.includes = includes;
        self
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.body.insert(key.into(), value);
        self
    }

    /// Set `meta.<key>`.
    pub fn set_meta(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        let meta = self
            .body
            .entry(META_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !meta.is_object() {
            *meta = Value::Object(Map::new());
        }
        if let Value::Object(meta) = meta {
            meta.insert(key.into(), value);
        }
        self
    }

    pub fn add_error(&mut self, error: ErrorItem) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Append every entry of `errors` and record its list-level code.
    pub fn add_error_list(&mut self, errors: ErrorList) -> &mut Self {
        self.error_code = Some(errors.code().to_string());
        self.errors.extend(errors);
        self
    }

    pub fn add_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn add_headers(&mut self, headers: HeaderMap) -> &mut Self {
        self.headers.extend(headers);
        self
    }

    fn prepare<T, R>(&self, transformer: &mut R) -> Result<(), ApiError>
    where
        R: Transformer<T> + ?Sized,
    {
        if let Some(translatable) = transformer.as_translatable() {
            let Some(request) = &self.request else {
                return Err(ApiError::internal(
                    "Response could not be rendered",
                    Some("a translatable transformer requires a request context".to_string()),
                ));
            };
            translatable.set_language(request.preferred_language.as_deref().unwrap_or_default());
        }
        Ok(())
    }

    fn collect_includes<'a, T, R>(&self, transformer: &R, items: impl IntoIterator<Item = &'a T>)
    -> Map<String, Value>
    where
        T: 'a,
        R: Transformer<T> + ?Sized,
    {
        let requested: Vec<&str> = self
            .includes
            .iter()
            .map(String::as_str)
            .filter(|name| {
                transformer
                    .available_includes()
                    .iter()
                    .any(|available| available == name)
            })
            .collect();

        let mut included = Map::new();
        if requested.is_empty() {
            return included;
        }

        for item in items {
            for name in &requested {
                let Some(resource) = transformer.include(name, item) else {
                    continue;
                };
                let entries = match resource {
                    Value::Array(entries) => entries,
                    Value::Null => Vec::new(),
                    single => vec![single],
                };
                let bucket = included
                    .entry(*name)
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(bucket) = bucket {
                    for entry in entries {
                        if !bucket.contains(&entry) {
                            bucket.push(entry);
                        }
                    }
                }
            }
        }

        included.retain(|_, bucket| bucket.as_array().is_some_and(|b| !b.is_empty()));
        included
    }

    fn set_included(&mut self, included: Map<String, Value>) {
        if included.is_empty() {
            self.body.remove(INCLUDED_KEY);
        } else {
            self.body.insert(INCLUDED_KEY.to_string(), Value::Object(included));
        }
    }

    /// Transform one item into `data`, side-loading requested includes.
    ///
    /// # Errors
    ///
    /// Fails when the transformer is translatable and the builder has no
    /// request context.
    pub fn set_transformable_item<T, R>(
        &mut self,
        item: &T,
        transformer: &mut R,
    ) -> Result<&mut Self, ApiError>
    where
        R: Transformer<T> + ?Sized,
    {
        self.prepare::<T, R>(transformer)?;
        let data = transformer.transform(item);
        let included = self.collect_includes(transformer, std::iter::once(item));
        self.set_data(DATA_KEY, data);
        self.set_included(included);
        Ok(self)
    }

    /// Transform a collection into a `data` array, side-loading requested includes.
    ///
    /// # Errors
    ///
    /// Fails when the transformer is translatable and the builder has no
    /// request context.
    pub fn set_transformable_collection<T, R>(
        &mut self,
        items: &[T],
        transformer: &mut R,
    ) -> Result<&mut Self, ApiError>
    where
        R: Transformer<T> + ?Sized,
    {
        self.prepare::<T, R>(transformer)?;
        let data: Vec<Value> = items.iter().map(|item| transformer.transform(item)).collect();
        let included = self.collect_includes(transformer, items);
        self.set_data(DATA_KEY, Value::Array(data));
        self.set_included(included);
        Ok(self)
    }

    #[must_use]
    pub fn body(&self) -> Value {
        let mut body = self.body.clone();
        if !self.errors.is_empty() {
            body.insert(
                ERRORS_KEY.to_string(),
                serde_json::to_value(&self.errors).unwrap_or_default(),
            );
        }
        if let Some(code) = &self.error_code {
            body.insert(CODE_KEY.to_string(), Value::String(code.clone()));
        }
        Value::Object(body)
    }

    #[must_use]
    pub fn build(self, status: StatusCode) -> Response {
        let body = self.body();
        (status, self.headers, Json(body)).into_response()
    }
}
