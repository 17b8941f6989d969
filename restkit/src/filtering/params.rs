use serde::Deserialize;
use serde_with::{StringWithSeparator, formats::CommaSeparator, serde_as};
use utoipa::IntoParams;

use super::{FilterError, FilterSet, Ordering, Pagination};
use crate::config::RestkitConfig;

/// Query parameters accepted by list endpoints.
///
/// # Filtering
/// `filter` is a JSON object mapping field names to criteria:
/// - exact match: `{"name": "Widget"}`
/// - range: `{"price": {"from": 10, "to": 20}}`
/// - substring: `{"name": {"like": "wid"}}`
/// - null check: `{"discontinued_at": null}`
///
/// # Pagination
/// `page`/`per_page` (1-based), `offset`/`limit`, or React Admin `range=[0,9]`.
///
/// # Sorting
/// `sort=-price,name` or `sort=["price","DESC"]`.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// JSON-encoded filter object
    #[param(example = json!({"name": {"like": "wid"}, "price": {"from": 10}}))]
    pub filter: Option<String>,
    /// Page number (1-based)
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page
    #[param(example = 10)]
    pub per_page: Option<u64>,
    /// Number of items to skip
    pub offset: Option<u64>,
    /// Maximum number of items to return
    pub limit: Option<u64>,
    /// React Admin range, inclusive on both ends
    #[param(example = "[0,9]")]
    pub range: Option<String>,
    /// Comma-separated sort keys; a leading `-` sorts descending
    #[param(example = "-price,name")]
    pub sort: Option<String>,
    /// Comma-separated related resources to side-load
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, String>")]
    #[serde(default)]
    #[param(value_type = Option<String>, example = "category")]
    pub include: Vec<String>,
}

impl ListParams {
    /// # Errors
    ///
    /// Returns a [`FilterError`] when `filter` is malformed.
    pub fn filter_set(&self, config: &RestkitConfig) -> Result<FilterSet, FilterError> {
        let set = match &self.filter {
            Some(raw) => FilterSet::from_json_str(raw)?,
            None => FilterSet::new(),
        };
        Ok(set.with_collection_max_size(config.collection_max_size))
    }

    /// # Errors
    ///
    /// Returns a [`FilterError`] when `sort` is malformed.
    pub fn ordering(&self) -> Result<Ordering, FilterError> {
        self.sort
            .as_deref()
            .map_or_else(|| Ok(Ordering::new()), Ordering::parse)
    }

    /// # Errors
    ///
    /// Returns a [`FilterError`] when `range` is malformed.
    pub fn pagination(&self, config: &RestkitConfig) -> Result<Pagination, FilterError> {
        Pagination::from_params(self, config)
    }

    #[must_use]
    pub fn includes(&self) -> Vec<String> {
        trimmed(&self.include)
    }
}

/// Query parameters accepted by single-item endpoints.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemParams {
    /// Comma-separated related resources to side-load
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, String>")]
    #[serde(default)]
    #[param(value_type = Option<String>, example = "category")]
    pub include: Vec<String>,
}

impl ItemParams {
    #[must_use]
    pub fn includes(&self) -> Vec<String> {
        trimmed(&self.include)
    }
}

fn trimmed(include: &[String]) -> Vec<String> {
    include
        .iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
