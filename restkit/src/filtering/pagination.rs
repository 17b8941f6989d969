use axum::http::{HeaderValue, header::HeaderMap};

use super::{FilterError, ListParams};
use crate::config::RestkitConfig;

pub const CONTENT_RANGE: &str = "Content-Range";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// 1-based page numbers; page 0 is treated as page 1.
    #[must_use]
    pub const fn from_page(page: u64, per_page: u64) -> Self {
        Self {
            offset: page.saturating_sub(1).saturating_mul(per_page),
            limit: per_page,
        }
    }

    /// Resolve pagination from list parameters.
    ///
    /// `page`/`per_page` win over `offset`/`limit`, which win over the
    /// React Admin `range=[start,end]`. The limit is clamped to the configured
    /// maximum.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidPagination`] for a malformed `range`.
    pub fn from_params(params: &ListParams, config: &RestkitConfig) -> Result<Self, FilterError> {
        let requested = if let Some(page) = params.page {
            let per_page = params.per_page.unwrap_or(config.default_limit);
            Self::from_page(page, config.clamp_limit(per_page))
        } else if params.offset.is_some() || params.limit.is_some() {
            Self::new(
                params.offset.unwrap_or(0),
                params.limit.unwrap_or(config.default_limit),
            )
        } else if let Some(range) = &params.range {
            let (start, end) = parse_range(range)?;
            Self::new(start, end.saturating_sub(start).saturating_add(1))
        } else {
            Self::new(0, config.default_limit)
        };

        Ok(Self {
            offset: requested.offset,
            limit: config.clamp_limit(requested.limit),
        })
    }
}

/// Parse a React Admin `[start, end]` range (both inclusive).
///
/// # Errors
///
/// Returns [`FilterError::InvalidPagination`] when the input is not a
/// two-element array of unsigned integers or `end < start`.
pub fn parse_range(raw: &str) -> Result<(u64, u64), FilterError> {
    let [start, end] = serde_json::from_str::<[u64; 2]>(raw)
        .map_err(|e| FilterError::InvalidPagination(e.to_string()))?;
    if end < start {
        return Err(FilterError::InvalidPagination(format!(
            "range end {end} is before start {start}"
        )));
    }
    Ok((start, end))
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Build the `Content-Range: <resource> <first>-<last>/<total>` header for a page.
///
/// A page that starts at or past the end (including any page of an empty
/// collection) is reported as `<resource> */<total>`.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    limit: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let range = if offset >= total_count || limit == 0 {
        "*".to_string()
    } else {
        let last = offset.saturating_add(limit).min(total_count) - 1;
        format!("{offset}-{last}")
    };
    let safe_name = sanitize_resource_name(resource_name);
    let content_range = format!("{safe_name} {range}/{total_count}");

    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&content_range).unwrap_or_else(|_| {
        HeaderValue::from_str(&format!("items {range}/{total_count}"))
            .unwrap_or(HeaderValue::from_static("items */0"))
    });
    headers.insert(CONTENT_RANGE, value);
    headers
}
