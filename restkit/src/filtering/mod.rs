//! # Dynamic Filtering, Ordering & Pagination
//!
//! Translates caller-supplied criteria into a parameterized Sea-ORM `Select`.
//!
//! | Value shape | Condition |
//! |---|---|
//! | string / number / boolean | `field = ?` |
//! | date/time | `field = ?` |
//! | range | `field >= ?` and/or `field <= ?` |
//! | partial text | `field LIKE ?` bound as `%text%` |
//! | empty marker | `field IS NULL` |
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Exact match and null check
//! GET /products?filter={"name":"Widget","discontinued_at":null}
//!
//! // Range and substring match
//! GET /products?filter={"price":{"from":10,"to":20},"name":{"like":"wid"}}
//!
//! // Ordering: leading '-' is descending
//! GET /products?sort=-price,name
//!
//! // Pagination
//! GET /products?page=2&per_page=25
//! GET /products?offset=50&limit=25
//! GET /products?range=[0,24]
//! ```
//!
//! ## Building queries directly
//!
//! ```rust,ignore
//! let filter = FilterSet::new()
//!     .equals("active", true)
//!     .range("price", Some(10), Some(20))
//!     .like("name", "wid");
//!
//! let builder = QueryBuilder::<product::Entity>::new()
//!     .set_filter(&filter)?
//!     .set_pagination(Pagination::new(0, 25))
//!     .set_order(&Ordering::parse("-price")?)?;
//!
//! let rows = builder.query().all(&db).await?;
//! let total = builder.total_size(&db).await?;
//! ```

pub mod conditions;
pub mod model;
pub mod pagination;
pub mod params;
pub mod query_builder;
pub mod sort;
pub mod value;

use std::fmt;

pub use conditions::{QualifiedColumn, condition_for, resolve_column};
pub use model::{Filter, FilterSet};
pub use pagination::{Pagination, calculate_content_range, parse_range};
pub use params::{ItemParams, ListParams};
pub use query_builder::QueryBuilder;
pub use sort::{Direction, OrderSource, Ordering};
pub use value::{Bound, FilterValue, ScalarValue};

/// Rejected filter, sort or pagination input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// An unqualified field that is not a column of the entity
    UnknownField(String),
    /// A field or alias containing characters not allowed in an identifier
    InvalidFieldName(String),
    /// A filter value whose shape has no translation
    UnsupportedValue { field: String, reason: String },
    /// The `filter` parameter was not a JSON object
    InvalidJson(String),
    /// The `sort` parameter could not be parsed
    InvalidSort(String),
    /// The `range` or page parameters could not be parsed
    InvalidPagination(String),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField(field) => write!(f, "Unknown field '{field}'"),
            Self::InvalidFieldName(field) => write!(f, "Invalid field name '{field}'"),
            Self::UnsupportedValue { field, reason } => {
                write!(f, "Unsupported filter value for '{field}': {reason}")
            }
            Self::InvalidJson(reason) => write!(f, "Invalid filter: {reason}"),
            Self::InvalidSort(reason) => write!(f, "Invalid sort: {reason}"),
            Self::InvalidPagination(reason) => write!(f, "Invalid pagination: {reason}"),
        }
    }
}

impl std::error::Error for FilterError {}
