//! # restkit
//!
//! Helpers for exposing Sea-ORM entities as REST resources in Axum.
//!
//! - [`core`]: a generic CRUD controller trait with role checks and an Axum router
//! - [`filtering`]: translates caller filters, pagination and ordering into Sea-ORM queries
//! - [`validation`]: adapts `validator` errors into a flat, path-addressed error list
//! - [`response`]: a JSON response builder driven by resource transformers
//!
//! ```rust,ignore
//! use restkit::core::crud_router;
//!
//! let app = axum::Router::new()
//!     .nest("/products", crud_router::<ProductController>())
//!     .with_state(db);
//! ```

pub mod config;
pub mod core;
pub mod error_list;
pub mod errors;
pub mod filtering;
pub mod response;
pub mod validation;

pub use config::RestkitConfig;
pub use core::{Action, CrudController, FormMethod, Principal, Roles, crud_router};
pub use error_list::{ErrorItem, ErrorList};
pub use errors::ApiError;
pub use filtering::{
    Direction, Filter, FilterError, FilterSet, FilterValue, ItemParams, ListParams, Ordering,
    Pagination, QueryBuilder,
};
pub use response::{JsonResponseBuilder, Transformer, Translatable};
pub use validation::{FormErrorAdapter, ValidatedForm};
