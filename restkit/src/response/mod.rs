//! # JSON Resource Responses
//!
//! Entities are turned into client-facing JSON by a [`Transformer`], and the
//! [`JsonResponseBuilder`] assembles the response envelope:
//!
//! ```json
//! {
//!   "data": {"id": "…", "name": "Widget"},
//!   "included": {"category": [{"id": "…", "title": "Tools"}]},
//!   "meta": {"pagination": {"total": 42, "offset": 0, "limit": 10}}
//! }
//! ```
//!
//! Failed requests carry `errors` (and a list-level `code` for form failures)
//! instead of `data`.

pub mod builder;
pub mod language;
pub mod transformer;

pub use builder::JsonResponseBuilder;
pub use language::{accepted_languages, preferred_language};
pub use transformer::{Transformer, Translatable};
