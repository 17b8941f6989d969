//! # Generic CRUD Controller
//!
//! Implement [`CrudController`] once per entity and mount [`crud_router`]:
//!
//! | Route | Method | Action |
//! |---|---|---|
//! | `/` | `GET` | [`Action::List`] |
//! | `/` | `POST` | [`Action::Create`] |
//! | `/{id}` | `GET` | [`Action::Read`] |
//! | `/{id}` | `PUT`, `PATCH` | [`Action::Update`] |
//! | `/{id}` | `DELETE` | [`Action::Delete`] |
//!
//! Each action checks its configured role against the request's
//! [`Principal`], loads the entity (404 when missing), runs the
//! post-load access hook, and answers through the resource transformer.

pub mod access;
pub mod crud_operations;
pub mod handlers;
pub mod traits;

pub use access::{CurrentPrincipal, Principal, check_access};
pub use handlers::crud_router;
pub use traits::{Action, CrudController, FormMethod, Roles};
