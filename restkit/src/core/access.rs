use axum::{extract::FromRequestParts, http::request::Parts};
use std::collections::BTreeSet;
use std::convert::Infallible;

use crate::errors::ApiError;

/// The authenticated caller, inserted as a request extension by the host
/// application's authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    pub subject: Option<String>,
    roles: BTreeSet<String>,
}

impl Principal {
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            roles: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    #[must_use]
    pub fn is_granted(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}

/// Extracts the request's [`Principal`], if the auth layer attached one.
#[derive(Debug, Clone, Default)]
pub struct CurrentPrincipal(pub Option<Principal>);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Principal>().cloned()))
    }
}

/// `None` means unrestricted; otherwise the principal must hold `role`.
///
/// # Errors
///
/// Returns a 403 [`ApiError`] when the role is required and not granted.
pub fn check_access(role: Option<&str>, principal: Option<&Principal>) -> Result<(), ApiError> {
    match role {
        Some(role) if !principal.is_some_and(|p| p.is_granted(role)) => {
            tracing::debug!(role, subject = ?principal.and_then(|p| p.subject.as_deref()), "Access denied");
            Err(ApiError::access_denied())
        }
        _ => Ok(()),
    }
}
