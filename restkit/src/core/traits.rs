use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, EntityTrait, FromQueryResult, IntoActiveModel,
    ModelTrait, PrimaryKeyTrait,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use super::Principal;
use crate::config::RestkitConfig;
use crate::error_list::ErrorList;
use crate::errors::ApiError;
use crate::response::Transformer;

/// The operations a controller exposes; each may carry its own role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Action {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
        }
    }
}

/// Role required per action. `None` leaves the action unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles {
    create: Option<String>,
    read: Option<String>,
    update: Option<String>,
    delete: Option<String>,
    list: Option<String>,
}

impl Roles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same role for every action.
    #[must_use]
    pub fn all(role: impl Into<String>) -> Self {
        let role = role.into();
        Self {
            create: Some(role.clone()),
            read: Some(role.clone()),
            update: Some(role.clone()),
            delete: Some(role.clone()),
            list: Some(role),
        }
    }

    #[must_use]
    pub fn require(mut self, action: Action, role: impl Into<String>) -> Self {
        *self.slot(action) = Some(role.into());
        self
    }

    #[must_use]
    pub fn unrestrict(mut self, action: Action) -> Self {
        *self.slot(action) = None;
        self
    }

    #[must_use]
    pub fn get(&self, action: Action) -> Option<&str> {
        match action {
            Action::Create => self.create.as_deref(),
            Action::Read => self.read.as_deref(),
            Action::Update => self.update.as_deref(),
            Action::Delete => self.delete.as_deref(),
            Action::List => self.list.as_deref(),
        }
    }

    fn slot(&mut self, action: Action) -> &mut Option<String> {
        match action {
            Action::Create => &mut self.create,
            Action::Read => &mut self.read,
            Action::Update => &mut self.update,
            Action::Delete => &mut self.delete,
            Action::List => &mut self.list,
        }
    }
}

/// How the form arrived. `Patch` submissions carry only the changed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Post,
    Put,
    Patch,
}

impl FormMethod {
    #[must_use]
    pub fn is_partial(self) -> bool {
        matches!(self, Self::Patch)
    }
}

/// Binds an entity to its form, transformer and access rules.
///
/// The controller is a type-level description; every hook is an associated
/// function and the generic operations in [`crate::core::crud_operations`]
/// drive them.
#[async_trait]
pub trait CrudController: Sized + Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model, PrimaryKey = Self::PrimaryKey> + Sync;
    type Model: IntoActiveModel<Self::ActiveModel>
        + FromQueryResult
        + ModelTrait<Entity = Self::Entity>
        + Send
        + Sync;
    type PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;
    type Form: DeserializeOwned + Validate + Send + 'static;
    type Transformer: Transformer<Self::Model>;

    /// Used in not-found messages and as the fallback `Content-Range` unit.
    const RESOURCE_NAME: &'static str;
    /// Root of every validation error origin, e.g. `product[name]`.
    const FORM_NAME: &'static str = "";

    #[must_use]
    fn roles() -> Roles {
        Roles::default()
    }

    #[must_use]
    fn access_role(action: Action) -> Option<String> {
        Self::roles().get(action).map(str::to_string)
    }

    #[must_use]
    fn config() -> RestkitConfig {
        RestkitConfig::default()
    }

    #[must_use]
    fn create_entity() -> Self::ActiveModel {
        <Self::ActiveModel as ActiveModelBehavior>::new()
    }

    /// Write a validated form onto the entity.
    ///
    /// # Errors
    ///
    /// Returns field errors for constraints the form's own validation cannot
    /// express; they are answered with 400 like validation failures.
    fn apply_form(
        form: Self::Form,
        entity: &mut Self::ActiveModel,
        method: FormMethod,
    ) -> Result<(), ErrorList>;

    fn create_transformer() -> Self::Transformer;

    /// Runs after the entity is loaded for read, update and delete.
    ///
    /// # Errors
    ///
    /// Return [`ApiError::access_denied`] to refuse the action.
    async fn post_entity_load_check_access(
        _action: Action,
        _entity: &Self::Model,
        _principal: Option<&Principal>,
    ) -> Result<(), ApiError> {
        Ok(())
    }
}
