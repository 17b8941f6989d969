//! Framework-free bodies of the controller actions.
//!
//! Handlers in [`super::handlers`] only extract request parts and delegate
//! here, so each action can also be called directly from custom routes.

use axum::{
    http::{HeaderMap, StatusCode},
    response::Response,
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IdenStatic, IntoActiveModel, Iterable,
    PrimaryKeyToColumn,
};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use super::{Action, CrudController, FormMethod, Principal, check_access};
use crate::errors::ApiError;
use crate::filtering::{
    ListParams, OrderSource, Ordering, QueryBuilder, calculate_content_range,
};
use crate::response::{JsonResponseBuilder, Transformer};
use crate::validation::FormErrorAdapter;

/// Request-scoped inputs shared by every action.
#[derive(Debug, Clone, Copy)]
pub struct RequestScope<'a> {
    pub headers: &'a HeaderMap,
    pub principal: Option<&'a Principal>,
    pub includes: &'a [String],
}

impl<'a> RequestScope<'a> {
    #[must_use]
    pub fn new(headers: &'a HeaderMap, principal: Option<&'a Principal>) -> Self {
        Self {
            headers,
            principal,
            includes: &[],
        }
    }

    #[must_use]
    pub fn with_includes(mut self, includes: &'a [String]) -> Self {
        self.includes = includes;
        self
    }

    fn response(&self) -> JsonResponseBuilder {
        let mut builder = JsonResponseBuilder::for_request(self.headers);
        builder.with_includes(self.includes.to_vec());
        builder
    }
}

fn check_role<C: CrudController>(action: Action, scope: &RequestScope<'_>) -> Result<(), ApiError> {
    check_access(C::access_role(action).as_deref(), scope.principal)
}

/// Load by primary key, then run the post-load access hook.
async fn load_entity<C, D>(
    db: &D,
    action: Action,
    id: Uuid,
    scope: &RequestScope<'_>,
) -> Result<C::Model, ApiError>
where
    C: CrudController,
    D: ConnectionTrait,
{
    let model = C::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(C::RESOURCE_NAME, Some(id.to_string())))?;
    C::post_entity_load_check_access(action, &model, scope.principal).await?;
    Ok(model)
}

fn item_response<C: CrudController>(
    scope: &RequestScope<'_>,
    model: &C::Model,
) -> Result<Response, ApiError> {
    let mut transformer = C::create_transformer();
    let mut builder = scope.response();
    builder.set_transformable_item(model, &mut transformer)?;
    Ok(builder.build(StatusCode::OK))
}

/// Validate the form, write it onto `entity`, persist, and answer with the
/// transformed entity.
async fn save_form<C, D>(
    db: &D,
    scope: &RequestScope<'_>,
    mut entity: C::ActiveModel,
    form: C::Form,
    method: FormMethod,
) -> Result<Response, ApiError>
where
    C: CrudController,
    D: ConnectionTrait,
{
    if let Err(errors) = form.validate() {
        let config = C::config();
        let errors = FormErrorAdapter::adapt(&errors, C::FORM_NAME, &config.validation_error_code);
        tracing::debug!(resource = C::RESOURCE_NAME, errors = errors.len(), "Form rejected");
        return Err(ApiError::validation_failed(errors));
    }

    C::apply_form(form, &mut entity, method).map_err(ApiError::validation_failed)?;

    let model = match method {
        FormMethod::Post => entity.insert(db).await?,
        FormMethod::Put | FormMethod::Patch => entity.update(db).await?,
    };
    item_response::<C>(scope, &model)
}

/// `payload` is the decoded request body; a decoding failure is only
/// reported once the caller has passed the role check.
///
/// # Errors
///
/// 403 without the create role, 400 on invalid input, 500 on database failure.
pub async fn create<C, D>(
    db: &D,
    scope: &RequestScope<'_>,
    payload: Result<C::Form, ApiError>,
) -> Result<Response, ApiError>
where
    C: CrudController,
    D: ConnectionTrait,
{
    check_role::<C>(Action::Create, scope)?;
    let form = payload?;
    tracing::debug!(resource = C::RESOURCE_NAME, "Creating entity");
    save_form::<C, D>(db, scope, C::create_entity(), form, FormMethod::Post).await
}

/// # Errors
///
/// 403 without the read role or when the post-load check refuses, 404 when
/// the entity does not exist.
pub async fn read<C, D>(db: &D, scope: &RequestScope<'_>, id: Uuid) -> Result<Response, ApiError>
where
    C: CrudController,
    D: ConnectionTrait,
{
    check_role::<C>(Action::Read, scope)?;
    let model = load_entity::<C, D>(db, Action::Read, id, scope).await?;
    item_response::<C>(scope, &model)
}

/// The role check, the lookup and the post-load check all run before
/// `payload` is inspected.
///
/// # Errors
///
/// 403, 404 as for [`read`]; 400 on invalid input.
pub async fn update<C, D>(
    db: &D,
    scope: &RequestScope<'_>,
    id: Uuid,
    payload: Result<C::Form, ApiError>,
    method: FormMethod,
) -> Result<Response, ApiError>
where
    C: CrudController,
    D: ConnectionTrait,
{
    check_role::<C>(Action::Update, scope)?;
    let model = load_entity::<C, D>(db, Action::Update, id, scope).await?;
    let form = payload?;
    tracing::debug!(resource = C::RESOURCE_NAME, %id, ?method, "Updating entity");
    save_form::<C, D>(db, scope, model.into_active_model(), form, method).await
}

/// Delete the entity and answer with an empty object.
///
/// # Errors
///
/// 403, 404 as for [`read`].
pub async fn delete<C, D>(db: &D, scope: &RequestScope<'_>, id: Uuid) -> Result<Response, ApiError>
where
    C: CrudController,
    D: ConnectionTrait,
{
    check_role::<C>(Action::Delete, scope)?;
    let model = load_entity::<C, D>(db, Action::Delete, id, scope).await?;
    model.into_active_model().delete(db).await?;
    tracing::debug!(resource = C::RESOURCE_NAME, %id, "Deleted entity");
    Ok(scope.response().build(StatusCode::OK))
}

/// Filtered, sorted and paginated collection with `meta.pagination` and a
/// `Content-Range` header.
///
/// # Errors
///
/// 403 without the list role, 400 for malformed filter, sort or range.
pub async fn list<C, D>(
    db: &D,
    scope: &RequestScope<'_>,
    params: &ListParams,
) -> Result<Response, ApiError>
where
    C: CrudController,
    D: ConnectionTrait,
{
    check_role::<C>(Action::List, scope)?;
    let config = C::config();

    let filter = params.filter_set(&config)?;
    let pagination = params.pagination(&config)?;
    let ordering = with_primary_key_order::<C::Entity>(params.ordering()?);

    let builder = QueryBuilder::<C::Entity>::new()
        .set_filter(&filter)?
        .set_pagination(pagination)
        .set_order(&ordering)?;

    let models = builder.query().all(db).await?;
    let total = builder.total_size(db).await?;
    tracing::debug!(
        resource = C::RESOURCE_NAME,
        returned = models.len(),
        total,
        "Listed entities"
    );

    let mut transformer = C::create_transformer();
    let resource_name = transformer
        .resource_key()
        .unwrap_or(C::RESOURCE_NAME)
        .to_string();

    let mut builder = scope.response();
    builder
        .set_transformable_collection(&models, &mut transformer)?
        .set_meta("pagination", pagination_meta(pagination.offset, pagination.limit, total))
        .add_headers(calculate_content_range(
            pagination.offset,
            pagination.limit,
            total,
            &resource_name,
        ));
    Ok(builder.build(StatusCode::OK))
}

fn pagination_meta(offset: u64, limit: u64, total: u64) -> Value {
    json!({ "total": total, "offset": offset, "limit": limit })
}

/// Primary key columns break ties so pages stay stable.
fn with_primary_key_order<E: EntityTrait>(ordering: Ordering) -> Ordering {
    E::PrimaryKey::iter()
        .map(|key| key.into_column())
        .fold(ordering, |ordering, column| {
            let name = column.as_str();
            if ordering.order().iter().any(|(field, _)| *field == name) {
                ordering
            } else {
                ordering.asc(name)
            }
        })
}
