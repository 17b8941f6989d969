use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::{JsonRejection, PathRejection, QueryRejection}},
    http::{HeaderMap, Method},
    response::Response,
    routing::get,
};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::crud_operations::{self, RequestScope};
use super::{CrudController, CurrentPrincipal, FormMethod};
use crate::errors::ApiError;
use crate::filtering::{ItemParams, ListParams};
use crate::validation::payload_error;

type Payload<C> = Result<Json<<C as CrudController>::Form>, JsonRejection>;

/// Decoding failures are carried into the operation, which reports them
/// after its access checks.
fn decode<C: CrudController>(payload: Payload<C>) -> Result<C::Form, ApiError> {
    payload
        .map(|Json(form)| form)
        .map_err(|rejection| payload_error(&rejection))
}

fn path_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub async fn list_handler<C: CrudController>(
    State(db): State<DatabaseConnection>,
    CurrentPrincipal(principal): CurrentPrincipal,
    headers: HeaderMap,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query(params)?;
    let includes = params.includes();
    let scope = RequestScope::new(&headers, principal.as_ref()).with_includes(&includes);
    crud_operations::list::<C, _>(&db, &scope, &params).await
}

pub async fn create_handler<C: CrudController>(
    State(db): State<DatabaseConnection>,
    CurrentPrincipal(principal): CurrentPrincipal,
    headers: HeaderMap,
    params: Result<Query<ItemParams>, QueryRejection>,
    payload: Payload<C>,
) -> Result<Response, ApiError> {
    let includes = query(params)?.includes();
    let scope = RequestScope::new(&headers, principal.as_ref()).with_includes(&includes);
    crud_operations::create::<C, _>(&db, &scope, decode::<C>(payload)).await
}

pub async fn read_handler<C: CrudController>(
    State(db): State<DatabaseConnection>,
    CurrentPrincipal(principal): CurrentPrincipal,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
    params: Result<Query<ItemParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let id = path_id(path)?;
    let includes = query(params)?.includes();
    let scope = RequestScope::new(&headers, principal.as_ref()).with_includes(&includes);
    crud_operations::read::<C, _>(&db, &scope, id).await
}

/// Serves both `PUT` and `PATCH`; the method is forwarded to
/// [`CrudController::apply_form`].
pub async fn update_handler<C: CrudController>(
    State(db): State<DatabaseConnection>,
    CurrentPrincipal(principal): CurrentPrincipal,
    method: Method,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
    params: Result<Query<ItemParams>, QueryRejection>,
    payload: Payload<C>,
) -> Result<Response, ApiError> {
    let id = path_id(path)?;
    let includes = query(params)?.includes();
    let scope = RequestScope::new(&headers, principal.as_ref()).with_includes(&includes);
    let form_method = if method == Method::PATCH {
        FormMethod::Patch
    } else {
        FormMethod::Put
    };
    crud_operations::update::<C, _>(&db, &scope, id, decode::<C>(payload), form_method).await
}

pub async fn delete_handler<C: CrudController>(
    State(db): State<DatabaseConnection>,
    CurrentPrincipal(principal): CurrentPrincipal,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path_id(path)?;
    let scope = RequestScope::new(&headers, principal.as_ref());
    crud_operations::delete::<C, _>(&db, &scope, id).await
}

/// Routes for one controller, to be nested under the resource path.
///
/// ```rust,ignore
/// let app = Router::new()
///     .nest("/products", crud_router::<ProductController>())
///     .with_state(db);
/// ```
pub fn crud_router<C: CrudController>() -> Router<DatabaseConnection> {
    Router::new()
        .route("/", get(list_handler::<C>).post(create_handler::<C>))
        .route(
            "/{id}",
            get(read_handler::<C>)
                .put(update_handler::<C>)
                .patch(update_handler::<C>)
                .delete(delete_handler::<C>),
        )
}
