#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use serde_json::Value;
use tower::ServiceExt;

use restkit::{Principal, crud_router};

pub mod product_entity;

use product_entity::{AuditedProductController, ProductController};

/// Route `tracing` output through the test harness.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let api = Router::new()
        .nest("/products", crud_router::<ProductController>())
        .nest("/audited", crud_router::<AuditedProductController>())
        .with_state(db);

    Router::new().nest("/api/v1", api)
}

/// Same routes, with `principal` attached the way an auth layer would.
pub fn setup_test_app_as(db: DatabaseConnection, principal: Principal) -> Router {
    setup_test_app(db).layer(axum::Extension(principal))
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Create a product through the API and return its JSON resource.
pub async fn create_product(app: &Router, body: &Value) -> Value {
    let response = send(app, json_request("POST", "/api/v1/products", body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateProductTable)]
    }
}

pub struct CreateProductTable;

impl MigrationName for CreateProductTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_product_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateProductTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Products::Table)
            .if_not_exists()
            .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Products::Name).string().not_null())
            .col(ColumnDef::new(Products::Price).big_integer().not_null())
            .col(ColumnDef::new(Products::Category).string().null())
            .col(
                ColumnDef::new(Products::DiscontinuedAt)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .to_owned();

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Price,
    Category,
    DiscontinuedAt,
}
