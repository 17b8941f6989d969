use async_trait::async_trait;
use restkit::{
    Action, ApiError, CrudController, ErrorItem, ErrorList, FormMethod, Principal, Roles,
    Transformer, Translatable,
};
use sea_orm::{Set, entity::prelude::*};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub category: Option<String>,
    pub discontinued_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            ..ActiveModelTrait::default()
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductForm {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Name must be between {{ min }} and {{ max }} characters."
    ))]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "Price must be at least {{ min }}."))]
    pub price: Option<i64>,
    pub category: Option<String>,
    pub discontinued_at: Option<DateTimeWithTimeZone>,
}

/// Full submissions must name and price the product; partial ones may not.
fn apply_product_form(
    form: ProductForm,
    entity: &mut ActiveModel,
    method: FormMethod,
    form_name: &str,
) -> Result<(), ErrorList> {
    let mut errors = ErrorList::default();
    let origin = |field: &str| {
        if form_name.is_empty() {
            field.to_string()
        } else {
            format!("{form_name}[{field}]")
        }
    };

    match form.name {
        Some(name) => entity.name = Set(name),
        None if !method.is_partial() => {
            errors.add(not_blank(origin("name")));
        }
        None => {}
    }
    match form.price {
        Some(price) => entity.price = Set(price),
        None if !method.is_partial() => {
            errors.add(not_blank(origin("price")));
        }
        None => {}
    }
    if form.category.is_some() || !method.is_partial() {
        entity.category = Set(form.category);
    }
    if form.discontinued_at.is_some() || !method.is_partial() {
        entity.discontinued_at = Set(form.discontinued_at);
    }

    errors.result()
}

fn not_blank(origin: String) -> ErrorItem {
    ErrorItem::new("This value should not be blank.", "not_blank").with_origin(origin)
}

/// Localizes the `label` field; side-loads `category`.
#[derive(Debug, Default)]
pub struct ProductTransformer {
    language: String,
}

impl Transformer<Model> for ProductTransformer {
    fn resource_key(&self) -> Option<&str> {
        Some("products")
    }

    fn transform(&self, product: &Model) -> Value {
        let label = if self.language.starts_with("fr") {
            "Produit"
        } else {
            "Product"
        };
        json!({
            "id": product.id,
            "name": product.name,
            "price": product.price,
            "category": product.category,
            "discontinued": product.discontinued_at.is_some(),
            "label": label,
        })
    }

    fn available_includes(&self) -> &[&'static str] {
        &["category"]
    }

    fn include(&self, name: &str, product: &Model) -> Option<Value> {
        match name {
            "category" => product
                .category
                .as_ref()
                .map(|category| json!({ "name": category })),
            _ => None,
        }
    }

    fn as_translatable(&mut self) -> Option<&mut dyn Translatable> {
        Some(self)
    }
}

impl Translatable for ProductTransformer {
    fn set_language(&mut self, language: &str) {
        self.language = language.to_string();
    }
}

/// Unrestricted controller.
pub struct ProductController;

impl CrudController for ProductController {
    type Entity = Entity;
    type Model = Model;
    type PrimaryKey = PrimaryKey;
    type ActiveModel = ActiveModel;
    type Form = ProductForm;
    type Transformer = ProductTransformer;

    const RESOURCE_NAME: &'static str = "product";
    const FORM_NAME: &'static str = "product";

    fn apply_form(
        form: ProductForm,
        entity: &mut ActiveModel,
        method: FormMethod,
    ) -> Result<(), ErrorList> {
        apply_product_form(form, entity, method, Self::FORM_NAME)
    }

    fn create_transformer() -> ProductTransformer {
        ProductTransformer::default()
    }
}

pub const EDITOR: &str = "ROLE_EDITOR";
pub const ADMIN: &str = "ROLE_ADMIN";

/// Editors write, admins delete, anyone reads. Discontinued products can only
/// be changed by admins.
pub struct AuditedProductController;

#[async_trait]
impl CrudController for AuditedProductController {
    type Entity = Entity;
    type Model = Model;
    type PrimaryKey = PrimaryKey;
    type ActiveModel = ActiveModel;
    type Form = ProductForm;
    type Transformer = ProductTransformer;

    const RESOURCE_NAME: &'static str = "audited product";

    fn roles() -> Roles {
        Roles::all(EDITOR)
            .unrestrict(Action::Read)
            .unrestrict(Action::List)
            .require(Action::Delete, ADMIN)
    }

    fn apply_form(
        form: ProductForm,
        entity: &mut ActiveModel,
        method: FormMethod,
    ) -> Result<(), ErrorList> {
        apply_product_form(form, entity, method, Self::FORM_NAME)
    }

    fn create_transformer() -> ProductTransformer {
        ProductTransformer::default()
    }

    async fn post_entity_load_check_access(
        action: Action,
        product: &Model,
        principal: Option<&Principal>,
    ) -> Result<(), ApiError> {
        let is_admin = principal.is_some_and(|p| p.is_granted(ADMIN));
        if action == Action::Update && product.discontinued_at.is_some() && !is_admin {
            return Err(ApiError::forbidden("Discontinued products are read-only"));
        }
        Ok(())
    }
}
