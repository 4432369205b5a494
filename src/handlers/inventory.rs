// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    db::inventory_repo::MovementFilter,
    models::{
        dashboard::MovementKindTotals,
        inventory::{Category, MovementKind, Product, StockMovement},
    },
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// =============================================================================
//  Categorias
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Água Mineral")]
    pub name: String,

    pub description: Option<String>,
}

// POST /api/inventory/categories
#[utoipa::path(
    post,
    path = "/api/inventory/categories",
    tag = "Inventory",
    request_body = CategoryPayload,
    responses((status = 201, description = "Categoria criada", body = Category))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .inventory_service
        .create_category(
            &app_state.db_pool,
            &payload.name,
            payload.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/inventory/categories
#[utoipa::path(
    get,
    path = "/api/inventory/categories",
    tag = "Inventory",
    responses((status = 200, description = "Lista de categorias", body = [Category]))
)]
pub async fn get_all_categories(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state
        .inventory_service
        .get_all_categories(&app_state.db_pool)
        .await?;
    Ok((StatusCode::OK, Json(categories)))
}

// GET /api/inventory/categories/{id}
#[utoipa::path(
    get,
    path = "/api/inventory/categories/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses((status = 200, body = Category), (status = 404, description = "Não encontrada"))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state
        .inventory_service
        .get_category(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(category)))
}

// PUT /api/inventory/categories/{id}
#[utoipa::path(
    put,
    path = "/api/inventory/categories/{id}",
    tag = "Inventory",
    request_body = CategoryPayload,
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses((status = 200, body = Category))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .inventory_service
        .update_category(
            &app_state.db_pool,
            id,
            &payload.name,
            payload.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(category)))
}

// DELETE /api/inventory/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/inventory/categories/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses((status = 204, description = "Categoria removida"))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .inventory_service
        .delete_category(&app_state.db_pool, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  Produtos
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub category_id: Uuid,

    #[validate(length(min = 1, message = "O código é obrigatório."))]
    #[schema(example = "GALAO-20L")]
    pub code: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub sale_price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub cost_price: Decimal,

    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    #[serde(default)]
    pub minimum_stock: i32,

    // Estoque inicial do cadastro (sem movimentação de entrada)
    #[validate(range(min = 0, message = "O estoque inicial não pode ser negativo."))]
    #[serde(default)]
    pub initial_quantity: i32,

    #[schema(example = "UN")]
    pub unit: Option<String>,
}

// POST /api/inventory/products
#[utoipa::path(
    post,
    path = "/api/inventory/products",
    tag = "Inventory",
    request_body = CreateProductPayload,
    responses((status = 201, description = "Produto criado", body = Product))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .inventory_service
        .create_product(
            &app_state.db_pool,
            payload.category_id,
            &payload.code,
            &payload.name,
            payload.sale_price,
            payload.cost_price,
            payload.minimum_stock,
            payload.initial_quantity,
            payload.unit.as_deref().unwrap_or("UN"),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Busca por nome ou código
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
}

// GET /api/inventory/products
#[utoipa::path(
    get,
    path = "/api/inventory/products",
    tag = "Inventory",
    params(ProductQuery),
    responses((status = 200, description = "Produtos ativos", body = [Product]))
)]
pub async fn get_all_products(
    State(app_state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .inventory_service
        .get_all_products(
            &app_state.db_pool,
            query.search.as_deref(),
            query.category_id,
        )
        .await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /api/inventory/products/{id}
#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, body = Product), (status = 404, description = "Não encontrado"))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .inventory_service
        .get_product(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(product)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    pub category_id: Uuid,

    #[validate(length(min = 1, message = "O código é obrigatório."))]
    pub code: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub sale_price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub cost_price: Decimal,

    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    pub minimum_stock: i32,

    pub unit: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// PUT /api/inventory/products/{id}
// A quantidade em estoque fica de fora de propósito: saldo só muda por
// movimentação ou venda.
#[utoipa::path(
    put,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    request_body = UpdateProductPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, body = Product))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .inventory_service
        .update_product(
            &app_state.db_pool,
            id,
            payload.category_id,
            &payload.code,
            &payload.name,
            payload.sale_price,
            payload.cost_price,
            payload.minimum_stock,
            payload.unit.as_deref().unwrap_or("UN"),
            payload.is_active,
        )
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

// DELETE /api/inventory/products/{id}
#[utoipa::path(
    delete,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 204, description = "Produto removido"))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .inventory_service
        .delete_product(&app_state.db_pool, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Consulta rápida de preço/saldo (usada pela tela de checkout)
// ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPriceResponse {
    pub sale_price: Decimal,
    pub current_quantity: i32,
}

// GET /api/inventory/products/{id}/price
#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}/price",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, body = ProductPriceResponse))
)]
pub async fn get_product_price(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .inventory_service
        .get_product(&app_state.db_pool, id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ProductPriceResponse {
            sale_price: product.sale_price,
            current_quantity: product.current_quantity,
        }),
    ))
}

// =============================================================================
//  Movimentações de Estoque
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMovementPayload {
    pub product_id: Uuid,

    #[schema(example = "ENTRY")]
    pub kind: MovementKind,

    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub quantity: i32,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Option<Decimal>,

    /// Forma de pagamento (faz sentido nas saídas/vendas)
    pub payment_method_id: Option<Uuid>,

    pub note: Option<String>,
    pub operator_id: Uuid,
    pub moved_at: Option<DateTime<Utc>>,
}

impl RegisterMovementPayload {
    // Ajuste aceita zero (zerar o estoque); entrada e saída não.
    fn validate_consistency(&self) -> Result<(), ValidationError> {
        if self.kind != MovementKind::Adjustment && self.quantity < 1 {
            return Err(ValidationError::new("QuantityRequired"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementRegistered {
    pub movement: StockMovement,
    /// Produto já com o saldo atualizado
    pub product: Product,
}

// POST /api/inventory/movements
#[utoipa::path(
    post,
    path = "/api/inventory/movements",
    tag = "Inventory",
    request_body = RegisterMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada", body = MovementRegistered),
        (status = 422, description = "Estoque insuficiente para a saída")
    )
)]
pub async fn create_movement(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterMovementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    payload.validate_consistency().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("quantity", e);
        AppError::ValidationError(errors)
    })?;

    let (movement, product) = app_state
        .inventory_service
        .record_movement(
            &app_state.db_pool,
            payload.product_id,
            payload.kind,
            payload.quantity,
            payload.unit_price,
            payload.payment_method_id,
            payload.note.as_deref(),
            payload.operator_id,
            payload.moved_at,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MovementRegistered { movement, product }),
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MovementQuery {
    pub product_id: Option<Uuid>,
    pub kind: Option<MovementKind>,
    /// Data inicial (inclusiva)
    pub from: Option<NaiveDate>,
    /// Data final (inclusiva)
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementListResponse {
    pub movements: Vec<StockMovement>,
    /// Totais por tipo sobre o recorte filtrado
    pub totals: Vec<MovementKindTotals>,
}

// GET /api/inventory/movements
#[utoipa::path(
    get,
    path = "/api/inventory/movements",
    tag = "Inventory",
    params(MovementQuery),
    responses((status = 200, body = MovementListResponse))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = MovementFilter {
        product_id: query.product_id,
        kind: query.kind,
        from: query.from,
        to: query.to,
    };

    let (movements, totals) = app_state
        .inventory_service
        .list_movements(&app_state.db_pool, &filter)
        .await?;

    Ok((StatusCode::OK, Json(MovementListResponse { movements, totals })))
}

// GET /api/inventory/movements/{id}
#[utoipa::path(
    get,
    path = "/api/inventory/movements/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses((status = 200, body = StockMovement))
)]
pub async fn get_movement(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let movement = app_state
        .inventory_service
        .get_movement(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(movement)))
}

// DELETE /api/inventory/movements/{id}
// Exclusão é estorno: o efeito no saldo é desfeito antes de apagar.
#[utoipa::path(
    delete,
    path = "/api/inventory/movements/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses(
        (status = 204, description = "Movimentação estornada e removida"),
        (status = 422, description = "Movimentação pertence a uma venda")
    )
)]
pub async fn delete_movement(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .inventory_service
        .delete_movement(&app_state.db_pool, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
