// src/handlers/parties.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::parties::{Customer, Operator, Supplier},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Busca por nome ou CPF/CNPJ
    pub search: Option<String>,
}

// =============================================================================
//  Fornecedores
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O CNPJ é obrigatório."))]
    #[schema(example = "12.345.678/0001-90")]
    pub tax_id: String,

    #[validate(length(min = 1, message = "O telefone é obrigatório."))]
    pub phone: String,

    #[validate(email(message = "E-mail inválido."))]
    pub email: String,

    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// POST /api/parties/suppliers
#[utoipa::path(
    post,
    path = "/api/parties/suppliers",
    tag = "Parties",
    request_body = SupplierPayload,
    responses((status = 201, description = "Fornecedor criado", body = Supplier))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let supplier = app_state
        .parties_service
        .create_supplier(
            &app_state.db_pool,
            &payload.name,
            &payload.tax_id,
            &payload.phone,
            &payload.email,
            &payload.address,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

// GET /api/parties/suppliers
#[utoipa::path(
    get,
    path = "/api/parties/suppliers",
    tag = "Parties",
    params(SearchQuery),
    responses((status = 200, description = "Fornecedores ativos", body = [Supplier]))
)]
pub async fn get_all_suppliers(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state
        .parties_service
        .get_all_suppliers(&app_state.db_pool, query.search.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(suppliers)))
}

// GET /api/parties/suppliers/{id}
#[utoipa::path(
    get,
    path = "/api/parties/suppliers/{id}",
    tag = "Parties",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses((status = 200, body = Supplier))
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = app_state
        .parties_service
        .get_supplier(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(supplier)))
}

// PUT /api/parties/suppliers/{id}
#[utoipa::path(
    put,
    path = "/api/parties/suppliers/{id}",
    tag = "Parties",
    request_body = SupplierPayload,
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses((status = 200, body = Supplier))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let supplier = app_state
        .parties_service
        .update_supplier(
            &app_state.db_pool,
            id,
            &payload.name,
            &payload.tax_id,
            &payload.phone,
            &payload.email,
            &payload.address,
            payload.is_active,
        )
        .await?;

    Ok((StatusCode::OK, Json(supplier)))
}

// DELETE /api/parties/suppliers/{id}
#[utoipa::path(
    delete,
    path = "/api/parties/suppliers/{id}",
    tag = "Parties",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses((status = 204, description = "Fornecedor removido"))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .parties_service
        .delete_supplier(&app_state.db_pool, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  Clientes
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O CPF/CNPJ é obrigatório."))]
    #[schema(example = "123.456.789-10")]
    pub tax_id: String,

    #[validate(length(min = 1, message = "O telefone é obrigatório."))]
    pub phone: String,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

// POST /api/parties/customers
#[utoipa::path(
    post,
    path = "/api/parties/customers",
    tag = "Parties",
    request_body = CustomerPayload,
    responses((status = 201, description = "Cliente criado", body = Customer))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state
        .parties_service
        .create_customer(
            &app_state.db_pool,
            &payload.name,
            &payload.tax_id,
            &payload.phone,
            payload.email.as_deref(),
            &payload.address,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/parties/customers
#[utoipa::path(
    get,
    path = "/api/parties/customers",
    tag = "Parties",
    params(SearchQuery),
    responses((status = 200, description = "Clientes ativos", body = [Customer]))
)]
pub async fn get_all_customers(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state
        .parties_service
        .get_all_customers(&app_state.db_pool, query.search.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(customers)))
}

// GET /api/parties/customers/{id}
#[utoipa::path(
    get,
    path = "/api/parties/customers/{id}",
    tag = "Parties",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses((status = 200, body = Customer))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .parties_service
        .get_customer(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(customer)))
}

// PUT /api/parties/customers/{id}
#[utoipa::path(
    put,
    path = "/api/parties/customers/{id}",
    tag = "Parties",
    request_body = CustomerPayload,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses((status = 200, body = Customer))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state
        .parties_service
        .update_customer(
            &app_state.db_pool,
            id,
            &payload.name,
            &payload.tax_id,
            &payload.phone,
            payload.email.as_deref(),
            &payload.address,
            payload.is_active,
        )
        .await?;

    Ok((StatusCode::OK, Json(customer)))
}

// DELETE /api/parties/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/parties/customers/{id}",
    tag = "Parties",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses((status = 204, description = "Cliente removido"))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .parties_service
        .delete_customer(&app_state.db_pool, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  Operadores
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperatorPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
}

// POST /api/parties/operators
#[utoipa::path(
    post,
    path = "/api/parties/operators",
    tag = "Parties",
    request_body = OperatorPayload,
    responses((status = 201, description = "Operador criado", body = Operator))
)]
pub async fn create_operator(
    State(app_state): State<AppState>,
    Json(payload): Json<OperatorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let operator = app_state
        .parties_service
        .create_operator(&app_state.db_pool, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(operator)))
}

// GET /api/parties/operators
#[utoipa::path(
    get,
    path = "/api/parties/operators",
    tag = "Parties",
    responses((status = 200, description = "Operadores ativos", body = [Operator]))
)]
pub async fn get_all_operators(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let operators = app_state
        .parties_service
        .get_all_operators(&app_state.db_pool)
        .await?;
    Ok((StatusCode::OK, Json(operators)))
}
