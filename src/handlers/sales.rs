// src/handlers/sales.rs

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
    db::sales_repo::SaleFilter,
    models::sales::{Payment, PaymentMethod, Sale, SaleDetail, SaleStatus},
    services::sales_service::{NewSaleItem, PaymentInput},
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

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// =============================================================================
//  Formas de Pagamento
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Boleto 30 dias")]
    pub name: String,

    pub description: Option<String>,

    /// Prazo em dias para recebimento (0 = à vista)
    #[validate(range(min = 0, message = "O prazo não pode ser negativo."))]
    #[serde(default)]
    pub receipt_term_days: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// POST /api/sales/payment-methods
#[utoipa::path(
    post,
    path = "/api/sales/payment-methods",
    tag = "Sales",
    request_body = PaymentMethodPayload,
    responses((status = 201, description = "Forma de pagamento criada", body = PaymentMethod))
)]
pub async fn create_payment_method(
    State(app_state): State<AppState>,
    Json(payload): Json<PaymentMethodPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let method = app_state
        .sales_service
        .create_payment_method(
            &app_state.db_pool,
            &payload.name,
            payload.description.as_deref(),
            payload.receipt_term_days,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(method)))
}

// GET /api/sales/payment-methods
#[utoipa::path(
    get,
    path = "/api/sales/payment-methods",
    tag = "Sales",
    responses((status = 200, description = "Formas de pagamento ativas", body = [PaymentMethod]))
)]
pub async fn get_all_payment_methods(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let methods = app_state
        .sales_service
        .get_all_payment_methods(&app_state.db_pool)
        .await?;
    Ok((StatusCode::OK, Json(methods)))
}

// GET /api/sales/payment-methods/{id}
#[utoipa::path(
    get,
    path = "/api/sales/payment-methods/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da forma de pagamento")),
    responses((status = 200, body = PaymentMethod))
)]
pub async fn get_payment_method(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let method = app_state
        .sales_service
        .get_payment_method(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(method)))
}

// PUT /api/sales/payment-methods/{id}
#[utoipa::path(
    put,
    path = "/api/sales/payment-methods/{id}",
    tag = "Sales",
    request_body = PaymentMethodPayload,
    params(("id" = Uuid, Path, description = "ID da forma de pagamento")),
    responses((status = 200, body = PaymentMethod))
)]
pub async fn update_payment_method(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentMethodPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let method = app_state
        .sales_service
        .update_payment_method(
            &app_state.db_pool,
            id,
            &payload.name,
            payload.description.as_deref(),
            payload.receipt_term_days,
            payload.is_active,
        )
        .await?;

    Ok((StatusCode::OK, Json(method)))
}

// DELETE /api/sales/payment-methods/{id}
#[utoipa::path(
    delete,
    path = "/api/sales/payment-methods/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da forma de pagamento")),
    responses((status = 204, description = "Forma de pagamento removida"))
)]
pub async fn delete_payment_method(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .sales_service
        .delete_payment_method(&app_state.db_pool, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  Vendas
// =============================================================================

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemPayload {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "A quantidade deve ser pelo menos 1."))]
    pub quantity: i32,

    /// Sem preço informado, vale o preço de tabela do produto
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    /// Venda a prazo tem cliente; venda de balcão vai sem
    pub customer_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
    pub operator_id: Uuid,
    pub note: Option<String>,
    pub sold_at: Option<DateTime<Utc>>,

    #[validate(length(min = 1, message = "A venda precisa de pelo menos um item."))]
    pub items: Vec<SaleItemPayload>,
}

// POST /api/sales
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda criada", body = Sale),
        (status = 422, description = "Estoque insuficiente em algum item")
    )
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    for item in &payload.items {
        item.validate()?;
    }

    let items: Vec<NewSaleItem> = payload
        .items
        .iter()
        .map(|item| NewSaleItem {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect();

    let sale = app_state
        .sales_service
        .create_sale(
            &app_state.db_pool,
            payload.customer_id,
            payload.payment_method_id,
            payload.operator_id,
            payload.note.as_deref(),
            payload.sold_at,
            &items,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SaleQuery {
    pub status: Option<SaleStatus>,
    pub customer_id: Option<Uuid>,
    /// Data inicial (inclusiva)
    pub from: Option<NaiveDate>,
    /// Data final (inclusiva)
    pub to: Option<NaiveDate>,
}

// GET /api/sales
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    params(SaleQuery),
    responses((status = 200, description = "Vendas do recorte", body = [Sale]))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    Query(query): Query<SaleQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = SaleFilter {
        status: query.status,
        customer_id: query.customer_id,
        from: query.from,
        to: query.to,
    };

    let sales = app_state
        .sales_service
        .list_sales(&app_state.db_pool, &filter)
        .await?;
    Ok((StatusCode::OK, Json(sales)))
}

// GET /api/sales/{id}
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses((status = 200, description = "Venda com itens, pagamentos e totais", body = SaleDetail))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .sales_service
        .get_sale_detail(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(detail)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalePayload {
    pub customer_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
    pub note: Option<String>,
    pub sold_at: Option<DateTime<Utc>>,
}

// PUT /api/sales/{id}
// Só o cabeçalho muda por aqui; itens exigem cancelar e relançar a venda.
#[utoipa::path(
    put,
    path = "/api/sales/{id}",
    tag = "Sales",
    request_body = UpdateSalePayload,
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses((status = 200, body = Sale))
)]
pub async fn update_sale(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let sale = app_state
        .sales_service
        .update_sale(
            &app_state.db_pool,
            id,
            payload.customer_id,
            payload.payment_method_id,
            payload.note.as_deref(),
            payload.sold_at,
        )
        .await?;

    Ok((StatusCode::OK, Json(sale)))
}

// POST /api/sales/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/sales/{id}/cancel",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses((status = 200, description = "Venda cancelada, estoque devolvido", body = Sale))
)]
pub async fn cancel_sale(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state
        .sales_service
        .cancel_sale(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(sale)))
}

// =============================================================================
//  Checkout (pagamento simples ou dividido)
// =============================================================================

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPairPayload {
    pub payment_method_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "5.00")]
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    /// Pares (forma, valor); a soma não pode passar do saldo pendente
    #[validate(length(min = 1, message = "Informe pelo menos um pagamento."))]
    pub payments: Vec<PaymentPairPayload>,

    pub note: Option<String>,
    pub operator_id: Uuid,
}

// POST /api/sales/{id}/checkout
#[utoipa::path(
    post,
    path = "/api/sales/{id}/checkout",
    tag = "Sales",
    request_body = CheckoutPayload,
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 201, description = "Pagamentos registrados", body = [Payment]),
        (status = 422, description = "Soma excede o saldo pendente")
    )
)]
pub async fn checkout(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckoutPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    for pair in &payload.payments {
        pair.validate()?;
    }

    let entries: Vec<PaymentInput> = payload
        .payments
        .iter()
        .map(|pair| PaymentInput {
            payment_method_id: pair.payment_method_id,
            amount: pair.amount,
        })
        .collect();

    let payments = app_state
        .sales_service
        .register_payments(
            &app_state.db_pool,
            id,
            &entries,
            payload.note.as_deref(),
            payload.operator_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(payments)))
}

// DELETE /api/sales/payments/{id}
// Estorno de lançamento errado: o status da venda e o título são derivados
// de novo em seguida.
#[utoipa::path(
    delete,
    path = "/api/sales/payments/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses((status = 204, description = "Pagamento removido"))
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .sales_service
        .delete_payment(&app_state.db_pool, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
