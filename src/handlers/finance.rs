// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    db::finance_repo::ReceivableFilter,
    models::finance::{Receivable, ReceivableDetail, ReceivableStatus},
};

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// =============================================================================
//  Contas a Receber
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceivablePayload {
    pub customer_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "500.00")]
    pub total: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-12-31")]
    pub due_date: NaiveDate,

    pub note: Option<String>,
    pub operator_id: Uuid,
}

// POST /api/receivables
// Título avulso (sem venda): empréstimo de vasilhame, acerto antigo etc.
#[utoipa::path(
    post,
    path = "/api/receivables",
    tag = "Finance",
    request_body = CreateReceivablePayload,
    responses((status = 201, description = "Título criado", body = Receivable))
)]
pub async fn create_receivable(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateReceivablePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let receivable = app_state
        .finance_service
        .create_receivable(
            &app_state.db_pool,
            payload.customer_id,
            payload.total,
            payload.due_date,
            payload.note.as_deref(),
            payload.operator_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(receivable)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableQuery {
    pub status: Option<ReceivableStatus>,
    pub customer_id: Option<Uuid>,
    /// Apenas vencidos (não quitados com vencimento no passado)
    #[serde(default)]
    pub overdue: bool,
}

// GET /api/receivables
#[utoipa::path(
    get,
    path = "/api/receivables",
    tag = "Finance",
    params(ReceivableQuery),
    responses((status = 200, description = "Títulos do recorte", body = [Receivable]))
)]
pub async fn list_receivables(
    State(app_state): State<AppState>,
    Query(query): Query<ReceivableQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = ReceivableFilter {
        status: query.status,
        customer_id: query.customer_id,
        only_overdue: query.overdue,
    };

    let receivables = app_state
        .finance_service
        .list_receivables(&app_state.db_pool, &filter)
        .await?;
    Ok((StatusCode::OK, Json(receivables)))
}

// GET /api/receivables/{id}
#[utoipa::path(
    get,
    path = "/api/receivables/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID do título")),
    responses((status = 200, description = "Título com histórico e flags derivadas", body = ReceivableDetail))
)]
pub async fn get_receivable(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .finance_service
        .get_receivable_detail(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(detail)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayReceivablePayload {
    pub payment_method_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "150.00")]
    pub amount: Decimal,

    pub note: Option<String>,
    pub operator_id: Uuid,
}

// POST /api/receivables/{id}/payments
// Título ligado a venda é liquidado pela rota da venda (os dois lados ficam
// iguais); título avulso recebe direto.
#[utoipa::path(
    post,
    path = "/api/receivables/{id}/payments",
    tag = "Finance",
    request_body = PayReceivablePayload,
    params(("id" = Uuid, Path, description = "ID do título")),
    responses(
        (status = 200, description = "Título após o recebimento", body = ReceivableDetail),
        (status = 422, description = "Valor inválido ou acima do pendente")
    )
)]
pub async fn pay_receivable(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PayReceivablePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .sales_service
        .pay_receivable(
            &app_state.db_pool,
            id,
            payload.payment_method_id,
            payload.amount,
            payload.note.as_deref(),
            payload.operator_id,
        )
        .await?;

    // Devolve o título já recalculado
    let detail = app_state
        .finance_service
        .get_receivable_detail(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(detail)))
}
