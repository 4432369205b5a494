// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::inventory::{MovementKind, Product, StockMovement};

// 1. Cards do topo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_products: i64,      // Produtos ativos
    pub low_stock_products: i64,  // Ativos com estoque <= mínimo
    pub stock_value: Decimal,     // Soma de quantidade x custo
    pub open_receivables: Decimal, // Saldo pendente de títulos abertos/parciais
}

// 2. Totais por tipo de movimentação. Serve tanto ao recorte semanal do
// dashboard quanto aos totais da listagem filtrada de movimentações.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementKindTotals {
    pub kind: MovementKind,
    pub movement_count: i64,
    pub total_quantity: Option<i64>,
    pub total_value: Option<Decimal>,
}

// 3. Produtos mais movimentados na semana
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProductEntry {
    pub product_name: String,
    pub movement_count: i64,
}

// Resposta completa do dashboard
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub summary: DashboardSummary,
    pub recent_movements: Vec<StockMovement>,
    pub low_stock_list: Vec<Product>,
    pub week_movements: Vec<MovementKindTotals>,
    pub top_products: Vec<TopProductEntry>,
}
