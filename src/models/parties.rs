// src/models/parties.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Cadastros de referência: fornecedores, clientes e operadores.
// Nenhum deles carrega estado calculado.

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,

    #[schema(example = "12.345.678/0001-90")]
    pub tax_id: String,

    pub phone: String,
    pub email: String,
    pub address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,

    // CPF ou CNPJ, conforme pessoa física/jurídica
    #[schema(example = "123.456.789-10")]
    pub tax_id: String,

    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Quem executou a operação (vendas, movimentações, pagamentos).
/// Autenticação fica a cargo do gateway; aqui é só referência de auditoria.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
