// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

// "Vencido" não entra aqui de propósito: é um estado derivado da data,
// calculado na leitura (is_overdue), nunca gravado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "receivable_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceivableStatus {
    Open,    // Nada recebido
    Partial, // Recebido em parte
    Settled, // Quitado
}

impl ReceivableStatus {
    /// Status derivado dos valores. Pura e idempotente, espelha a regra da
    /// venda (SaleStatus::reconcile) do lado do título.
    pub fn for_amounts(total: Decimal, paid: Decimal) -> ReceivableStatus {
        if paid >= total {
            ReceivableStatus::Settled
        } else if paid > Decimal::ZERO {
            ReceivableStatus::Partial
        } else {
            ReceivableStatus::Open
        }
    }
}

// --- Structs ---

/// Título a receber. Quando ligado a uma venda (sale_id), os valores são um
/// espelho dos pagamentos da venda; avulso, é pago diretamente via
/// receivable_payments.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Receivable {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub sale_id: Option<Uuid>,
    pub operator_id: Uuid,

    #[schema(example = "500.00")]
    pub total: Decimal,

    #[schema(example = "150.00")]
    pub paid: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-12-31")]
    pub due_date: NaiveDate,

    pub status: ReceivableStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Receivable {
    pub fn pending(&self) -> Decimal {
        self.total - self.paid
    }

    pub fn percent_paid(&self) -> Decimal {
        if self.total > Decimal::ZERO {
            (self.paid / self.total * Decimal::ONE_HUNDRED).round_dp(2)
        } else {
            Decimal::ZERO
        }
    }

    /// Vencido = passou do vencimento sem quitar.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && self.status != ReceivableStatus::Settled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivablePayment {
    pub id: Uuid,
    pub receivable_id: Uuid,
    pub payment_method_id: Uuid,
    pub operator_id: Uuid,
    pub amount: Decimal,
    pub note: Option<String>,
    pub paid_at: DateTime<Utc>,
}

// --- Visão detalhada ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableDetail {
    #[serde(flatten)]
    pub header: Receivable,
    pub customer_name: String,
    pub sale_number: Option<String>,
    pub payments: Vec<ReceivablePayment>,

    pub pending: Decimal,
    pub percent_paid: Decimal,
    pub is_overdue: bool,
}

impl ReceivableDetail {
    pub fn assemble(
        header: Receivable,
        customer_name: String,
        sale_number: Option<String>,
        payments: Vec<ReceivablePayment>,
        today: NaiveDate,
    ) -> Self {
        ReceivableDetail {
            pending: header.pending(),
            percent_paid: header.percent_paid(),
            is_overdue: header.is_overdue(today),
            customer_name,
            sale_number,
            payments,
            header,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn status_follows_amounts() {
        assert_eq!(
            ReceivableStatus::for_amounts(dec!(100), Decimal::ZERO),
            ReceivableStatus::Open
        );
        assert_eq!(
            ReceivableStatus::for_amounts(dec!(100), dec!(40)),
            ReceivableStatus::Partial
        );
        assert_eq!(
            ReceivableStatus::for_amounts(dec!(100), dec!(100)),
            ReceivableStatus::Settled
        );
        assert_eq!(
            ReceivableStatus::for_amounts(dec!(100), dec!(100.01)),
            ReceivableStatus::Settled
        );
    }

    #[test]
    fn overdue_is_derived_from_due_date_and_status() {
        let mut receivable = sample_receivable();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        receivable.due_date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        assert!(receivable.is_overdue(today));

        // No dia do vencimento ainda não está vencido
        receivable.due_date = today;
        assert!(!receivable.is_overdue(today));

        // Título quitado nunca fica vencido
        receivable.due_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        receivable.status = ReceivableStatus::Settled;
        assert!(!receivable.is_overdue(today));
    }

    #[test]
    fn pending_and_percent() {
        let receivable = sample_receivable();
        assert_eq!(receivable.pending(), dec!(350.00));
        assert_eq!(receivable.percent_paid(), dec!(30.00));
    }

    fn sample_receivable() -> Receivable {
        Receivable {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            sale_id: None,
            operator_id: Uuid::new_v4(),
            total: dec!(500.00),
            paid: dec!(150.00),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            status: ReceivableStatus::Partial,
            note: None,
            created_at: Utc::now(),
        }
    }
}
