// src/models/sales.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Formas de Pagamento ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: Uuid,

    #[schema(example = "Boleto 30 dias")]
    pub name: String,

    pub description: Option<String>,

    /// Prazo em dias para recebimento (0 = à vista).
    #[schema(example = 30)]
    pub receipt_term_days: i32,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// --- Numeração de Venda ---

pub const SALE_NUMBER_PREFIX: &str = "VD";

/// Formata o número sequencial no padrão "VD000001". Seis dígitos com zeros
/// à esquerda mantêm a ordenação lexicográfica igual à numérica.
pub fn format_sale_number(sequence: u32) -> String {
    format!("{}{:06}", SALE_NUMBER_PREFIX, sequence)
}

/// Extrai o sequencial de um número de venda. Números fora do padrão são
/// ignorados na alocação (retorna None).
pub fn parse_sale_number(number: &str) -> Option<u32> {
    number
        .strip_prefix(SALE_NUMBER_PREFIX)
        .and_then(|digits| digits.parse::<u32>().ok())
}

// --- Vencimento e tolerância ---

/// Tolerância de arredondamento para conferência de pagamento: um centavo.
pub const PAYMENT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Um valor proposto estoura o saldo pendente quando ultrapassa a tolerância.
pub fn exceeds_pending(pending: Decimal, proposed: Decimal) -> bool {
    proposed > pending + PAYMENT_TOLERANCE
}

/// Vencimento = data da venda + prazo da forma de pagamento (à vista quando
/// não há prazo ou forma definida).
pub fn due_date_for(sold_at: DateTime<Utc>, receipt_term_days: Option<i32>) -> NaiveDate {
    let base = sold_at.date_naive();
    match receipt_term_days {
        Some(days) if days > 0 => base + Duration::days(days as i64),
        _ => base,
    }
}

// --- Venda ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Open,
    Finalized,
    Paid,
    PartiallyPaid,
    Cancelled,
}

impl SaleStatus {
    /// Deriva o status de pagamento a partir dos totais. Função pura e
    /// idempotente: é o ÚNICO caminho que escreve status derivado de
    /// pagamento (o ciclo criar/cancelar cuida do resto).
    ///
    /// Venda cancelada é definitiva e nunca sai desse estado. Sem nenhum
    /// pagamento a venda volta ao estado de ciclo de vida que tinha antes:
    /// aberta quando há cliente (a prazo), finalizada no balcão.
    pub fn reconcile(self, has_customer: bool, total: Decimal, total_paid: Decimal) -> SaleStatus {
        if self == SaleStatus::Cancelled {
            return self;
        }

        if total_paid <= Decimal::ZERO {
            return match self {
                SaleStatus::Paid | SaleStatus::PartiallyPaid => {
                    if has_customer {
                        SaleStatus::Open
                    } else {
                        SaleStatus::Finalized
                    }
                }
                other => other,
            };
        }

        if total_paid >= total {
            SaleStatus::Paid
        } else {
            SaleStatus::PartiallyPaid
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,

    #[schema(example = "VD000042")]
    pub number: String,

    pub customer_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
    pub operator_id: Uuid,
    pub status: SaleStatus,
    pub note: Option<String>,
    pub sold_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item da venda. O preço unitário é congelado no momento da venda e não
/// acompanha alterações posteriores do catálogo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    pub fn line_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub payment_method_id: Uuid,
    pub operator_id: Uuid,
    pub amount: Decimal,
    pub note: Option<String>,
    pub paid_at: DateTime<Utc>,
}

// --- Visão detalhada (itens + pagamentos + totais derivados) ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub header: Sale,
    pub customer_name: Option<String>,
    pub payment_method_name: Option<String>,
    pub items: Vec<SaleItem>,
    pub payments: Vec<Payment>,

    pub total: Decimal,
    pub item_count: i64,
    pub total_quantity: i64,
    pub total_paid: Decimal,
    pub pending: Decimal,
    pub percent_paid: Decimal,
    pub due_date: NaiveDate,
}

impl SaleDetail {
    pub fn assemble(
        header: Sale,
        customer_name: Option<String>,
        payment_method_name: Option<String>,
        receipt_term_days: Option<i32>,
        items: Vec<SaleItem>,
        payments: Vec<Payment>,
    ) -> Self {
        let total: Decimal = items.iter().map(SaleItem::line_value).sum();
        let total_quantity: i64 = items.iter().map(|i| i.quantity as i64).sum();
        let total_paid: Decimal = payments.iter().map(|p| p.amount).sum();
        let pending = total - total_paid;
        let percent_paid = if total > Decimal::ZERO {
            (total_paid / total * Decimal::ONE_HUNDRED).round_dp(2)
        } else {
            Decimal::ZERO
        };
        let due_date = due_date_for(header.sold_at, receipt_term_days);

        SaleDetail {
            item_count: items.len() as i64,
            customer_name,
            payment_method_name,
            items,
            payments,
            total,
            total_quantity,
            total_paid,
            pending,
            percent_paid,
            due_date,
            header,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn sale_number_roundtrip() {
        assert_eq!(format_sale_number(1), "VD000001");
        assert_eq!(format_sale_number(123456), "VD123456");
        assert_eq!(parse_sale_number("VD000042"), Some(42));
        assert_eq!(parse_sale_number("XX000042"), None);
        assert_eq!(parse_sale_number("VDabc"), None);
    }

    #[test]
    fn sale_numbers_sort_lexicographically() {
        let a = format_sale_number(9);
        let b = format_sale_number(10);
        let c = format_sale_number(100);
        assert!(a < b && b < c);
    }

    #[test]
    fn due_date_applies_receipt_term() {
        let sold_at = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        assert_eq!(due_date_for(sold_at, Some(30)), d + Duration::days(30));
        assert_eq!(due_date_for(sold_at, Some(0)), d);
        assert_eq!(due_date_for(sold_at, None), d);
    }

    #[test]
    fn reconcile_follows_paid_totals() {
        let total = dec!(9.00);

        assert_eq!(
            SaleStatus::Open.reconcile(true, total, dec!(5.00)),
            SaleStatus::PartiallyPaid
        );
        assert_eq!(
            SaleStatus::PartiallyPaid.reconcile(true, total, dec!(9.00)),
            SaleStatus::Paid
        );
        // Pagar além do total continua "paga"
        assert_eq!(
            SaleStatus::Paid.reconcile(true, total, dec!(9.01)),
            SaleStatus::Paid
        );
    }

    #[test]
    fn reconcile_is_idempotent() {
        let total = dec!(9.00);
        let once = SaleStatus::Open.reconcile(true, total, dec!(5.00));
        let twice = once.reconcile(true, total, dec!(5.00));
        assert_eq!(once, twice);
    }

    #[test]
    fn reconcile_without_payments_restores_lifecycle_state() {
        let total = dec!(9.00);

        // Venda de balcão finalizada não vira "aberta" só por não ter pagamento
        assert_eq!(
            SaleStatus::Finalized.reconcile(false, total, Decimal::ZERO),
            SaleStatus::Finalized
        );
        // Excluir o último pagamento devolve a venda ao estado base
        assert_eq!(
            SaleStatus::Paid.reconcile(true, total, Decimal::ZERO),
            SaleStatus::Open
        );
        assert_eq!(
            SaleStatus::PartiallyPaid.reconcile(false, total, Decimal::ZERO),
            SaleStatus::Finalized
        );
    }

    #[test]
    fn reconcile_keeps_cancelled_sticky() {
        assert_eq!(
            SaleStatus::Cancelled.reconcile(true, dec!(9.00), dec!(9.00)),
            SaleStatus::Cancelled
        );
    }

    #[test]
    fn overpayment_tolerance_is_one_cent() {
        let pending = dec!(9.00);
        assert!(!exceeds_pending(pending, dec!(9.00)));
        assert!(!exceeds_pending(pending, dec!(9.01)));
        assert!(exceeds_pending(pending, dec!(9.02)));
        assert!(exceeds_pending(pending, dec!(10.00)));
    }

    #[test]
    fn sale_detail_totals() {
        let sale = sample_sale();
        let items = vec![
            sample_item(sale.id, 2, dec!(2.50)),
            sample_item(sale.id, 1, dec!(4.00)),
        ];
        let payments = vec![sample_payment(sale.id, dec!(5.00))];

        let detail = SaleDetail::assemble(sale, None, None, Some(30), items, payments);

        assert_eq!(detail.total, dec!(9.00));
        assert_eq!(detail.item_count, 2);
        assert_eq!(detail.total_quantity, 3);
        assert_eq!(detail.total_paid, dec!(5.00));
        assert_eq!(detail.pending, dec!(4.00));
        assert_eq!(detail.percent_paid, dec!(55.56));
    }

    fn sample_sale() -> Sale {
        Sale {
            id: Uuid::new_v4(),
            number: "VD000001".into(),
            customer_id: None,
            payment_method_id: None,
            operator_id: Uuid::new_v4(),
            status: SaleStatus::Finalized,
            note: None,
            sold_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_item(sale_id: Uuid, quantity: i32, unit_price: Decimal) -> SaleItem {
        SaleItem {
            id: Uuid::new_v4(),
            sale_id,
            product_id: Uuid::new_v4(),
            quantity,
            unit_price,
            created_at: Utc::now(),
        }
    }

    fn sample_payment(sale_id: Uuid, amount: Decimal) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            sale_id,
            payment_method_id: Uuid::new_v4(),
            operator_id: Uuid::new_v4(),
            amount,
            note: None,
            paid_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    fn any_status() -> impl Strategy<Value = SaleStatus> {
        prop_oneof![
            Just(SaleStatus::Open),
            Just(SaleStatus::Finalized),
            Just(SaleStatus::Paid),
            Just(SaleStatus::PartiallyPaid),
            Just(SaleStatus::Cancelled),
        ]
    }

    fn money(max_cents: i64) -> impl Strategy<Value = Decimal> {
        (0..=max_cents).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        // Derivar o status duas vezes com os mesmos totais dá no mesmo.
        #[test]
        fn reconcile_is_idempotent(
            status in any_status(),
            has_customer in any::<bool>(),
            total in money(1_000_000),
            paid in money(1_000_000),
        ) {
            let once = status.reconcile(has_customer, total, paid);
            prop_assert_eq!(once, once.reconcile(has_customer, total, paid));
        }

        // Cancelada é definitiva, não importa o que os totais digam.
        #[test]
        fn cancelled_never_leaves_cancelled(
            has_customer in any::<bool>(),
            total in money(1_000_000),
            paid in money(1_000_000),
        ) {
            prop_assert_eq!(
                SaleStatus::Cancelled.reconcile(has_customer, total, paid),
                SaleStatus::Cancelled
            );
        }

        // O número formatado sempre faz o caminho de volta.
        #[test]
        fn sale_number_parse_inverts_format(sequence in 0u32..1_000_000) {
            let number = format_sale_number(sequence);
            prop_assert_eq!(parse_sale_number(&number), Some(sequence));
        }

        // Dentro da tolerância de um centavo nunca é estouro.
        #[test]
        fn within_tolerance_is_never_overpayment(pending in money(1_000_000)) {
            prop_assert!(!exceeds_pending(pending, pending));
            prop_assert!(!exceeds_pending(pending, pending + PAYMENT_TOLERANCE));
            prop_assert!(exceeds_pending(pending, pending + PAYMENT_TOLERANCE + PAYMENT_TOLERANCE));
        }
    }
}
