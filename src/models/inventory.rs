// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- 2. Produtos ---
// Catálogo + saldo: diferente de um ERP multi-depósito, a distribuidora tem
// um estoque único, então a quantidade vive no próprio produto.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,

    #[schema(example = "GALAO-20L")]
    pub code: String,

    #[schema(example = "Galão 20L Crystal")]
    pub name: String,

    #[schema(example = "15.00")]
    pub sale_price: Decimal,

    #[schema(example = "8.00")]
    pub cost_price: Decimal,

    pub minimum_stock: i32,
    pub current_quantity: i32,

    #[schema(example = "UN")]
    pub unit: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Estoque igual ou abaixo do mínimo dispara o alerta de reposição.
    pub fn is_low_stock(&self) -> bool {
        self.current_quantity <= self.minimum_stock
    }

    /// Valor imobilizado em estoque (quantidade x custo).
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.current_quantity) * self.cost_price
    }
}

// --- 3. Movimentações de Estoque ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    Entry,
    Exit,
    Adjustment,
}

impl MovementKind {
    /// Saldo resultante de aplicar uma movimentação sobre `current`.
    ///
    /// ENTRY soma, EXIT subtrai e ADJUSTMENT define o valor absoluto (não é
    /// um delta!). Retorna None quando uma saída excede o saldo disponível.
    pub fn resulting_quantity(self, current: i32, quantity: i32) -> Option<i32> {
        match self {
            MovementKind::Entry => Some(current + quantity),
            MovementKind::Exit => {
                if current >= quantity {
                    Some(current - quantity)
                } else {
                    None
                }
            }
            MovementKind::Adjustment => Some(quantity),
        }
    }

    /// Saldo resultante de *estornar* uma movimentação já aplicada
    /// (exclusão do registro). Saídas devolvem ao estoque, entradas retiram.
    /// Ajustes não são reversíveis: o valor anterior se perdeu.
    pub fn reversed_quantity(self, current: i32, quantity: i32) -> Option<i32> {
        match self {
            MovementKind::Entry => {
                if current >= quantity {
                    Some(current - quantity)
                } else {
                    None
                }
            }
            MovementKind::Exit => Some(current + quantity),
            MovementKind::Adjustment => Some(current),
        }
    }
}

/// Registro append-only do livro-razão. Nunca é editado depois de criado;
/// a única mutação permitida é a exclusão com estorno (ver InventoryService).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub kind: MovementKind,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    pub payment_method_id: Option<Uuid>,
    pub sale_id: Option<Uuid>,
    pub operator_id: Uuid,
    pub note: Option<String>,
    pub moved_at: DateTime<Utc>,
}

impl StockMovement {
    /// Valor da movimentação (quantidade x preço unitário, quando informado).
    pub fn line_value(&self) -> Decimal {
        match self.unit_price {
            Some(price) => Decimal::from(self.quantity) * price,
            None => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn entry_adds_to_current_quantity() {
        assert_eq!(MovementKind::Entry.resulting_quantity(50, 20), Some(70));
    }

    #[test]
    fn exit_requires_sufficient_stock() {
        assert_eq!(MovementKind::Exit.resulting_quantity(50, 45), Some(5));
        // Saída maior que o saldo não altera nada
        assert_eq!(MovementKind::Exit.resulting_quantity(5, 10), None);
    }

    #[test]
    fn adjustment_sets_absolute_value() {
        assert_eq!(MovementKind::Adjustment.resulting_quantity(50, 7), Some(7));
        assert_eq!(MovementKind::Adjustment.resulting_quantity(0, 120), Some(120));
    }

    #[test]
    fn reversal_undoes_entry_and_exit() {
        assert_eq!(MovementKind::Exit.reversed_quantity(5, 45), Some(50));
        assert_eq!(MovementKind::Entry.reversed_quantity(70, 20), Some(50));
        // Estornar uma entrada não pode deixar o saldo negativo
        assert_eq!(MovementKind::Entry.reversed_quantity(10, 20), None);
        // Ajuste: o valor anterior é desconhecido, saldo fica como está
        assert_eq!(MovementKind::Adjustment.reversed_quantity(7, 99), Some(7));
    }

    #[test]
    fn low_stock_at_or_below_minimum() {
        let mut product = sample_product();
        product.current_quantity = 11;
        assert!(!product.is_low_stock());
        product.current_quantity = 10;
        assert!(product.is_low_stock());
        product.current_quantity = 5;
        assert!(product.is_low_stock());
    }

    #[test]
    fn stock_value_uses_cost_price() {
        let product = sample_product();
        assert_eq!(product.stock_value(), dec!(400.00));
    }

    fn sample_product() -> Product {
        Product {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            code: "GALAO-20L".into(),
            name: "Galão 20L Crystal".into(),
            sale_price: dec!(15.00),
            cost_price: dec!(8.00),
            minimum_stock: 10,
            current_quantity: 50,
            unit: "UN".into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    fn any_kind() -> impl Strategy<Value = MovementKind> {
        prop_oneof![
            Just(MovementKind::Entry),
            Just(MovementKind::Exit),
            Just(MovementKind::Adjustment),
        ]
    }

    proptest! {
        // Invariante central do estoque: nenhuma movimentação aceita produz
        // saldo negativo.
        #[test]
        fn accepted_movement_never_goes_negative(
            kind in any_kind(),
            current in 0..100_000i32,
            quantity in 0..100_000i32,
        ) {
            if let Some(result) = kind.resulting_quantity(current, quantity) {
                prop_assert!(result >= 0);
            }
        }

        // Ajuste é absoluto: o saldo anterior não influencia o resultado.
        #[test]
        fn adjustment_ignores_prior_quantity(
            a in 0..100_000i32,
            b in 0..100_000i32,
            target in 0..100_000i32,
        ) {
            prop_assert_eq!(
                MovementKind::Adjustment.resulting_quantity(a, target),
                MovementKind::Adjustment.resulting_quantity(b, target)
            );
        }

        // Estornar uma movimentação aceita devolve o saldo original
        // (entrada e saída; ajuste não guarda o anterior).
        #[test]
        fn reversal_restores_entry_and_exit(
            kind in prop_oneof![Just(MovementKind::Entry), Just(MovementKind::Exit)],
            current in 0..100_000i32,
            quantity in 0..100_000i32,
        ) {
            if let Some(applied) = kind.resulting_quantity(current, quantity) {
                prop_assert_eq!(kind.reversed_quantity(applied, quantity), Some(current));
            }
        }
    }
}
