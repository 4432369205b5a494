// src/services/finance_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        finance_repo::{FinanceRepository, ReceivableFilter},
        PartiesRepository,
    },
    models::{
        finance::{Receivable, ReceivableDetail, ReceivablePayment, ReceivableStatus},
        sales::Sale,
    },
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
    parties_repo: PartiesRepository,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository, parties_repo: PartiesRepository) -> Self {
        Self { repo, parties_repo }
    }

    // ---
    // Títulos avulsos
    // ---

    pub async fn create_receivable<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        total: Decimal,
        due_date: NaiveDate,
        note: Option<&str>,
        operator_id: Uuid,
    ) -> Result<Receivable, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if total <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }

        let mut tx = executor.begin().await?;

        self.parties_repo
            .get_customer(&mut *tx, customer_id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;

        let receivable = self
            .repo
            .insert_receivable(&mut *tx, customer_id, None, operator_id, total, due_date, note)
            .await?;

        tx.commit().await?;
        Ok(receivable)
    }

    /// Título gerado na criação de uma venda a prazo: nasce em aberto, com o
    /// total da venda e o vencimento calculado pela forma de pagamento.
    pub async fn create_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        customer_id: Uuid,
        operator_id: Uuid,
        total: Decimal,
        due_date: NaiveDate,
    ) -> Result<Receivable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .insert_receivable(executor, customer_id, Some(sale_id), operator_id, total, due_date, None)
            .await
    }

    /// Mantém o título espelhando os totais da venda depois de qualquer
    /// mutação de pagamento ou de cabeçalho. Venda sem cliente não tem
    /// espelho: um título exige devedor, então o que existir sem nenhum
    /// recebimento é removido.
    pub async fn sync_sale_receivable<'e, E>(
        &self,
        executor: E,
        sale: &Sale,
        total: Decimal,
        total_paid: Decimal,
        due_date: NaiveDate,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        match sale.customer_id {
            Some(customer_id) => {
                let status = ReceivableStatus::for_amounts(total, total_paid);
                self.repo
                    .upsert_for_sale(
                        &mut *tx,
                        sale.id,
                        customer_id,
                        sale.operator_id,
                        total,
                        total_paid,
                        status,
                        due_date,
                    )
                    .await?;
            }
            None => {
                if let Some(receivable) = self.repo.get_by_sale(&mut *tx, sale.id).await? {
                    if receivable.paid <= Decimal::ZERO {
                        self.repo.delete_receivable(&mut *tx, receivable.id).await?;
                    }
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Recebimento direto de um título avulso. A validação de valor fica no
    /// chamador (SalesService::pay_receivable), que decide a rota.
    pub async fn pay_standalone<'e, E>(
        &self,
        executor: E,
        receivable: &Receivable,
        payment_method_id: Uuid,
        amount: Decimal,
        note: Option<&str>,
        operator_id: Uuid,
    ) -> Result<ReceivablePayment, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let payment = self
            .repo
            .insert_receivable_payment(
                &mut *tx,
                receivable.id,
                payment_method_id,
                operator_id,
                amount,
                note,
            )
            .await?;

        let new_paid = receivable.paid + amount;
        let status = ReceivableStatus::for_amounts(receivable.total, new_paid);
        self.repo
            .update_amounts(&mut *tx, receivable.id, new_paid, status)
            .await?;

        tx.commit().await?;
        Ok(payment)
    }

    // ---
    // Consultas
    // ---

    pub async fn get_receivable<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Receivable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_receivable(executor, id)
            .await?
            .ok_or(AppError::NotFound("Título"))
    }

    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Receivable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_receivable_for_update(executor, id)
            .await?
            .ok_or(AppError::NotFound("Título"))
    }

    pub async fn get_by_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Option<Receivable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_by_sale(executor, sale_id).await
    }

    pub async fn delete_receivable<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if self.repo.delete_receivable(executor, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Título"))
        }
    }

    pub async fn list_receivables<'e, E>(
        &self,
        executor: E,
        filter: &ReceivableFilter,
    ) -> Result<Vec<Receivable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_receivables(executor, filter).await
    }

    pub async fn get_receivable_detail<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<ReceivableDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let receivable = self
            .repo
            .get_receivable(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Título"))?;

        let customer_name = self
            .parties_repo
            .get_customer(&mut *tx, receivable.customer_id)
            .await?
            .map(|c| c.name)
            .unwrap_or_default();

        let sale_number = match receivable.sale_id {
            Some(sale_id) => self.repo.get_sale_number(&mut *tx, sale_id).await?,
            None => None,
        };

        let payments = self
            .repo
            .list_receivable_payments(&mut *tx, receivable.id)
            .await?;

        tx.commit().await?;

        let today = Utc::now().date_naive();
        Ok(ReceivableDetail::assemble(
            receivable,
            customer_name,
            sale_number,
            payments,
            today,
        ))
    }
}
