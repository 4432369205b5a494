// src/services/sales_service.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        sales_repo::{SaleFilter, SalesRepository},
        InventoryRepository, PartiesRepository,
    },
    models::{
        inventory::{MovementKind, Product},
        sales::{
            due_date_for, exceeds_pending, format_sale_number, parse_sale_number, Payment,
            PaymentMethod, Sale, SaleDetail, SaleStatus, SALE_NUMBER_PREFIX,
        },
    },
    services::FinanceService,
};

/// Item de uma venda nova. Sem preço informado, vale o preço de tabela do
/// produto no momento da venda.
#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
}

/// Par (forma, valor) do checkout. Uma venda pode ser liquidada em vários
/// pares de uma vez (pagamento dividido).
#[derive(Debug, Clone)]
pub struct PaymentInput {
    pub payment_method_id: Uuid,
    pub amount: Decimal,
}

// Limite de tentativas na alocação de número antes de desistir da corrida.
const MAX_NUMBER_ATTEMPTS: u32 = 100;

#[derive(Clone)]
pub struct SalesService {
    repo: SalesRepository,
    inventory_repo: InventoryRepository,
    parties_repo: PartiesRepository,
    finance_service: FinanceService,
}

impl SalesService {
    pub fn new(
        repo: SalesRepository,
        inventory_repo: InventoryRepository,
        parties_repo: PartiesRepository,
        finance_service: FinanceService,
    ) -> Self {
        Self {
            repo,
            inventory_repo,
            parties_repo,
            finance_service,
        }
    }

    // =========================================================================
    //  Formas de Pagamento
    // =========================================================================

    pub async fn create_payment_method<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        receipt_term_days: i32,
    ) -> Result<PaymentMethod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .create_payment_method(executor, name, description, receipt_term_days)
            .await
    }

    pub async fn get_all_payment_methods<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<PaymentMethod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_all_payment_methods(executor).await
    }

    pub async fn get_payment_method<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<PaymentMethod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_payment_method(executor, id)
            .await?
            .ok_or(AppError::NotFound("Forma de pagamento"))
    }

    pub async fn update_payment_method<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        description: Option<&str>,
        receipt_term_days: i32,
        is_active: bool,
    ) -> Result<PaymentMethod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_payment_method(executor, id, name, description, receipt_term_days, is_active)
            .await?
            .ok_or(AppError::NotFound("Forma de pagamento"))
    }

    pub async fn delete_payment_method<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if self.repo.delete_payment_method(executor, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Forma de pagamento"))
        }
    }

    // =========================================================================
    //  Criação de Venda
    // =========================================================================

    /// Cria a venda completa em uma transação: número sequencial, itens,
    /// baixa de estoque e saídas no livro-razão (correlacionadas pela FK da
    /// venda). Com cliente, a venda fica aberta e gera o título a receber;
    /// sem cliente é venda de balcão, já finalizada.
    ///
    /// Tudo-ou-nada: o estoque de TODOS os itens é validado antes de
    /// qualquer escrita, e a falta de qualquer produto aborta a venda
    /// inteira reportando cada produto em falta.
    pub async fn create_sale<'e, E>(
        &self,
        executor: E,
        customer_id: Option<Uuid>,
        payment_method_id: Option<Uuid>,
        operator_id: Uuid,
        note: Option<&str>,
        sold_at: Option<DateTime<Utc>>,
        items: &[NewSaleItem],
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if items.is_empty() {
            return Err(AppError::EmptySale);
        }

        let mut tx = executor.begin().await?;

        // Referências precisam existir antes de mexer em estoque
        let has_customer = match customer_id {
            Some(id) => {
                self.parties_repo
                    .get_customer(&mut *tx, id)
                    .await?
                    .ok_or(AppError::NotFound("Cliente"))?;
                true
            }
            None => false,
        };
        let method = match payment_method_id {
            Some(id) => Some(
                self.repo
                    .get_payment_method(&mut *tx, id)
                    .await?
                    .ok_or(AppError::NotFound("Forma de pagamento"))?,
            ),
            None => None,
        };

        // 1. Trava cada produto uma única vez
        let mut products: HashMap<Uuid, Product> = HashMap::new();
        for item in items {
            if !products.contains_key(&item.product_id) {
                let product = self
                    .inventory_repo
                    .get_product_for_update(&mut *tx, item.product_id)
                    .await?
                    .ok_or(AppError::NotFound("Produto"))?;
                products.insert(item.product_id, product);
            }
        }

        // 2. Simula o consumo agregado em memória (itens repetidos do mesmo
        //    produto contam juntos) e congela o preço de cada linha
        let mut lines: Vec<(Uuid, i32, Decimal)> = Vec::with_capacity(items.len());
        let mut shortages: Vec<String> = Vec::new();
        for item in items {
            let Some(product) = products.get_mut(&item.product_id) else {
                continue; // sempre presente: carregado no passo 1
            };
            if product.current_quantity < item.quantity {
                shortages.push(format!(
                    "{} (disponível {}, solicitado {})",
                    product.code, product.current_quantity, item.quantity
                ));
                continue;
            }
            product.current_quantity -= item.quantity;
            let unit_price = item.unit_price.unwrap_or(product.sale_price);
            lines.push((item.product_id, item.quantity, unit_price));
        }
        if !shortages.is_empty() {
            return Err(AppError::InsufficientStock(shortages.join("; ")));
        }

        // 3. Número sequencial, revalidado contra corrida de criação
        let number = self.allocate_number(&mut *tx).await?;

        // 4. Venda + itens + saídas no livro-razão
        let status = if has_customer {
            SaleStatus::Open
        } else {
            SaleStatus::Finalized
        };
        let sale = self
            .repo
            .insert_sale(
                &mut *tx,
                &number,
                customer_id,
                payment_method_id,
                operator_id,
                status,
                note,
                sold_at,
            )
            .await?;

        let movement_note = format!("Venda {}", sale.number);
        let mut total = Decimal::ZERO;
        for (product_id, quantity, unit_price) in &lines {
            self.repo
                .insert_sale_item(&mut *tx, sale.id, *product_id, *quantity, *unit_price)
                .await?;
            self.inventory_repo
                .insert_movement(
                    &mut *tx,
                    *product_id,
                    MovementKind::Exit,
                    *quantity,
                    Some(*unit_price),
                    sale.payment_method_id,
                    Some(sale.id),
                    operator_id,
                    Some(movement_note.as_str()),
                    Some(sale.sold_at),
                )
                .await?;
            total += Decimal::from(*quantity) * *unit_price;
        }

        // Uma escrita de saldo por produto, já com o consumo agregado
        for product in products.values() {
            self.inventory_repo
                .set_product_quantity(&mut *tx, product.id, product.current_quantity)
                .await?;
        }

        // 5. Venda a prazo gera o título pelo total, sem nada recebido
        if let Some(customer_id) = sale.customer_id {
            let due_date =
                due_date_for(sale.sold_at, method.as_ref().map(|m| m.receipt_term_days));
            self.finance_service
                .create_for_sale(&mut *tx, sale.id, customer_id, operator_id, total, due_date)
                .await?;
        }

        tx.commit().await?;
        Ok(sale)
    }

    /// Próximo número livre: maior sufixo emitido + 1, reconferindo a
    /// existência porque outra requisição pode ter emitido o mesmo candidato
    /// entre a leitura do máximo e o INSERT.
    async fn allocate_number(&self, conn: &mut PgConnection) -> Result<String, AppError> {
        let mut sequence = match self.repo.max_sale_number(&mut *conn, SALE_NUMBER_PREFIX).await? {
            Some(latest) => parse_sale_number(&latest).unwrap_or(0) + 1,
            None => 1,
        };

        let mut attempts = 0u32;
        loop {
            let candidate = format_sale_number(sequence);
            if !self.repo.sale_number_exists(&mut *conn, &candidate).await? {
                return Ok(candidate);
            }
            attempts += 1;
            if attempts >= MAX_NUMBER_ATTEMPTS {
                return Err(AppError::DuplicateSaleNumber);
            }
            sequence += 1;
        }
    }

    // =========================================================================
    //  Pagamentos (checkout, simples ou dividido)
    // =========================================================================

    /// Registra um ou mais pagamentos contra o saldo pendente da venda.
    /// A soma proposta não pode passar do pendente além da tolerância de um
    /// centavo; qualquer rejeição acontece antes da primeira escrita, então
    /// ou todos os pares entram ou nenhum entra.
    pub async fn register_payments<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        entries: &[PaymentInput],
        note: Option<&str>,
        operator_id: Uuid,
    ) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if entries.is_empty() {
            return Err(AppError::InvalidAmount);
        }
        let mut proposed = Decimal::ZERO;
        for entry in entries {
            if entry.amount <= Decimal::ZERO {
                return Err(AppError::InvalidAmount);
            }
            proposed += entry.amount;
        }

        let mut tx = executor.begin().await?;

        let sale = self
            .repo
            .get_sale_for_update(&mut *tx, sale_id)
            .await?
            .ok_or(AppError::NotFound("Venda"))?;
        if sale.status == SaleStatus::Cancelled {
            return Err(AppError::SaleCancelled);
        }

        let total = self.repo.sum_items_value(&mut *tx, sale.id).await?;
        let already_paid = self.repo.sum_payments(&mut *tx, sale.id).await?;
        let pending = total - already_paid;
        if pending <= Decimal::ZERO || exceeds_pending(pending, proposed) {
            return Err(AppError::Overpayment {
                attempted: proposed,
                pending,
            });
        }

        let mut payments = Vec::with_capacity(entries.len());
        for entry in entries {
            self.repo
                .get_payment_method(&mut *tx, entry.payment_method_id)
                .await?
                .ok_or(AppError::NotFound("Forma de pagamento"))?;
            let payment = self
                .repo
                .insert_payment(
                    &mut *tx,
                    sale.id,
                    entry.payment_method_id,
                    operator_id,
                    entry.amount,
                    note,
                )
                .await?;
            payments.push(payment);
        }

        self.reconcile_and_mirror(&mut tx, &sale, total, already_paid + proposed)
            .await?;

        tx.commit().await?;
        Ok(payments)
    }

    /// Remove um pagamento lançado errado e deriva status e título de novo.
    pub async fn delete_payment<'e, E>(&self, executor: E, payment_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let payment = self
            .repo
            .get_payment(&mut *tx, payment_id)
            .await?
            .ok_or(AppError::NotFound("Pagamento"))?;
        let sale = self
            .repo
            .get_sale_for_update(&mut *tx, payment.sale_id)
            .await?
            .ok_or(AppError::NotFound("Venda"))?;
        if sale.status == SaleStatus::Cancelled {
            return Err(AppError::SaleCancelled);
        }

        self.repo.delete_payment_row(&mut *tx, payment.id).await?;

        let total = self.repo.sum_items_value(&mut *tx, sale.id).await?;
        let total_paid = self.repo.sum_payments(&mut *tx, sale.id).await?;
        self.reconcile_and_mirror(&mut tx, &sale, total, total_paid)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Status derivado + espelho do título, sempre juntos: é o único caminho
    /// que escreve status de pagamento (a mutação direta fica proibida).
    async fn reconcile_and_mirror(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        sale: &Sale,
        total: Decimal,
        total_paid: Decimal,
    ) -> Result<(), AppError> {
        let new_status = sale
            .status
            .reconcile(sale.customer_id.is_some(), total, total_paid);
        if new_status != sale.status {
            self.repo.set_sale_status(&mut **tx, sale.id, new_status).await?;
        }

        let term = match sale.payment_method_id {
            Some(id) => self
                .repo
                .get_payment_method(&mut **tx, id)
                .await?
                .map(|m| m.receipt_term_days),
            None => None,
        };
        let due_date = due_date_for(sale.sold_at, term);
        self.finance_service
            .sync_sale_receivable(&mut **tx, sale, total, total_paid, due_date)
            .await?;

        Ok(())
    }

    // =========================================================================
    //  Recebimento de título (avulso ou ligado a venda)
    // =========================================================================

    /// Recebe um valor contra um título. Título ligado a venda é pago pela
    /// rota da venda (register_payments), mantendo os dois lados iguais;
    /// título avulso é pago direto no financeiro.
    pub async fn pay_receivable<'e, E>(
        &self,
        executor: E,
        receivable_id: Uuid,
        payment_method_id: Uuid,
        amount: Decimal,
        note: Option<&str>,
        operator_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }

        let mut tx = executor.begin().await?;

        let receivable = self
            .finance_service
            .get_for_update(&mut *tx, receivable_id)
            .await?;

        let pending = receivable.pending();
        if pending <= Decimal::ZERO || exceeds_pending(pending, amount) {
            return Err(AppError::Overpayment {
                attempted: amount,
                pending,
            });
        }

        match receivable.sale_id {
            Some(sale_id) => {
                let entry = PaymentInput {
                    payment_method_id,
                    amount,
                };
                self.register_payments(&mut *tx, sale_id, &[entry], note, operator_id)
                    .await?;
            }
            None => {
                self.finance_service
                    .pay_standalone(
                        &mut *tx,
                        &receivable,
                        payment_method_id,
                        amount,
                        note,
                        operator_id,
                    )
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    //  Cancelamento e edição
    // =========================================================================

    /// Cancela a venda desfazendo exatamente o que a criação fez no estoque:
    /// devolve a quantidade de cada item e apaga as saídas correlacionadas
    /// pela FK (nada de casar texto de observação). Cancelamento é
    /// definitivo e idempotente.
    pub async fn cancel_sale<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let mut sale = self
            .repo
            .get_sale_for_update(&mut *tx, sale_id)
            .await?
            .ok_or(AppError::NotFound("Venda"))?;
        if sale.status == SaleStatus::Cancelled {
            tx.commit().await?;
            return Ok(sale);
        }

        let items = self.repo.list_sale_items(&mut *tx, sale.id).await?;
        for item in &items {
            let product = self
                .inventory_repo
                .get_product_for_update(&mut *tx, item.product_id)
                .await?
                .ok_or(AppError::NotFound("Produto"))?;
            self.inventory_repo
                .set_product_quantity(
                    &mut *tx,
                    product.id,
                    product.current_quantity + item.quantity,
                )
                .await?;
        }

        self.inventory_repo
            .delete_movements_by_sale(&mut *tx, sale.id)
            .await?;

        // Título sem nenhum recebimento cai junto; com recebimento fica
        // para o acerto manual no financeiro.
        if let Some(receivable) = self.finance_service.get_by_sale(&mut *tx, sale.id).await? {
            if receivable.paid <= Decimal::ZERO {
                self.finance_service
                    .delete_receivable(&mut *tx, receivable.id)
                    .await?;
            }
        }

        self.repo
            .set_sale_status(&mut *tx, sale.id, SaleStatus::Cancelled)
            .await?;

        tx.commit().await?;
        sale.status = SaleStatus::Cancelled;
        Ok(sale)
    }

    /// Edição de cabeçalho (cliente, forma de pagamento, observação, data).
    /// Itens não mudam por aqui: estoque só se mexe criando ou cancelando a
    /// venda. Depois da edição o título é ressincronizado, porque cliente e
    /// prazo podem ter mudado.
    pub async fn update_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        customer_id: Option<Uuid>,
        payment_method_id: Option<Uuid>,
        note: Option<&str>,
        sold_at: Option<DateTime<Utc>>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let sale = self
            .repo
            .get_sale_for_update(&mut *tx, sale_id)
            .await?
            .ok_or(AppError::NotFound("Venda"))?;
        if sale.status == SaleStatus::Cancelled {
            return Err(AppError::SaleCancelled);
        }

        if let Some(id) = customer_id {
            self.parties_repo
                .get_customer(&mut *tx, id)
                .await?
                .ok_or(AppError::NotFound("Cliente"))?;
        }
        if let Some(id) = payment_method_id {
            self.repo
                .get_payment_method(&mut *tx, id)
                .await?
                .ok_or(AppError::NotFound("Forma de pagamento"))?;
        }

        let mut updated = self
            .repo
            .update_sale_header(
                &mut *tx,
                sale.id,
                customer_id,
                payment_method_id,
                note,
                sold_at.unwrap_or(sale.sold_at),
            )
            .await?
            .ok_or(AppError::NotFound("Venda"))?;

        let total = self.repo.sum_items_value(&mut *tx, updated.id).await?;
        let total_paid = self.repo.sum_payments(&mut *tx, updated.id).await?;

        // Sem pagamento, o status volta ao estado base do novo cabeçalho
        // (a prazo = aberta, balcão = finalizada); com pagamento, deriva.
        let new_status = if total_paid > Decimal::ZERO {
            updated
                .status
                .reconcile(updated.customer_id.is_some(), total, total_paid)
        } else if updated.customer_id.is_some() {
            SaleStatus::Open
        } else {
            SaleStatus::Finalized
        };
        if new_status != updated.status {
            self.repo
                .set_sale_status(&mut *tx, updated.id, new_status)
                .await?;
            updated.status = new_status;
        }

        self.reconcile_and_mirror(&mut tx, &updated, total, total_paid)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // =========================================================================
    //  Consultas
    // =========================================================================

    pub async fn list_sales<'e, E>(
        &self,
        executor: E,
        filter: &SaleFilter,
    ) -> Result<Vec<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_sales(executor, filter).await
    }

    pub async fn get_sale_detail<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<SaleDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let sale = self
            .repo
            .get_sale(&mut *tx, sale_id)
            .await?
            .ok_or(AppError::NotFound("Venda"))?;

        let items = self.repo.list_sale_items(&mut *tx, sale.id).await?;
        let payments = self.repo.list_payments(&mut *tx, sale.id).await?;

        let customer_name = match sale.customer_id {
            Some(id) => self
                .parties_repo
                .get_customer(&mut *tx, id)
                .await?
                .map(|c| c.name),
            None => None,
        };
        let (payment_method_name, receipt_term_days) = match sale.payment_method_id {
            Some(id) => match self.repo.get_payment_method(&mut *tx, id).await? {
                Some(m) => (Some(m.name), Some(m.receipt_term_days)),
                None => (None, None),
            },
            None => (None, None),
        };

        tx.commit().await?;

        Ok(SaleDetail::assemble(
            sale,
            customer_name,
            payment_method_name,
            receipt_term_days,
            items,
            payments,
        ))
    }
}
