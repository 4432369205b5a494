// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- INVENTORY ---
        handlers::inventory::create_category,
        handlers::inventory::get_all_categories,
        handlers::inventory::get_category,
        handlers::inventory::update_category,
        handlers::inventory::delete_category,
        handlers::inventory::create_product,
        handlers::inventory::get_all_products,
        handlers::inventory::get_product,
        handlers::inventory::update_product,
        handlers::inventory::delete_product,
        handlers::inventory::get_product_price,
        handlers::inventory::create_movement,
        handlers::inventory::list_movements,
        handlers::inventory::get_movement,
        handlers::inventory::delete_movement,

        // --- PARTIES ---
        handlers::parties::create_supplier,
        handlers::parties::get_all_suppliers,
        handlers::parties::get_supplier,
        handlers::parties::update_supplier,
        handlers::parties::delete_supplier,
        handlers::parties::create_customer,
        handlers::parties::get_all_customers,
        handlers::parties::get_customer,
        handlers::parties::update_customer,
        handlers::parties::delete_customer,
        handlers::parties::create_operator,
        handlers::parties::get_all_operators,

        // --- SALES ---
        handlers::sales::create_payment_method,
        handlers::sales::get_all_payment_methods,
        handlers::sales::get_payment_method,
        handlers::sales::update_payment_method,
        handlers::sales::delete_payment_method,
        handlers::sales::create_sale,
        handlers::sales::list_sales,
        handlers::sales::get_sale,
        handlers::sales::update_sale,
        handlers::sales::cancel_sale,
        handlers::sales::checkout,
        handlers::sales::delete_payment,

        // --- FINANCE ---
        handlers::finance::create_receivable,
        handlers::finance::list_receivables,
        handlers::finance::get_receivable,
        handlers::finance::pay_receivable,

        // --- DASHBOARD ---
        handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            models::inventory::Category,
            models::inventory::Product,
            models::inventory::MovementKind,
            models::inventory::StockMovement,
            models::parties::Supplier,
            models::parties::Customer,
            models::parties::Operator,
            models::sales::PaymentMethod,
            models::sales::SaleStatus,
            models::sales::Sale,
            models::sales::SaleItem,
            models::sales::Payment,
            models::sales::SaleDetail,
            models::finance::ReceivableStatus,
            models::finance::Receivable,
            models::finance::ReceivablePayment,
            models::finance::ReceivableDetail,
            models::dashboard::DashboardSummary,
            models::dashboard::MovementKindTotals,
            models::dashboard::TopProductEntry,
            models::dashboard::DashboardReport,

            // Payloads e respostas dos handlers
            handlers::inventory::CategoryPayload,
            handlers::inventory::CreateProductPayload,
            handlers::inventory::UpdateProductPayload,
            handlers::inventory::ProductPriceResponse,
            handlers::inventory::RegisterMovementPayload,
            handlers::inventory::MovementRegistered,
            handlers::inventory::MovementListResponse,
            handlers::parties::SupplierPayload,
            handlers::parties::CustomerPayload,
            handlers::parties::OperatorPayload,
            handlers::sales::PaymentMethodPayload,
            handlers::sales::SaleItemPayload,
            handlers::sales::CreateSalePayload,
            handlers::sales::UpdateSalePayload,
            handlers::sales::PaymentPairPayload,
            handlers::sales::CheckoutPayload,
            handlers::finance::CreateReceivablePayload,
            handlers::finance::PayReceivablePayload,
        )
    ),
    tags(
        (name = "Inventory", description = "Catálogo e livro-razão de estoque"),
        (name = "Parties", description = "Fornecedores, clientes e operadores"),
        (name = "Sales", description = "Vendas, checkout e formas de pagamento"),
        (name = "Finance", description = "Contas a receber"),
        (name = "Dashboard", description = "Painel geral"),
    ),
    info(
        title = "AquaGest - Distribuidora de Água",
        description = "Estoque, vendas e contas a receber da distribuidora.",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
