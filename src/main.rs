//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Catálogo, movimentações e consulta de preço
    let inventory_routes = Router::new()
        .route(
            "/categories",
            post(handlers::inventory::create_category).get(handlers::inventory::get_all_categories),
        )
        .route(
            "/categories/{id}",
            get(handlers::inventory::get_category)
                .put(handlers::inventory::update_category)
                .delete(handlers::inventory::delete_category),
        )
        .route(
            "/products",
            post(handlers::inventory::create_product).get(handlers::inventory::get_all_products),
        )
        .route(
            "/products/{id}",
            get(handlers::inventory::get_product)
                .put(handlers::inventory::update_product)
                .delete(handlers::inventory::delete_product),
        )
        .route("/products/{id}/price", get(handlers::inventory::get_product_price))
        .route(
            "/movements",
            post(handlers::inventory::create_movement).get(handlers::inventory::list_movements),
        )
        .route(
            "/movements/{id}",
            get(handlers::inventory::get_movement).delete(handlers::inventory::delete_movement),
        );

    // Cadastros
    let parties_routes = Router::new()
        .route(
            "/suppliers",
            post(handlers::parties::create_supplier).get(handlers::parties::get_all_suppliers),
        )
        .route(
            "/suppliers/{id}",
            get(handlers::parties::get_supplier)
                .put(handlers::parties::update_supplier)
                .delete(handlers::parties::delete_supplier),
        )
        .route(
            "/customers",
            post(handlers::parties::create_customer).get(handlers::parties::get_all_customers),
        )
        .route(
            "/customers/{id}",
            get(handlers::parties::get_customer)
                .put(handlers::parties::update_customer)
                .delete(handlers::parties::delete_customer),
        )
        .route(
            "/operators",
            post(handlers::parties::create_operator).get(handlers::parties::get_all_operators),
        );

    // Vendas, checkout e formas de pagamento
    let sales_routes = Router::new()
        .route(
            "/payment-methods",
            post(handlers::sales::create_payment_method)
                .get(handlers::sales::get_all_payment_methods),
        )
        .route(
            "/payment-methods/{id}",
            get(handlers::sales::get_payment_method)
                .put(handlers::sales::update_payment_method)
                .delete(handlers::sales::delete_payment_method),
        )
        .route(
            "/",
            post(handlers::sales::create_sale).get(handlers::sales::list_sales),
        )
        .route(
            "/{id}",
            get(handlers::sales::get_sale).put(handlers::sales::update_sale),
        )
        .route("/{id}/cancel", post(handlers::sales::cancel_sale))
        .route("/{id}/checkout", post(handlers::sales::checkout))
        .route(
            "/payments/{id}",
            axum::routing::delete(handlers::sales::delete_payment),
        );

    // Contas a receber
    let finance_routes = Router::new()
        .route(
            "/",
            post(handlers::finance::create_receivable).get(handlers::finance::list_receivables),
        )
        .route("/{id}", get(handlers::finance::get_receivable))
        .route("/{id}/payments", post(handlers::finance::pay_receivable));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        .nest("/api/inventory", inventory_routes)
        .nest("/api/parties", parties_routes)
        .nest("/api/sales", sales_routes)
        .nest("/api/receivables", finance_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
