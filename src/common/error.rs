use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia. Toda regra de
// negócio violada vira uma variante aqui e é recuperada na borda da
// operação: a transação sofre rollback e o cliente recebe a mensagem.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("Estoque insuficiente: {0}")]
    InsufficientStock(String),

    #[error("Pagamento de {attempted} excede o saldo pendente de {pending}")]
    Overpayment { attempted: Decimal, pending: Decimal },

    #[error("Valor de pagamento deve ser maior que zero")]
    InvalidAmount,

    #[error("Não foi possível alocar um número de venda livre")]
    DuplicateSaleNumber,

    #[error("Venda sem itens não pode ser registrada")]
    EmptySale,

    #[error("Venda cancelada não aceita alterações")]
    SaleCancelled,

    #[error("Movimentação pertence à venda e só é estornada pelo cancelamento")]
    MovementBoundToSale,

    #[error("Já existe um produto com o código {0}")]
    CodeAlreadyExists(String),

    #[error("Já existe um fornecedor com o CNPJ {0}")]
    TaxIdAlreadyExists(String),

    #[error("Já existe uma forma de pagamento chamada {0}")]
    MethodNameAlreadyExists(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),

            // Regras de negócio violadas: a requisição era válida na forma,
            // mas o estado atual não permite a operação.
            AppError::InsufficientStock(_)
            | AppError::Overpayment { .. }
            | AppError::InvalidAmount
            | AppError::EmptySale
            | AppError::SaleCancelled
            | AppError::MovementBoundToSale => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }

            AppError::CodeAlreadyExists(_)
            | AppError::TaxIdAlreadyExists(_)
            | AppError::MethodNameAlreadyExists(_)
            | AppError::DuplicateSaleNumber => (StatusCode::CONFLICT, self.to_string()),

            // Violação de FK: o payload apontou para um registro que não existe
            AppError::DatabaseError(ref db_err)
                if db_err
                    .as_database_error()
                    .map(|d| d.is_foreign_key_violation())
                    .unwrap_or(false) =>
            {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Referência inexistente.".to_string(),
                )
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
