use chain_sol::SolError;
use thiserror::Error;

/// RPC and submission errors.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("transaction {signature} not confirmed after {attempts} attempts")]
    Unconfirmed { signature: String, attempts: u32 },

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error(transparent)]
    Sol(#[from] SolError),
}
