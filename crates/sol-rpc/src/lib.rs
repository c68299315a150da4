//! JSON-RPC access to a Solana cluster.
//!
//! [`TransactionSubmitter`] is the network capability the command-line tools
//! depend on; [`RpcClient`] implements it over HTTP with a blocking `reqwest`
//! client. Tests substitute an in-memory implementation.

pub mod client;
pub mod error;
pub mod submitter;

pub use client::{Commitment, RpcClient, RpcConfig, DEVNET_RPC_URL};
pub use error::RpcError;
pub use submitter::TransactionSubmitter;
