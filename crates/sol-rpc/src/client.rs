//! Blocking JSON-RPC 2.0 client.
//!
//! Transactions and messages go over the wire base64-encoded. Solana reports
//! most failures as an HTTP 200 carrying an `error` object; those surface as
//! [`RpcError::Rpc`].

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chain_sol::{address_to_bytes, bytes_to_address};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::RpcError;
use crate::submitter::TransactionSubmitter;

pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

/// How settled a transaction must be before it counts as confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!(
                "unknown commitment {other:?} (expected processed, confirmed or finalized)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
    pub commitment: Commitment,
    /// Number of status polls before giving up on confirmation.
    pub confirm_attempts: u32,
    pub confirm_interval: Duration,
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: DEVNET_RPC_URL.to_string(),
            commitment: Commitment::Confirmed,
            confirm_attempts: 30,
            confirm_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct RpcClient {
    http: reqwest::blocking::Client,
    config: RpcConfig,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = request.id, url = %self.config.url, "rpc request");

        let body = self
            .http
            .post(&self.config.url)
            .json(&request)
            .send()?
            .error_for_status()?
            .text()?;

        parse_response(&body)
    }

    fn commitment_param(&self) -> Value {
        json!({ "commitment": self.config.commitment.as_str() })
    }
}

impl TransactionSubmitter for RpcClient {
    fn latest_blockhash(&self) -> Result<[u8; 32], RpcError> {
        let response: WithContext<BlockhashValue> =
            self.call("getLatestBlockhash", json!([self.commitment_param()]))?;

        address_to_bytes(&response.value.blockhash)
            .map_err(|e| RpcError::InvalidResponse(format!("blockhash: {e}")))
    }

    fn send_transaction(&self, wire: &[u8]) -> Result<String, RpcError> {
        let params = json!([
            STANDARD.encode(wire),
            {
                "encoding": "base64",
                "preflightCommitment": self.config.commitment.as_str(),
            }
        ]);
        let signature: String = self.call("sendTransaction", params)?;
        info!(%signature, "transaction submitted");
        Ok(signature)
    }

    fn confirm_transaction(&self, signature: &str) -> Result<(), RpcError> {
        let attempts = self.config.confirm_attempts;
        for attempt in 1..=attempts {
            let response: WithContext<Vec<Option<SignatureStatus>>> = self.call(
                "getSignatureStatuses",
                json!([[signature], { "searchTransactionHistory": true }]),
            )?;

            let status = response.value.into_iter().next().flatten();
            if status_reached(status.as_ref(), self.config.commitment)? {
                info!(%signature, commitment = %self.config.commitment, "transaction confirmed");
                return Ok(());
            }

            debug!(%signature, attempt, "waiting for confirmation");
            if attempt < attempts {
                thread::sleep(self.config.confirm_interval);
            }
        }

        Err(RpcError::Unconfirmed {
            signature: signature.to_string(),
            attempts,
        })
    }

    fn balance(&self, pubkey: &[u8; 32]) -> Result<u64, RpcError> {
        let response: WithContext<u64> = self.call(
            "getBalance",
            json!([bytes_to_address(pubkey), self.commitment_param()]),
        )?;
        Ok(response.value)
    }

    fn fee_for_message(&self, message: &[u8]) -> Result<u64, RpcError> {
        let response: WithContext<Option<u64>> = self.call(
            "getFeeForMessage",
            json!([STANDARD.encode(message), self.commitment_param()]),
        )?;

        response.value.ok_or_else(|| {
            RpcError::InvalidResponse("no fee for message (blockhash expired?)".into())
        })
    }

    fn request_airdrop(&self, pubkey: &[u8; 32], lamports: u64) -> Result<String, RpcError> {
        let signature: String = self.call(
            "requestAirdrop",
            json!([bytes_to_address(pubkey), lamports]),
        )?;
        info!(%signature, lamports, "airdrop requested");
        Ok(signature)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    err: Option<Value>,
    confirmation_status: Option<Commitment>,
}

fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, RpcError> {
    let response: RpcResponse<T> = serde_json::from_str(body)
        .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

    if let Some(err) = response.error {
        return Err(RpcError::Rpc {
            code: err.code,
            message: err.message,
        });
    }

    response
        .result
        .ok_or_else(|| RpcError::InvalidResponse("missing result".into()))
}

/// Whether a signature status satisfies `target`. A status carrying an
/// error means the transaction landed but failed.
fn status_reached(status: Option<&SignatureStatus>, target: Commitment) -> Result<bool, RpcError> {
    let Some(status) = status else {
        return Ok(false);
    };

    if let Some(err) = &status.err {
        return Err(RpcError::TransactionFailed(err.to_string()));
    }

    Ok(status.confirmation_status.is_some_and(|c| c >= target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_blockhash_response() {
        let body = r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":2792},
            "value":{"blockhash":"EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N","lastValidBlockHeight":3090}}}"#;
        let parsed: WithContext<BlockhashValue> = parse_response(body).unwrap();
        assert_eq!(parsed.value.blockhash, "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N");
        assert_eq!(address_to_bytes(&parsed.value.blockhash).unwrap().len(), 32);
    }

    #[test]
    fn parse_plain_result() {
        let body = r#"{"jsonrpc":"2.0","id":3,"result":"2id3YC2jK9G5Wo2phDx4gJVAew8DcY5NAojnVuao8rkxwPYPe8cSwE5GzhEgJA2y8fVjDEo6iR6ykBvDxrTQrtpb"}"#;
        let sig: String = parse_response(body).unwrap();
        assert!(sig.starts_with("2id3"));
    }

    #[test]
    fn parse_balance() {
        let body = r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":2000000000}}"#;
        let parsed: WithContext<u64> = parse_response(body).unwrap();
        assert_eq!(parsed.value, 2_000_000_000);
    }

    #[test]
    fn parse_null_fee() {
        let body = r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":null}}"#;
        let parsed: WithContext<Option<u64>> = parse_response(body).unwrap();
        assert_eq!(parsed.value, None);
    }

    #[test]
    fn rpc_error_object_is_surfaced() {
        let body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":429,"message":"airdrop limit reached"}}"#;
        let err = parse_response::<String>(body).unwrap_err();
        match err {
            RpcError::Rpc { code, message } => {
                assert_eq!(code, 429);
                assert_eq!(message, "airdrop limit reached");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_result_is_invalid() {
        let body = r#"{"jsonrpc":"2.0","id":1}"#;
        assert!(matches!(
            parse_response::<String>(body),
            Err(RpcError::InvalidResponse(_))
        ));
    }

    #[test]
    fn garbage_body_is_invalid() {
        assert!(matches!(
            parse_response::<String>("<html>502</html>"),
            Err(RpcError::InvalidResponse(_))
        ));
    }

    // -- confirmation ---------------------------------------------------------

    fn statuses(body: &str) -> Option<SignatureStatus> {
        let parsed: WithContext<Vec<Option<SignatureStatus>>> = parse_response(body).unwrap();
        parsed.value.into_iter().next().flatten()
    }

    #[test]
    fn unknown_signature_is_not_reached() {
        let status = statuses(r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":[null]}}"#);
        assert!(!status_reached(status.as_ref(), Commitment::Confirmed).unwrap());
    }

    #[test]
    fn processed_is_below_confirmed() {
        let status = statuses(
            r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":[
                {"slot":5,"confirmations":0,"err":null,"confirmationStatus":"processed"}]}}"#,
        );
        assert!(!status_reached(status.as_ref(), Commitment::Confirmed).unwrap());
        assert!(status_reached(status.as_ref(), Commitment::Processed).unwrap());
    }

    #[test]
    fn finalized_satisfies_confirmed() {
        let status = statuses(
            r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":[
                {"slot":5,"confirmations":null,"err":null,"confirmationStatus":"finalized"}]}}"#,
        );
        assert!(status_reached(status.as_ref(), Commitment::Confirmed).unwrap());
    }

    #[test]
    fn failed_transaction_is_an_error() {
        let status = statuses(
            r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":[
                {"slot":5,"confirmations":1,"err":{"InstructionError":[0,{"Custom":0}]},
                 "confirmationStatus":"confirmed"}]}}"#,
        );
        let err = status_reached(status.as_ref(), Commitment::Confirmed).unwrap_err();
        assert!(err.to_string().contains("InstructionError"));
    }

    #[test]
    fn commitment_from_str() {
        assert_eq!("finalized".parse::<Commitment>().unwrap(), Commitment::Finalized);
        assert!("max".parse::<Commitment>().is_err());
        assert!(Commitment::Processed < Commitment::Finalized);
    }

    #[test]
    fn default_config_targets_devnet() {
        let config = RpcConfig::default();
        assert_eq!(config.url, DEVNET_RPC_URL);
        assert_eq!(config.commitment, Commitment::Confirmed);
    }
}
