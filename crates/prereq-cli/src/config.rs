//! Runtime configuration.
//!
//! Every setting comes from a command-line flag or its environment variable;
//! nothing is loaded implicitly. The wallet file in particular is only read
//! by the commands that sign, from the path given here.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chain_sol::{read_keypair_file, Keypair};
use clap::Args;
use sol_rpc::{Commitment, RpcClient, RpcConfig, DEVNET_RPC_URL};

const EXPLORER_URL: &str = "https://explorer.solana.com";

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// JSON-RPC endpoint.
    #[arg(long, global = true, env = "SOL_RPC_URL", default_value = DEVNET_RPC_URL)]
    pub rpc_url: String,

    /// Wallet file (JSON array of 64 secret-key bytes) used for signing.
    #[arg(long, global = true, env = "SOL_KEYPAIR", default_value = "dev-wallet.json")]
    pub keypair: PathBuf,

    /// Cluster name used in explorer links.
    #[arg(long, global = true, env = "SOL_CLUSTER", default_value = "devnet")]
    pub cluster: String,

    /// Commitment a transaction must reach to count as confirmed.
    #[arg(long, global = true, default_value = "confirmed")]
    pub commitment: Commitment,

    /// Status polls before giving up on confirmation.
    #[arg(long, global = true, default_value_t = 30)]
    pub confirm_attempts: u32,

    /// Delay between status polls, in milliseconds.
    #[arg(long, global = true, default_value_t = 1000)]
    pub confirm_interval_ms: u64,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc: RpcConfig,
    pub keypair_path: PathBuf,
    pub cluster: String,
}

impl From<GlobalArgs> for Config {
    fn from(args: GlobalArgs) -> Self {
        Self {
            rpc: RpcConfig {
                url: args.rpc_url,
                commitment: args.commitment,
                confirm_attempts: args.confirm_attempts.max(1),
                confirm_interval: Duration::from_millis(args.confirm_interval_ms),
                ..RpcConfig::default()
            },
            keypair_path: args.keypair,
            cluster: args.cluster,
        }
    }
}

impl Config {
    pub fn load_keypair(&self) -> Result<Keypair> {
        read_keypair_file(&self.keypair_path)
            .with_context(|| format!("couldn't load wallet {}", self.keypair_path.display()))
    }

    pub fn rpc_client(&self) -> Result<RpcClient> {
        RpcClient::new(self.rpc.clone()).context("couldn't create RPC client")
    }

    pub fn explorer_tx_url(&self, signature: &str) -> String {
        format!("{EXPLORER_URL}/tx/{signature}?cluster={}", self.cluster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            rpc: RpcConfig::default(),
            keypair_path: PathBuf::from("dev-wallet.json"),
            cluster: "devnet".into(),
        }
    }

    #[test]
    fn explorer_link() {
        assert_eq!(
            config().explorer_tx_url("5Vf"),
            "https://explorer.solana.com/tx/5Vf?cluster=devnet"
        );
    }

    #[test]
    fn missing_wallet_names_the_path() {
        let mut config = config();
        config.keypair_path = PathBuf::from("/nonexistent/dev-wallet.json");
        let err = config.load_keypair().unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/dev-wallet.json"));
    }

    #[test]
    fn wallet_is_loaded_from_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let kp = Keypair::generate();
        chain_sol::write_keypair_file(&kp, &path).unwrap();

        let mut config = config();
        config.keypair_path = path;
        assert_eq!(config.load_keypair().unwrap().pubkey(), kp.pubkey());
    }
}
