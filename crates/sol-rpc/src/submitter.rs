use crate::error::RpcError;

/// Everything the tools need from a cluster: fresh blockhashes, balance and
/// fee queries, transaction submission and confirmation, and devnet airdrops.
///
/// Transactions arrive already signed in wire format; implementations never
/// see key material.
pub trait TransactionSubmitter {
    fn latest_blockhash(&self) -> Result<[u8; 32], RpcError>;

    /// Submit a signed wire transaction, returning its signature.
    fn send_transaction(&self, wire: &[u8]) -> Result<String, RpcError>;

    /// Wait until `signature` reaches the configured commitment.
    fn confirm_transaction(&self, signature: &str) -> Result<(), RpcError>;

    /// Balance in lamports.
    fn balance(&self, pubkey: &[u8; 32]) -> Result<u64, RpcError>;

    /// Fee in lamports for a serialized message.
    fn fee_for_message(&self, message: &[u8]) -> Result<u64, RpcError>;

    fn request_airdrop(&self, pubkey: &[u8; 32], lamports: u64) -> Result<String, RpcError>;

    fn send_and_confirm(&self, wire: &[u8]) -> Result<String, RpcError> {
        let signature = self.send_transaction(wire)?;
        self.confirm_transaction(&signature)?;
        Ok(signature)
    }
}
