//! Wallet-provider seam and typed contract handles for the SimpleDEX client.
//!
//! Everything that talks to the chain goes through [`WalletProvider`]; the
//! contract handles in [`contract`] only build call data and decode results.

pub mod abi;
pub mod contract;
pub mod error;
pub mod networks;

use alloy_primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;

pub use abi::{IERC20, ISimpleDex, InterfaceDescriptor};
pub use contract::{Caller, Erc20Token, PendingTransaction, SigningHandle, SimpleDexContract};
pub use error::ProviderError;
pub use networks::NetworkRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    /// `true` when the transaction executed without reverting.
    pub status: bool,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the wallet for account access. The first account is the active one.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;
    async fn chain_id(&self) -> Result<u64, ProviderError>;
    async fn get_balance(&self, account: Address) -> Result<U256, ProviderError>;
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError>;
    /// Submits a transaction signed by the wallet on behalf of `from`.
    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<B256, ProviderError>;
    /// Resolves once the transaction is mined. Waits indefinitely.
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, ProviderError>;
}
