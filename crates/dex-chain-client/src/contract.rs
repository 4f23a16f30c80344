use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_sol_types::SolCall;
use dex_api_types::ReserveSnapshot;
use std::sync::Arc;
use tracing::debug;

use crate::abi::{ERC20_REQUIRED, IERC20, ISimpleDex, InterfaceDescriptor, SIMPLE_DEX_REQUIRED};
use crate::{ProviderError, TxReceipt, WalletProvider};

/// Authorizes transactions for one account through the wallet provider.
#[derive(Clone)]
pub struct SigningHandle {
    provider: Arc<dyn WalletProvider>,
    account: Address,
}

impl SigningHandle {
    pub fn new(provider: Arc<dyn WalletProvider>, account: Address) -> Self {
        Self { provider, account }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub async fn send(&self, to: Address, data: Bytes) -> Result<PendingTransaction, ProviderError> {
        let hash = self
            .provider
            .send_transaction(self.account, to, data)
            .await?;
        debug!("submitted transaction {hash} from {}", self.account);
        Ok(PendingTransaction {
            hash,
            provider: Arc::clone(&self.provider),
        })
    }
}

pub struct PendingTransaction {
    hash: B256,
    provider: Arc<dyn WalletProvider>,
}

impl PendingTransaction {
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Waits for the receipt. A mined-but-reverted transaction is an error.
    pub async fn wait(self) -> Result<TxReceipt, ProviderError> {
        let receipt = self.provider.wait_for_receipt(self.hash).await?;
        if !receipt.status {
            return Err(ProviderError::Reverted(receipt.tx_hash));
        }
        Ok(receipt)
    }
}

/// What a contract handle is bound to: the bare connection for reads, or a
/// signer for reads and writes.
#[derive(Clone)]
pub enum Caller {
    ReadOnly(Arc<dyn WalletProvider>),
    Signer(SigningHandle),
}

impl Caller {
    fn provider(&self) -> &Arc<dyn WalletProvider> {
        match self {
            Caller::ReadOnly(provider) => provider,
            Caller::Signer(signer) => &signer.provider,
        }
    }

    fn signer(&self) -> Result<&SigningHandle, ProviderError> {
        match self {
            Caller::ReadOnly(_) => Err(ProviderError::NoSigner),
            Caller::Signer(signer) => Ok(signer),
        }
    }

    pub fn is_signer(&self) -> bool {
        matches!(self, Caller::Signer(_))
    }
}

#[derive(Clone)]
struct BoundContract {
    address: Address,
    caller: Caller,
}

impl BoundContract {
    async fn call_raw<C: SolCall>(&self, call: C) -> Result<Bytes, ProviderError> {
        self.caller
            .provider()
            .call(self.address, call.abi_encode().into())
            .await
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, ProviderError> {
        let data = self.call_raw(call).await?;
        C::abi_decode_returns(&data, true).map_err(decode_error::<C>)
    }

    async fn write<C: SolCall>(&self, call: C) -> Result<PendingTransaction, ProviderError> {
        let signer = self.caller.signer()?;
        signer.send(self.address, call.abi_encode().into()).await
    }
}

fn decode_error<C: SolCall>(err: alloy_sol_types::Error) -> ProviderError {
    ProviderError::Decode(format!("{}: {err}", C::SIGNATURE))
}

#[derive(Clone)]
pub struct SimpleDexContract {
    inner: BoundContract,
}

impl SimpleDexContract {
    /// Binds the DEX at `address`. Fails if the descriptor lacks a function the client calls.
    pub fn bind(
        address: Address,
        interface: &InterfaceDescriptor,
        caller: Caller,
    ) -> Result<Self, ProviderError> {
        interface.require(SIMPLE_DEX_REQUIRED)?;
        Ok(Self {
            inner: BoundContract { address, caller },
        })
    }

    pub fn address(&self) -> Address {
        self.inner.address
    }

    pub fn caller(&self) -> &Caller {
        &self.inner.caller
    }

    pub async fn token_a(&self) -> Result<Address, ProviderError> {
        Ok(self.inner.read(ISimpleDex::tokenACall {}).await?._0)
    }

    pub async fn token_b(&self) -> Result<Address, ProviderError> {
        Ok(self.inner.read(ISimpleDex::tokenBCall {}).await?._0)
    }

    pub async fn reserve_a(&self) -> Result<U256, ProviderError> {
        Ok(self.inner.read(ISimpleDex::reserveACall {}).await?._0)
    }

    pub async fn reserve_b(&self) -> Result<U256, ProviderError> {
        Ok(self.inner.read(ISimpleDex::reserveBCall {}).await?._0)
    }

    pub async fn reserves(&self) -> Result<ReserveSnapshot, ProviderError> {
        let (reserve_a, reserve_b) = tokio::try_join!(self.reserve_a(), self.reserve_b())?;
        Ok(ReserveSnapshot {
            reserve_a,
            reserve_b,
        })
    }

    pub async fn get_price(&self, token: Address) -> Result<U256, ProviderError> {
        let call = ISimpleDex::getPriceCall { _token: token };
        Ok(self.inner.read(call).await?._0)
    }

    pub async fn swap_a_for_b(&self, amount_in: U256) -> Result<PendingTransaction, ProviderError> {
        self.inner
            .write(ISimpleDex::swapAforBCall {
                amountAIn: amount_in,
            })
            .await
    }

    pub async fn swap_b_for_a(&self, amount_in: U256) -> Result<PendingTransaction, ProviderError> {
        self.inner
            .write(ISimpleDex::swapBforACall {
                amountBIn: amount_in,
            })
            .await
    }

    pub async fn add_liquidity(
        &self,
        amount_a: U256,
        amount_b: U256,
    ) -> Result<PendingTransaction, ProviderError> {
        self.inner
            .write(ISimpleDex::addLiquidityCall {
                amountA: amount_a,
                amountB: amount_b,
            })
            .await
    }

    pub async fn remove_liquidity(
        &self,
        amount_a: U256,
        amount_b: U256,
    ) -> Result<PendingTransaction, ProviderError> {
        self.inner
            .write(ISimpleDex::removeLiquidityCall {
                amountA: amount_a,
                amountB: amount_b,
            })
            .await
    }
}

#[derive(Clone)]
pub struct Erc20Token {
    inner: BoundContract,
}

impl Erc20Token {
    pub fn bind(
        address: Address,
        interface: &InterfaceDescriptor,
        caller: Caller,
    ) -> Result<Self, ProviderError> {
        interface.require(ERC20_REQUIRED)?;
        Ok(Self {
            inner: BoundContract { address, caller },
        })
    }

    pub fn address(&self) -> Address {
        self.inner.address
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256, ProviderError> {
        Ok(self.inner.read(IERC20::balanceOfCall { owner }).await?._0)
    }

    /// Some older tokens return `bytes32` instead of `string`.
    pub async fn symbol(&self) -> Result<String, ProviderError> {
        let data = self.inner.call_raw(IERC20::symbolCall {}).await?;
        match IERC20::symbolCall::abi_decode_returns(&data, true) {
            Ok(decoded) => Ok(decoded._0),
            Err(_) if data.len() == 32 => {
                let raw = B256::from_slice(&data);
                let text = raw.split(|byte| *byte == 0).next().unwrap_or_default();
                String::from_utf8(text.to_vec())
                    .map_err(|err| ProviderError::Decode(format!("symbol: {err}")))
            }
            Err(err) => Err(decode_error::<IERC20::symbolCall>(err)),
        }
    }

    pub async fn decimals(&self) -> Result<u8, ProviderError> {
        Ok(self.inner.read(IERC20::decimalsCall {}).await?._0)
    }

    pub async fn approve(
        &self,
        spender: Address,
        amount: U256,
    ) -> Result<PendingTransaction, ProviderError> {
        self.inner
            .write(IERC20::approveCall { spender, amount })
            .await
    }
}
