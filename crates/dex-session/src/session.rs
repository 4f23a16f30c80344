use alloy_primitives::Address;
use dex_api_types::NetworkInfo;
use dex_chain_client::{
    Caller, InterfaceDescriptor, SigningHandle, SimpleDexContract, WalletProvider,
};
use std::sync::Arc;

use crate::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Deployment configuration: where the DEX lives and how to talk to it.
#[derive(Clone)]
pub struct DexSettings {
    pub contract_address: Address,
    pub dex_interface: Arc<InterfaceDescriptor>,
    pub erc20_interface: Arc<InterfaceDescriptor>,
}

impl DexSettings {
    /// Uses the built-in SimpleDEX and ERC-20 interfaces.
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            dex_interface: Arc::new(InterfaceDescriptor::simple_dex()),
            erc20_interface: Arc::new(InterfaceDescriptor::erc20()),
        }
    }
}

#[derive(Clone, Default)]
pub struct Session {
    pub(crate) state: SessionState,
    pub(crate) connection: Option<Arc<dyn WalletProvider>>,
    pub(crate) signer: Option<SigningHandle>,
    pub(crate) account: Option<Address>,
    pub(crate) contract: Option<SimpleDexContract>,
    pub(crate) erc20: Option<Arc<InterfaceDescriptor>>,
    pub(crate) network: Option<NetworkInfo>,
}

impl Session {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn network(&self) -> Option<&NetworkInfo> {
        self.network.as_ref()
    }

    /// The bound contract, or a read-only handle on the connection when no
    /// signer-bound contract exists.
    pub(crate) fn read_contract(
        &self,
        settings: &DexSettings,
    ) -> Result<SimpleDexContract, SessionError> {
        if let Some(contract) = &self.contract {
            return Ok(contract.clone());
        }
        let connection = self.connection.clone().ok_or(SessionError::NotConnected)?;
        Ok(SimpleDexContract::bind(
            settings.contract_address,
            &settings.dex_interface,
            Caller::ReadOnly(connection),
        )?)
    }

    /// Everything a write needs, or `NotConnected`.
    pub(crate) fn writer(
        &self,
    ) -> Result<(SimpleDexContract, SigningHandle, Arc<InterfaceDescriptor>), SessionError> {
        match (&self.contract, &self.signer, &self.erc20) {
            (Some(contract), Some(signer), Some(erc20)) if self.state == SessionState::Connected => {
                Ok((contract.clone(), signer.clone(), Arc::clone(erc20)))
            }
            _ => Err(SessionError::NotConnected),
        }
    }
}
