use alloy_primitives::B256;
use dex_api_types::TokenSide;
use dex_chain_client::ProviderError;
use thiserror::Error;

use crate::address::AddressError;
use crate::display::InputField;
use crate::guard::Action;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no wallet provider detected")]
    ProviderAbsent,
    #[error("wallet is not connected")]
    NotConnected,
    #[error("wallet granted no accounts")]
    NoAccounts,
    #[error("connection cancelled by a disconnect")]
    ConnectCancelled,
    #[error("{0} is already in progress")]
    Busy(Action),
    #[error("invalid amount in {fields:?}")]
    InvalidAmount { fields: Vec<InputField> },
    #[error("invalid token address: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("insufficient {} balance", .0.label())]
    InsufficientBalance(TokenSide),
    #[error("transaction rejected by user")]
    UserRejected,
    #[error("transaction {0} reverted")]
    Reverted(B256),
    #[error("exchange rate is out of range")]
    RateOutOfRange,
    #[error(transparent)]
    Provider(ProviderError),
}

impl From<ProviderError> for SessionError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UserRejected => SessionError::UserRejected,
            ProviderError::Reverted(hash) => SessionError::Reverted(hash),
            other => SessionError::Provider(other),
        }
    }
}
