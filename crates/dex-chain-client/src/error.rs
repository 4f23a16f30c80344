use alloy_primitives::B256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request rejected by the user")]
    UserRejected,
    #[error("method not supported by provider: {0}")]
    MethodNotFound(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed provider response: {0}")]
    Decode(String),
    #[error("abi error: {0}")]
    Abi(String),
    #[error("contract interface `{interface}` has no function `{function}`")]
    MissingFunction { interface: String, function: String },
    #[error("contract handle is read-only; a signer is required")]
    NoSigner,
    #[error("transaction {0} reverted")]
    Reverted(B256),
}

impl ProviderError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ProviderError::UserRejected)
    }
}
