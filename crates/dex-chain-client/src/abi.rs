use alloy_json_abi::{ContractObject, JsonAbi};
use alloy_sol_types::{SolCall, sol};
use std::collections::BTreeSet;

use crate::ProviderError;

sol! {
    interface ISimpleDex {
        function tokenA() external view returns (address);
        function tokenB() external view returns (address);
        function reserveA() external view returns (uint256);
        function reserveB() external view returns (uint256);
        function getPrice(address _token) external view returns (uint256);
        function swapAforB(uint256 amountAIn) external;
        function swapBforA(uint256 amountBIn) external;
        function addLiquidity(uint256 amountA, uint256 amountB) external;
        function removeLiquidity(uint256 amountA, uint256 amountB) external;
    }

    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}

/// Every SimpleDEX function the client calls.
pub const SIMPLE_DEX_REQUIRED: &[&str] = &[
    ISimpleDex::tokenACall::SIGNATURE,
    ISimpleDex::tokenBCall::SIGNATURE,
    ISimpleDex::reserveACall::SIGNATURE,
    ISimpleDex::reserveBCall::SIGNATURE,
    ISimpleDex::getPriceCall::SIGNATURE,
    ISimpleDex::swapAforBCall::SIGNATURE,
    ISimpleDex::swapBforACall::SIGNATURE,
    ISimpleDex::addLiquidityCall::SIGNATURE,
    ISimpleDex::removeLiquidityCall::SIGNATURE,
];

/// Every ERC-20 function the client calls.
pub const ERC20_REQUIRED: &[&str] = &[
    IERC20::balanceOfCall::SIGNATURE,
    IERC20::approveCall::SIGNATURE,
    IERC20::symbolCall::SIGNATURE,
    IERC20::decimalsCall::SIGNATURE,
];

/// The functions a deployed contract is known to expose, by canonical
/// signature.
///
/// Call encoding always goes through the `sol!` bindings above; a descriptor
/// only decides whether a contract may be bound. Loading one from the
/// contract's own JSON ABI makes a mismatched deployment fail at bind time
/// instead of on the first call.
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    name: String,
    signatures: BTreeSet<String>,
}

impl InterfaceDescriptor {
    pub fn simple_dex() -> Self {
        Self::from_required("SimpleDEX", SIMPLE_DEX_REQUIRED)
    }

    pub fn erc20() -> Self {
        Self::from_required("ERC20", ERC20_REQUIRED)
    }

    fn from_required(name: &str, signatures: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            signatures: signatures.iter().map(|sig| (*sig).to_owned()).collect(),
        }
    }

    /// Parses a JSON ABI: either the bare entry array or a build artifact
    /// carrying it under `abi`. Non-function entries are ignored.
    pub fn from_json_abi(name: &str, json: &str) -> Result<Self, ProviderError> {
        let abi = match serde_json::from_str::<JsonAbi>(json) {
            Ok(abi) => abi,
            Err(_) => serde_json::from_str::<ContractObject>(json)
                .map_err(|err| ProviderError::Abi(format!("{name}: {err}")))?
                .abi
                .ok_or_else(|| ProviderError::Abi(format!("{name}: artifact has no abi")))?,
        };
        Ok(Self::from_abi(name, &abi))
    }

    pub fn from_abi(name: &str, abi: &JsonAbi) -> Self {
        Self {
            name: name.to_owned(),
            signatures: abi.functions().map(|function| function.signature()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declares(&self, signature: &str) -> bool {
        self.signatures.contains(signature)
    }

    /// Fails on the first signature the interface does not declare.
    pub fn require(&self, signatures: &[&str]) -> Result<(), ProviderError> {
        match signatures.iter().find(|sig| !self.declares(sig)) {
            Some(missing) => Err(ProviderError::MissingFunction {
                interface: self.name.clone(),
                function: (*missing).to_owned(),
            }),
            None => Ok(()),
        }
    }
}
