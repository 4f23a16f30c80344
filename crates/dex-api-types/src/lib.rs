use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OperationKind {
    #[serde(rename = "add_liquidity")]
    AddLiquidity,
    #[serde(rename = "remove_liquidity")]
    RemoveLiquidity,
    #[serde(rename = "swap_a_for_b")]
    SwapAforB,
    #[serde(rename = "swap_b_for_a")]
    SwapBforA,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::AddLiquidity,
        OperationKind::RemoveLiquidity,
        OperationKind::SwapAforB,
        OperationKind::SwapBforA,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::AddLiquidity => "add_liquidity",
            OperationKind::RemoveLiquidity => "remove_liquidity",
            OperationKind::SwapAforB => "swap_a_for_b",
            OperationKind::SwapBforA => "swap_b_for_a",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TokenSide {
    A,
    B,
}

impl TokenSide {
    pub fn label(&self) -> &'static str {
        match self {
            TokenSide::A => "Token A",
            TokenSide::B => "Token B",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    AforB,
    BforA,
}

impl SwapDirection {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            SwapDirection::AforB => OperationKind::SwapAforB,
            SwapDirection::BforA => OperationKind::SwapBforA,
        }
    }

    /// Token the caller pays in.
    pub fn source(&self) -> TokenSide {
        match self {
            SwapDirection::AforB => TokenSide::A,
            SwapDirection::BforA => TokenSide::B,
        }
    }
}

/// A user-entered amount together with its 18-decimal integer form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedAmount {
    pub token: TokenSide,
    pub input: String,
    pub base_units: U256,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRecord {
    pub tx_hash: B256,
    pub block_number: u64,
    pub kind: OperationKind,
    pub amounts: Vec<RecordedAmount>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReserveSnapshot {
    pub reserve_a: U256,
    pub reserve_b: U256,
}

impl ReserveSnapshot {
    pub fn has_zero_side(&self) -> bool {
        self.reserve_a.is_zero() || self.reserve_b.is_zero()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenBalance {
    pub token: Address,
    pub symbol: String,
    pub decimals: u8,
    pub amount: U256,
}
