//! Presentation boundary. The controller only ever writes text into named
//! regions, flags input fields, and raises notices; how they are drawn is up
//! to the [`DisplaySink`] implementation.

use dex_api_types::{OperationKind, TokenSide, TransactionRecord};
use std::time::Duration;

pub const ERROR_TEXT: &str = "Error";
pub const EMPTY_TEXT: &str = "-";
pub const ERROR_NOTICE_TTL: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Status,
    Account,
    Network,
    NativeBalance,
    TokenABalance,
    TokenBBalance,
    TokenAAddress,
    TokenBAddress,
    ReserveA,
    ReserveB,
    RateAtoB,
    RateBtoA,
    TokenPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    SwapAmountA,
    SwapAmountB,
    AddAmountA,
    AddAmountB,
    RemoveAmountA,
    RemoveAmountB,
    TokenAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Swap,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// `None` keeps the notice until it is replaced or dismissed.
    pub auto_dismiss: Option<Duration>,
}

impl Notice {
    pub fn pending(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            auto_dismiss: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            auto_dismiss: Some(ERROR_NOTICE_TTL),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            auto_dismiss: Some(ERROR_NOTICE_TTL),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            auto_dismiss: Some(ERROR_NOTICE_TTL),
        }
    }
}

/// View model for the "transaction details" dialog, shared by every operation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetail {
    pub kind: OperationKind,
    pub title: String,
    pub tx_hash: String,
    pub block_number: u64,
    pub lines: Vec<String>,
}

pub trait DisplaySink: Send + Sync {
    fn set_region(&self, region: Region, text: &str);
    /// `None` clears the field's error message.
    fn set_field_error(&self, field: InputField, message: Option<&str>);
    fn clear_input(&self, field: InputField);
    /// Replaces whatever notice is currently shown.
    fn show_notice(&self, notice: Notice);
    fn dismiss_notice(&self);
    fn show_transaction(&self, detail: &TransactionDetail);
}

pub fn operation_title(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::AddLiquidity => "Add Liquidity",
        OperationKind::RemoveLiquidity => "Remove Liquidity",
        OperationKind::SwapAforB => "Swap Token A for Token B",
        OperationKind::SwapBforA => "Swap Token B for Token A",
    }
}

pub fn no_transaction_message(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::SwapAforB => "No previous Token A for Token B swap transactions",
        OperationKind::SwapBforA => "No previous Token B for Token A swap transactions",
        OperationKind::AddLiquidity => "No previous add-liquidity transactions",
        OperationKind::RemoveLiquidity => "No previous remove-liquidity transactions",
    }
}

fn amount_verb(kind: OperationKind, token: TokenSide) -> &'static str {
    match (kind, token) {
        (OperationKind::AddLiquidity, _) => "added",
        (OperationKind::RemoveLiquidity, _) => "removed",
        (OperationKind::SwapAforB, TokenSide::A) | (OperationKind::SwapBforA, TokenSide::B) => {
            "swapped"
        }
        (OperationKind::SwapAforB, TokenSide::B) | (OperationKind::SwapBforA, TokenSide::A) => {
            "received"
        }
    }
}

pub fn render_transaction_detail(record: &TransactionRecord) -> TransactionDetail {
    let lines = record
        .amounts
        .iter()
        .map(|amount| {
            format!(
                "{} {}: {} Tokens",
                amount.token.label(),
                amount_verb(record.kind, amount.token),
                amount.input
            )
        })
        .collect();

    TransactionDetail {
        kind: record.kind,
        title: format!("{} - Transaction Details", operation_title(record.kind)),
        tx_hash: record.tx_hash.to_string(),
        block_number: record.block_number,
        lines,
    }
}
