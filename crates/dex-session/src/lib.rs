//! Session state and user-facing operations of the SimpleDEX client.
//!
//! [`SessionController`] owns the connected session, validates user input,
//! drives swaps and liquidity changes through the wallet, and reports every
//! outcome through a [`DisplaySink`].

pub mod address;
pub mod amount;
pub mod controller;
pub mod display;
pub mod error;
pub mod guard;
pub mod history;
pub mod session;

#[cfg(test)]
mod mock;

pub use address::{AddressError, parse_token_address};
pub use amount::{AmountError, FixedAmount, exchange_rates, format_units, parse_amount};
pub use controller::SessionController;
pub use display::{
    DisplaySink, InputField, Notice, NoticeKind, Region, TransactionDetail,
    render_transaction_detail,
};
pub use error::SessionError;
pub use guard::Action;
pub use session::{DexSettings, SessionState};
