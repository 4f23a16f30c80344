use dex_session::{DisplaySink, InputField, Notice, NoticeKind, Region, TransactionDetail};
use tracing::debug;

fn region_label(region: Region) -> &'static str {
    match region {
        Region::Status => "Status",
        Region::Account => "Account",
        Region::Network => "Network",
        Region::NativeBalance => "Balance",
        Region::TokenABalance | Region::TokenBBalance => "Token",
        Region::TokenAAddress => "Token A address",
        Region::TokenBAddress => "Token B address",
        Region::ReserveA => "Reserve A",
        Region::ReserveB => "Reserve B",
        Region::RateAtoB | Region::RateBtoA => "Rate",
        Region::TokenPrice => "Token price",
    }
}

fn field_label(field: InputField) -> &'static str {
    match field {
        InputField::SwapAmountA => "swap amount (Token A)",
        InputField::SwapAmountB => "swap amount (Token B)",
        InputField::AddAmountA => "add amount (Token A)",
        InputField::AddAmountB => "add amount (Token B)",
        InputField::RemoveAmountA => "remove amount (Token A)",
        InputField::RemoveAmountB => "remove amount (Token B)",
        InputField::TokenAddress => "token address",
    }
}

/// Prints every display update to stdout, one line each.
#[derive(Debug, Default)]
pub(crate) struct ConsoleSink;

impl DisplaySink for ConsoleSink {
    fn set_region(&self, region: Region, text: &str) {
        println!("{:<16} {}", region_label(region), text);
    }

    fn set_field_error(&self, field: InputField, message: Option<&str>) {
        if let Some(message) = message {
            println!("  ! {}: {}", field_label(field), message);
        }
    }

    fn clear_input(&self, field: InputField) {
        debug!("cleared {}", field_label(field));
    }

    fn show_notice(&self, notice: Notice) {
        let tag = match notice.kind {
            NoticeKind::Info => "info",
            NoticeKind::Swap => "swap",
            NoticeKind::Success => "done",
            NoticeKind::Error => "error",
        };
        println!("[{}] {}", tag, notice.message);
    }

    fn dismiss_notice(&self) {}

    fn show_transaction(&self, detail: &TransactionDetail) {
        println!("{}", detail.title);
        println!("  Transaction hash: {}", detail.tx_hash);
        println!("  Block number: {}", detail.block_number);
        for line in &detail.lines {
            println!("  {}", line);
        }
    }
}
