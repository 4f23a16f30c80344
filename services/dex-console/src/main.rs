mod command;
mod config;
mod console;

use anyhow::Context;
use dex_chain_client::WalletProvider;
use dex_chain_rpc::JsonRpcProvider;
use dex_session::{SessionController, SessionState};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::command::{Command, HELP};
use crate::config::ConsoleConfig;
use crate::console::ConsoleSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ConsoleConfig::from_env()?;
    let provider =
        JsonRpcProvider::new(Some(config.rpc_url.clone())).with_poll_interval(config.receipt_poll);
    info!(
        "dex-console using {} for SimpleDEX at {}",
        provider.endpoint(),
        config.settings.contract_address
    );

    let provider: Arc<dyn WalletProvider> = Arc::new(provider);
    let controller =
        SessionController::new(Some(provider), config.settings, Arc::new(ConsoleSink))
            .with_networks(config.networks);

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        match command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => run(&controller, command).await,
            Ok(None) => {}
            Err(err) => println!("{err}"),
        }
    }

    controller.disconnect().await;
    Ok(())
}

/// Operation failures are already logged and shown by the controller.
async fn run(controller: &SessionController, command: Command) {
    match command {
        Command::Connect => {
            let _ = controller.connect().await;
        }
        Command::Disconnect => controller.disconnect().await,
        Command::Refresh => controller.refresh_all().await,
        Command::Status => {
            let state = controller.state().await;
            match (state, controller.account().await) {
                (SessionState::Connected, Some(account)) => {
                    println!("{:?} as {}", state, account.to_checksum(None))
                }
                _ => println!("{:?}", state),
            }
        }
        Command::Swap { direction, amount } => {
            let _ = controller.submit_swap(direction, &amount).await;
        }
        Command::AddLiquidity { amount_a, amount_b } => {
            let _ = controller.submit_add_liquidity(&amount_a, &amount_b).await;
        }
        Command::RemoveLiquidity { amount_a, amount_b } => {
            let _ = controller
                .submit_remove_liquidity(&amount_a, &amount_b)
                .await;
        }
        Command::Price(address) => {
            let _ = controller.get_token_price(&address).await;
        }
        Command::CheckAddress(address) => {
            if controller.validate_token_address_input(&address) {
                println!("address ok");
            }
        }
        Command::ClearPrice => controller.clear_token_price(),
        Command::Last(kind) => {
            let _ = controller.show_last_transaction(kind).await;
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}
