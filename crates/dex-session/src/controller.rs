use alloy_primitives::{Address, U256};
use dex_api_types::{
    OperationKind, ReserveSnapshot, SwapDirection, TokenBalance, TokenSide, TransactionRecord,
};
use dex_chain_client::abi::ERC20_REQUIRED;
use dex_chain_client::{
    Caller, Erc20Token, InterfaceDescriptor, NetworkRegistry, ProviderError, SigningHandle,
    SimpleDexContract, TxReceipt, WalletProvider,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::address::{AddressError, parse_token_address};
use crate::amount::{FixedAmount, TOKEN_DECIMALS, exchange_rates, format_units, parse_amount};
use crate::display::{
    DisplaySink, EMPTY_TEXT, ERROR_TEXT, InputField, Notice, NoticeKind, Region,
    TransactionDetail, no_transaction_message, render_transaction_detail,
};
use crate::guard::{Action, InFlight, InFlightGuard};
use crate::history::TransactionLog;
use crate::session::{DexSettings, Session, SessionState};
use crate::SessionError;

#[derive(Debug, Clone, Copy)]
enum LiquidityOp {
    Add,
    Remove,
}

impl LiquidityOp {
    fn kind(self) -> OperationKind {
        match self {
            LiquidityOp::Add => OperationKind::AddLiquidity,
            LiquidityOp::Remove => OperationKind::RemoveLiquidity,
        }
    }

    fn action(self) -> Action {
        match self {
            LiquidityOp::Add => Action::AddLiquidity,
            LiquidityOp::Remove => Action::RemoveLiquidity,
        }
    }

    fn fields(self) -> (InputField, InputField) {
        match self {
            LiquidityOp::Add => (InputField::AddAmountA, InputField::AddAmountB),
            LiquidityOp::Remove => (InputField::RemoveAmountA, InputField::RemoveAmountB),
        }
    }

    fn label(self) -> &'static str {
        match self {
            LiquidityOp::Add => "add liquidity",
            LiquidityOp::Remove => "remove liquidity",
        }
    }

    fn pending_message(self) -> &'static str {
        match self {
            LiquidityOp::Add => "Adding liquidity...",
            LiquidityOp::Remove => "Removing liquidity...",
        }
    }
}

fn swap_label(direction: SwapDirection) -> &'static str {
    match direction {
        SwapDirection::AforB => "Token A for Token B swap",
        SwapDirection::BforA => "Token B for Token A swap",
    }
}

fn swap_field(direction: SwapDirection) -> InputField {
    match direction.source() {
        TokenSide::A => InputField::SwapAmountA,
        TokenSide::B => InputField::SwapAmountB,
    }
}

/// Owns the session and drives every user-facing operation against the
/// wallet provider, reporting results through the display sink.
pub struct SessionController {
    provider: Option<Arc<dyn WalletProvider>>,
    settings: DexSettings,
    networks: NetworkRegistry,
    display: Arc<dyn DisplaySink>,
    session: RwLock<Session>,
    history: RwLock<TransactionLog>,
    in_flight: InFlight,
}

impl SessionController {
    /// `provider` is `None` when the host has no wallet available.
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        settings: DexSettings,
        display: Arc<dyn DisplaySink>,
    ) -> Self {
        Self {
            provider,
            settings,
            networks: NetworkRegistry::default(),
            display,
            session: RwLock::new(Session::default()),
            history: RwLock::new(TransactionLog::default()),
            in_flight: InFlight::default(),
        }
    }

    pub fn with_networks(mut self, networks: NetworkRegistry) -> Self {
        self.networks = networks;
        self
    }

    pub async fn state(&self) -> SessionState {
        self.session.read().await.state()
    }

    pub async fn account(&self) -> Option<Address> {
        self.session.read().await.account()
    }

    pub async fn last_transaction(&self, kind: OperationKind) -> Option<TransactionRecord> {
        self.history.read().await.last(kind).cloned()
    }

    fn begin(&self, action: Action) -> Result<InFlightGuard<'_>, SessionError> {
        self.in_flight.try_begin(action).ok_or_else(|| {
            warn!("{} ignored: already in progress", action);
            SessionError::Busy(action)
        })
    }

    fn report_failure(&self, label: &str, err: SessionError) -> SessionError {
        if matches!(err, SessionError::UserRejected) {
            info!("{} cancelled in wallet", label);
        } else {
            error!("{} failed: {}", label, err);
        }
        self.display
            .show_notice(Notice::error(format!("{} failed: {}", label, err)));
        err
    }

    pub async fn connect(&self) -> Result<(), SessionError> {
        let _guard = self.begin(Action::Connect)?;
        let Some(provider) = self.provider.clone() else {
            error!("no wallet provider detected; install a wallet to connect");
            self.display
                .show_notice(Notice::error("No wallet provider detected"));
            return Err(SessionError::ProviderAbsent);
        };

        info!("connecting wallet");
        let previous = {
            let mut session = self.session.write().await;
            let previous = session.state;
            session.state = SessionState::Connecting;
            previous
        };

        let established = match self.establish(provider).await {
            Ok(session) => session,
            Err(err) => {
                let mut session = self.session.write().await;
                if session.state == SessionState::Connecting {
                    session.state = previous;
                }
                drop(session);
                return Err(self.report_failure("wallet connection", err));
            }
        };

        let account = established.account;
        let network = established.network.clone();
        {
            let mut session = self.session.write().await;
            if session.state != SessionState::Connecting {
                info!("wallet disconnected while connecting; discarding new session");
                return Err(SessionError::ConnectCancelled);
            }
            *session = established;
        }

        if let Some(account) = account {
            info!("wallet connected as {}", account);
            self.display
                .set_region(Region::Account, &account.to_checksum(None));
        }
        match network {
            Some(network) => self.display.set_region(Region::Network, &network.name),
            None => self
                .display
                .set_region(Region::Network, "Network not detected"),
        }
        self.display.set_region(Region::Status, "Connected");

        self.refresh_all().await;
        Ok(())
    }

    /// Builds a fully connected session without touching the shared one.
    async fn establish(&self, provider: Arc<dyn WalletProvider>) -> Result<Session, SessionError> {
        let accounts = provider.request_accounts().await?;
        let account = *accounts.first().ok_or(SessionError::NoAccounts)?;
        let signer = SigningHandle::new(Arc::clone(&provider), account);

        let network = match provider.chain_id().await {
            Ok(chain_id) => {
                let network = self.networks.resolve(chain_id);
                info!("active network: {} ({})", network.name, network.chain_id);
                Some(network)
            }
            Err(err) => {
                warn!("could not detect network: {}", err);
                None
            }
        };

        self.settings.erc20_interface.require(ERC20_REQUIRED)?;
        let contract = SimpleDexContract::bind(
            self.settings.contract_address,
            &self.settings.dex_interface,
            Caller::Signer(signer.clone()),
        )?;
        debug!("bound SimpleDEX at {}", contract.address());

        Ok(Session {
            state: SessionState::Connected,
            connection: Some(provider),
            signer: Some(signer),
            account: Some(account),
            contract: Some(contract),
            erc20: Some(Arc::clone(&self.settings.erc20_interface)),
            network,
        })
    }

    pub async fn disconnect(&self) {
        *self.session.write().await = Session::default();
        self.display.set_region(Region::Account, EMPTY_TEXT);
        self.display.set_region(Region::Network, EMPTY_TEXT);
        self.display.set_region(Region::Status, "Disconnected");
        info!("wallet disconnected");
    }

    async fn readable_contract(&self, what: &str) -> Result<SimpleDexContract, SessionError> {
        let contract = self.session.read().await.read_contract(&self.settings);
        if let Err(err) = &contract {
            warn!("{} refresh skipped: {}", what, err);
        }
        contract
    }

    pub async fn refresh_all(&self) {
        let _ = tokio::join!(
            self.refresh_token_addresses(),
            self.refresh_account_balance(),
            self.refresh_token_balances(),
            self.refresh_reserves(),
            self.refresh_exchange_rate(),
        );
    }

    async fn refresh_after_transaction(&self) {
        let _ = tokio::join!(
            self.refresh_account_balance(),
            self.refresh_token_balances(),
            self.refresh_reserves(),
            self.refresh_exchange_rate(),
        );
    }

    pub async fn refresh_account_balance(&self) -> Result<U256, SessionError> {
        let (connection, account) = {
            let session = self.session.read().await;
            match (session.connection.clone(), session.account) {
                (Some(connection), Some(account)) => (connection, account),
                _ => {
                    warn!("account balance refresh skipped: {}", SessionError::NotConnected);
                    return Err(SessionError::NotConnected);
                }
            }
        };

        match connection.get_balance(account).await {
            Ok(balance) => {
                let formatted = format_units(balance, TOKEN_DECIMALS);
                debug!("native balance {} ETH", formatted);
                self.display
                    .set_region(Region::NativeBalance, &format!("{} ETH", formatted));
                Ok(balance)
            }
            Err(err) => {
                error!("failed to read account balance: {}", err);
                self.display.set_region(Region::NativeBalance, ERROR_TEXT);
                Err(err.into())
            }
        }
    }

    pub async fn refresh_token_balances(&self) -> Result<(TokenBalance, TokenBalance), SessionError> {
        let (account, erc20) = {
            let session = self.session.read().await;
            match (session.account, session.erc20.clone()) {
                (Some(account), Some(erc20)) => (account, erc20),
                _ => {
                    warn!("token balance refresh skipped: {}", SessionError::NotConnected);
                    return Err(SessionError::NotConnected);
                }
            }
        };
        let contract = self.readable_contract("token balance").await?;

        match load_token_balances(&contract, &erc20, account).await {
            Ok((balance_a, balance_b)) => {
                for (region, balance) in [
                    (Region::TokenABalance, &balance_a),
                    (Region::TokenBBalance, &balance_b),
                ] {
                    self.display.set_region(
                        region,
                        &format!(
                            "{} Balance: {}",
                            balance.symbol,
                            format_units(balance.amount, balance.decimals)
                        ),
                    );
                }
                Ok((balance_a, balance_b))
            }
            Err(err) => {
                error!("failed to read token balances: {}", err);
                self.display
                    .set_region(Region::TokenABalance, "Token A Balance: Error");
                self.display
                    .set_region(Region::TokenBBalance, "Token B Balance: Error");
                Err(err.into())
            }
        }
    }

    pub async fn refresh_reserves(&self) -> Result<ReserveSnapshot, SessionError> {
        let contract = self.readable_contract("reserve").await?;
        match contract.reserves().await {
            Ok(reserves) => {
                self.display.set_region(
                    Region::ReserveA,
                    &format_units(reserves.reserve_a, TOKEN_DECIMALS),
                );
                self.display.set_region(
                    Region::ReserveB,
                    &format_units(reserves.reserve_b, TOKEN_DECIMALS),
                );
                Ok(reserves)
            }
            Err(err) => {
                error!("failed to read reserves: {}", err);
                self.display.set_region(Region::ReserveA, ERROR_TEXT);
                self.display.set_region(Region::ReserveB, ERROR_TEXT);
                Err(err.into())
            }
        }
    }

    /// Returns `(a_to_b, b_to_a)` as shown.
    pub async fn refresh_exchange_rate(&self) -> Result<(String, String), SessionError> {
        let contract = self.readable_contract("exchange rate").await?;
        let rates = match contract.reserves().await {
            Ok(reserves) => exchange_rates(&reserves).ok_or(SessionError::RateOutOfRange),
            Err(err) => Err(err.into()),
        };

        match rates {
            Ok((a_to_b, b_to_a)) => {
                self.display
                    .set_region(Region::RateAtoB, &format!("1 Token A = {} Token B", a_to_b));
                self.display
                    .set_region(Region::RateBtoA, &format!("1 Token B = {} Token A", b_to_a));
                Ok((a_to_b, b_to_a))
            }
            Err(err) => {
                error!("failed to compute exchange rate: {}", err);
                self.display
                    .set_region(Region::RateAtoB, "Error fetching rate");
                self.display
                    .set_region(Region::RateBtoA, "Error fetching rate");
                Err(err)
            }
        }
    }

    pub async fn refresh_token_addresses(&self) -> Result<(Address, Address), SessionError> {
        let contract = self.readable_contract("token address").await?;
        match tokio::try_join!(contract.token_a(), contract.token_b()) {
            Ok((token_a, token_b)) => {
                self.display
                    .set_region(Region::TokenAAddress, &token_a.to_checksum(None));
                self.display
                    .set_region(Region::TokenBAddress, &token_b.to_checksum(None));
                Ok((token_a, token_b))
            }
            Err(err) => {
                error!("failed to read token addresses: {}", err);
                self.display.set_region(Region::TokenAAddress, ERROR_TEXT);
                self.display.set_region(Region::TokenBAddress, ERROR_TEXT);
                Err(err.into())
            }
        }
    }

    pub async fn submit_swap(
        &self,
        direction: SwapDirection,
        amount: &str,
    ) -> Result<TransactionRecord, SessionError> {
        let action = match direction {
            SwapDirection::AforB => Action::SwapAforB,
            SwapDirection::BforA => Action::SwapBforA,
        };
        let _guard = self.begin(action)?;
        let label = swap_label(direction);
        let field = swap_field(direction);
        let source = direction.source();

        let amount = match parse_amount(amount) {
            Ok(amount) => amount,
            Err(reason) => {
                warn!("{} rejected: {}", label, reason);
                self.display.set_field_error(
                    field,
                    Some(&format!("Invalid {} amount", source.label())),
                );
                return Err(SessionError::InvalidAmount {
                    fields: vec![field],
                });
            }
        };
        self.display.set_field_error(field, None);

        let writer = self.session.read().await.writer();
        let (contract, signer, erc20) = match writer {
            Ok(writer) => writer,
            Err(err) => return Err(self.report_failure(label, err)),
        };

        info!("submitting {} of {}", label, amount.input());
        self.display.show_notice(Notice::pending(
            NoticeKind::Swap,
            format!("Processing {}...", label),
        ));
        let outcome = execute_swap(&contract, &signer, &erc20, direction, &amount).await;
        self.display.dismiss_notice();

        let receipt = outcome.map_err(|err| self.report_failure(label, err))?;
        let record = TransactionRecord {
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            kind: direction.operation_kind(),
            amounts: vec![amount.recorded(source)],
        };
        self.complete(&record, &[field]).await;
        Ok(record)
    }

    pub async fn submit_add_liquidity(
        &self,
        amount_a: &str,
        amount_b: &str,
    ) -> Result<TransactionRecord, SessionError> {
        self.submit_liquidity(LiquidityOp::Add, amount_a, amount_b)
            .await
    }

    pub async fn submit_remove_liquidity(
        &self,
        amount_a: &str,
        amount_b: &str,
    ) -> Result<TransactionRecord, SessionError> {
        self.submit_liquidity(LiquidityOp::Remove, amount_a, amount_b)
            .await
    }

    async fn submit_liquidity(
        &self,
        op: LiquidityOp,
        amount_a: &str,
        amount_b: &str,
    ) -> Result<TransactionRecord, SessionError> {
        let _guard = self.begin(op.action())?;
        let label = op.label();
        let (field_a, field_b) = op.fields();

        let (amount_a, amount_b) = match (parse_amount(amount_a), parse_amount(amount_b)) {
            (Ok(amount_a), Ok(amount_b)) => (amount_a, amount_b),
            (parsed_a, parsed_b) => {
                let mut fields = Vec::new();
                for (field, parsed) in [(field_a, parsed_a), (field_b, parsed_b)] {
                    match parsed {
                        Ok(_) => self.display.set_field_error(field, None),
                        Err(reason) => {
                            warn!("{} rejected: {:?} {}", label, field, reason);
                            self.display
                                .set_field_error(field, Some("Enter valid token amounts"));
                            fields.push(field);
                        }
                    }
                }
                return Err(SessionError::InvalidAmount { fields });
            }
        };
        self.display.set_field_error(field_a, None);
        self.display.set_field_error(field_b, None);

        let writer = self.session.read().await.writer();
        let (contract, signer, erc20) = match writer {
            Ok(writer) => writer,
            Err(err) => return Err(self.report_failure(label, err)),
        };

        info!(
            "submitting {} of {} / {}",
            label,
            amount_a.input(),
            amount_b.input()
        );
        self.display
            .show_notice(Notice::pending(NoticeKind::Info, op.pending_message()));
        let outcome = execute_liquidity(&contract, &signer, &erc20, op, &amount_a, &amount_b).await;
        self.display.dismiss_notice();

        let receipt = outcome.map_err(|err| self.report_failure(label, err))?;
        let record = TransactionRecord {
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            kind: op.kind(),
            amounts: vec![
                amount_a.recorded(TokenSide::A),
                amount_b.recorded(TokenSide::B),
            ],
        };
        self.complete(&record, &[field_a, field_b]).await;
        Ok(record)
    }

    /// Stores a confirmed record, shows it, then refreshes chain state.
    async fn complete(&self, record: &TransactionRecord, fields: &[InputField]) {
        info!(
            "{} confirmed in block {} ({})",
            record.kind.as_str(),
            record.block_number,
            record.tx_hash
        );
        self.history.write().await.record(record.clone());
        self.display
            .show_transaction(&render_transaction_detail(record));
        self.display.show_notice(Notice::success(format!(
            "Transaction confirmed in block {}",
            record.block_number
        )));
        for field in fields {
            self.display.clear_input(*field);
        }
        self.refresh_after_transaction().await;
    }

    pub async fn get_token_price(&self, token_address: &str) -> Result<U256, SessionError> {
        let _guard = self.begin(Action::PriceLookup)?;
        let field = InputField::TokenAddress;

        let token = match parse_token_address(token_address) {
            Ok(token) => token,
            Err(AddressError::Empty) => {
                warn!("price lookup without a token address");
                self.display
                    .set_field_error(field, Some("Please enter a token address"));
                return Err(AddressError::Empty.into());
            }
            Err(err) => {
                warn!("price lookup rejected: {}", err);
                self.display
                    .set_field_error(field, Some("Invalid token address"));
                self.display.set_region(Region::TokenPrice, EMPTY_TEXT);
                return Err(err.into());
            }
        };

        let contract = self.readable_contract("token price").await?;
        match contract.get_price(token).await {
            Ok(price) => {
                self.display.set_field_error(field, None);
                self.display.set_region(
                    Region::TokenPrice,
                    &format!("Price: {}", format_units(price, TOKEN_DECIMALS)),
                );
                Ok(price)
            }
            Err(err) => {
                error!("failed to fetch price for {}: {}", token, err);
                self.display
                    .set_field_error(field, Some("Error fetching token price"));
                self.display.set_region(Region::TokenPrice, EMPTY_TEXT);
                Err(err.into())
            }
        }
    }

    /// Live validation of the price-lookup field. Never touches the chain.
    pub fn validate_token_address_input(&self, text: &str) -> bool {
        let field = InputField::TokenAddress;
        match parse_token_address(text) {
            Ok(_) => {
                self.display.set_field_error(field, None);
                true
            }
            Err(AddressError::Empty) => {
                self.display.set_field_error(field, None);
                false
            }
            Err(_) => {
                self.display
                    .set_field_error(field, Some("Invalid address format"));
                false
            }
        }
    }

    pub fn clear_token_price(&self) {
        self.display.clear_input(InputField::TokenAddress);
        self.display.set_region(Region::TokenPrice, EMPTY_TEXT);
        self.display.set_field_error(InputField::TokenAddress, None);
    }

    pub async fn show_last_transaction(&self, kind: OperationKind) -> Option<TransactionDetail> {
        let detail = self
            .history
            .read()
            .await
            .last(kind)
            .map(render_transaction_detail);

        match detail {
            Some(detail) => {
                self.display.show_transaction(&detail);
                Some(detail)
            }
            None => {
                warn!("no previous {} transaction", kind.as_str());
                self.display
                    .show_notice(Notice::info(no_transaction_message(kind)));
                None
            }
        }
    }
}

async fn load_token_balances(
    contract: &SimpleDexContract,
    erc20: &Arc<InterfaceDescriptor>,
    owner: Address,
) -> Result<(TokenBalance, TokenBalance), ProviderError> {
    let (token_a, token_b) = tokio::try_join!(contract.token_a(), contract.token_b())?;
    tokio::try_join!(
        load_token_balance(contract, erc20, token_a, owner),
        load_token_balance(contract, erc20, token_b, owner),
    )
}

async fn load_token_balance(
    contract: &SimpleDexContract,
    erc20: &Arc<InterfaceDescriptor>,
    token: Address,
    owner: Address,
) -> Result<TokenBalance, ProviderError> {
    let handle = Erc20Token::bind(token, erc20, contract.caller().clone())?;
    let (amount, symbol, decimals) =
        tokio::try_join!(handle.balance_of(owner), handle.symbol(), handle.decimals())?;
    Ok(TokenBalance {
        token,
        symbol,
        decimals,
        amount,
    })
}

async fn token_handles(
    contract: &SimpleDexContract,
    erc20: &Arc<InterfaceDescriptor>,
) -> Result<(Erc20Token, Erc20Token), ProviderError> {
    let (token_a, token_b) = tokio::try_join!(contract.token_a(), contract.token_b())?;
    let caller = contract.caller().clone();
    Ok((
        Erc20Token::bind(token_a, erc20, caller.clone())?,
        Erc20Token::bind(token_b, erc20, caller)?,
    ))
}

async fn approve(
    token: &Erc20Token,
    spender: Address,
    amount: &FixedAmount,
) -> Result<(), SessionError> {
    let pending = token.approve(spender, amount.base_units()).await?;
    debug!("approval {} sent for {}", pending.hash(), token.address());
    pending.wait().await?;
    Ok(())
}

async fn execute_swap(
    contract: &SimpleDexContract,
    signer: &SigningHandle,
    erc20: &Arc<InterfaceDescriptor>,
    direction: SwapDirection,
    amount: &FixedAmount,
) -> Result<TxReceipt, SessionError> {
    let (token_a, token_b) = token_handles(contract, erc20).await?;
    let source = match direction.source() {
        TokenSide::A => token_a,
        TokenSide::B => token_b,
    };

    let balance = source.balance_of(signer.account()).await?;
    if amount.base_units() > balance {
        return Err(SessionError::InsufficientBalance(direction.source()));
    }

    approve(&source, contract.address(), amount).await?;
    let pending = match direction {
        SwapDirection::AforB => contract.swap_a_for_b(amount.base_units()).await?,
        SwapDirection::BforA => contract.swap_b_for_a(amount.base_units()).await?,
    };
    debug!("swap {} sent", pending.hash());
    Ok(pending.wait().await?)
}

async fn execute_liquidity(
    contract: &SimpleDexContract,
    signer: &SigningHandle,
    erc20: &Arc<InterfaceDescriptor>,
    op: LiquidityOp,
    amount_a: &FixedAmount,
    amount_b: &FixedAmount,
) -> Result<TxReceipt, SessionError> {
    let (token_a, token_b) = token_handles(contract, erc20).await?;
    approve(&token_a, contract.address(), amount_a).await?;
    approve(&token_b, contract.address(), amount_b).await?;

    let pending = match op {
        LiquidityOp::Add => {
            contract
                .add_liquidity(amount_a.base_units(), amount_b.base_units())
                .await?
        }
        LiquidityOp::Remove => {
            contract
                .remove_liquidity(amount_a.base_units(), amount_b.base_units())
                .await?
        }
    };
    debug!("{} {} sent from {}", op.kind().as_str(), pending.hash(), signer.account());
    Ok(pending.wait().await?)
}
