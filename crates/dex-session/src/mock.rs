//! In-memory chain and display used by the controller tests.
//!
//! `MockChain` plays the wallet, the SimpleDEX contract and both ERC-20
//! tokens, and logs every request so tests can assert on call ordering.

use alloy_primitives::{Address, B256, Bytes, U256, address};
use async_trait::async_trait;
use alloy_sol_types::SolCall;
use dex_chain_client::{IERC20, ISimpleDex, ProviderError, TxReceipt, WalletProvider};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::display::{DisplaySink, InputField, Notice, Region, TransactionDetail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    RequestAccounts,
    ChainId,
    GetBalance,
    Read(&'static str),
    Send(&'static str),
    Receipt,
}

struct ChainState {
    accounts: Vec<Address>,
    chain_id: Option<u64>,
    native_balance: U256,
    reserve_a: U256,
    reserve_b: U256,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    fail_reads: bool,
    reject_sends: bool,
    revert_next: Option<&'static str>,
    block: u64,
    nonce: u64,
    receipts: HashMap<B256, TxReceipt>,
    calls: Vec<Call>,
}

pub(crate) struct MockChain {
    state: Mutex<ChainState>,
    selectors: HashMap<[u8; 4], &'static str>,
    receipt_gate: Mutex<Option<Arc<Notify>>>,
    accounts_gate: Mutex<Option<Arc<Notify>>>,
}

pub(crate) fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

const SELECTORS: &[([u8; 4], &str)] = &[
    (ISimpleDex::tokenACall::SELECTOR, "tokenA"),
    (ISimpleDex::tokenBCall::SELECTOR, "tokenB"),
    (ISimpleDex::reserveACall::SELECTOR, "reserveA"),
    (ISimpleDex::reserveBCall::SELECTOR, "reserveB"),
    (ISimpleDex::getPriceCall::SELECTOR, "getPrice"),
    (ISimpleDex::swapAforBCall::SELECTOR, "swapAforB"),
    (ISimpleDex::swapBforACall::SELECTOR, "swapBforA"),
    (ISimpleDex::addLiquidityCall::SELECTOR, "addLiquidity"),
    (ISimpleDex::removeLiquidityCall::SELECTOR, "removeLiquidity"),
    (IERC20::balanceOfCall::SELECTOR, "balanceOf"),
    (IERC20::approveCall::SELECTOR, "approve"),
    (IERC20::symbolCall::SELECTOR, "symbol"),
    (IERC20::decimalsCall::SELECTOR, "decimals"),
];

fn reverted() -> ProviderError {
    ProviderError::Rpc {
        code: 3,
        message: "execution reverted".to_owned(),
    }
}

impl MockChain {
    pub(crate) const DEX: Address = address!("00000000000000000000000000000000000d0d0d");
    pub(crate) const TOKEN_A: Address = address!("000000000000000000000000000000000000aaaa");
    pub(crate) const TOKEN_B: Address = address!("000000000000000000000000000000000000bbbb");
    pub(crate) const USER: Address = address!("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");

    /// Sepolia, 2 ETH, 100 of each token, reserves 1000 A / 500 B.
    pub(crate) fn seeded() -> Arc<Self> {
        let mut balances = HashMap::new();
        balances.insert((Self::TOKEN_A, Self::USER), ether(100));
        balances.insert((Self::TOKEN_B, Self::USER), ether(100));

        Arc::new(Self {
            state: Mutex::new(ChainState {
                accounts: vec![Self::USER],
                chain_id: Some(11155111),
                native_balance: ether(2),
                reserve_a: ether(1000),
                reserve_b: ether(500),
                balances,
                allowances: HashMap::new(),
                fail_reads: false,
                reject_sends: false,
                revert_next: None,
                block: 100,
                nonce: 0,
                receipts: HashMap::new(),
                calls: Vec::new(),
            }),
            selectors: SELECTORS.iter().copied().collect(),
            receipt_gate: Mutex::new(None),
            accounts_gate: Mutex::new(None),
        })
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ChainState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.with_state(|state| state.calls.clone())
    }

    pub(crate) fn reset_calls(&self) {
        self.with_state(|state| state.calls.clear());
    }

    pub(crate) fn sends(&self) -> Vec<&'static str> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn set_accounts(&self, accounts: Vec<Address>) {
        self.with_state(|state| state.accounts = accounts);
    }

    pub(crate) fn set_chain_id(&self, chain_id: Option<u64>) {
        self.with_state(|state| state.chain_id = chain_id);
    }

    pub(crate) fn set_reserves(&self, reserve_a: U256, reserve_b: U256) {
        self.with_state(|state| {
            state.reserve_a = reserve_a;
            state.reserve_b = reserve_b;
        });
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.with_state(|state| state.fail_reads = fail);
    }

    pub(crate) fn reject_sends(&self, reject: bool) {
        self.with_state(|state| state.reject_sends = reject);
    }

    pub(crate) fn revert_next(&self, function: &'static str) {
        self.with_state(|state| state.revert_next = Some(function));
    }

    pub(crate) fn token_balance(&self, token: Address, owner: Address) -> U256 {
        self.with_state(|state| state.balances.get(&(token, owner)).copied().unwrap_or_default())
    }

    /// The next receipt wait blocks until the returned notify fires.
    pub(crate) fn gate_next_receipt(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.receipt_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// The next account request blocks until the returned notify fires.
    pub(crate) fn gate_next_accounts(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.accounts_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    fn function_name(&self, data: &[u8]) -> Result<&'static str, ProviderError> {
        let mut selector = [0_u8; 4];
        if data.len() < 4 {
            return Err(reverted());
        }
        selector.copy_from_slice(&data[..4]);
        self.selectors.get(&selector).copied().ok_or_else(reverted)
    }

    fn read(&self, to: Address, name: &str, data: &[u8]) -> Result<Bytes, ProviderError> {
        self.with_state(|state| {
            let encoded = match (to == Self::DEX, name) {
                (true, "tokenA") => ISimpleDex::tokenACall::abi_encode_returns(&(Self::TOKEN_A,)),
                (true, "tokenB") => ISimpleDex::tokenBCall::abi_encode_returns(&(Self::TOKEN_B,)),
                (true, "reserveA") => ISimpleDex::reserveACall::abi_encode_returns(&(state.reserve_a,)),
                (true, "reserveB") => ISimpleDex::reserveBCall::abi_encode_returns(&(state.reserve_b,)),
                (true, "getPrice") => {
                    let token = ISimpleDex::getPriceCall::abi_decode(data, true)
                        .map_err(|_| reverted())?
                        ._token;
                    let (numerator, denominator) = if token == Self::TOKEN_A {
                        (state.reserve_b, state.reserve_a)
                    } else if token == Self::TOKEN_B {
                        (state.reserve_a, state.reserve_b)
                    } else {
                        return Err(reverted());
                    };
                    if denominator.is_zero() {
                        return Err(reverted());
                    }
                    ISimpleDex::getPriceCall::abi_encode_returns(&(numerator * ether(1) / denominator,))
                }
                (false, "balanceOf") => {
                    let owner = IERC20::balanceOfCall::abi_decode(data, true)
                        .map_err(|_| reverted())?
                        .owner;
                    let balance = state.balances.get(&(to, owner)).copied().unwrap_or_default();
                    IERC20::balanceOfCall::abi_encode_returns(&(balance,))
                }
                (false, "symbol") if to == Self::TOKEN_A => {
                    IERC20::symbolCall::abi_encode_returns(&("TKA".to_owned(),))
                }
                (false, "symbol") if to == Self::TOKEN_B => {
                    IERC20::symbolCall::abi_encode_returns(&("TKB".to_owned(),))
                }
                (false, "decimals") => IERC20::decimalsCall::abi_encode_returns(&(18u8,)),
                _ => return Err(reverted()),
            };
            Ok(encoded.into())
        })
    }

    /// Applies a transaction and returns whether it succeeded.
    fn execute(state: &mut ChainState, from: Address, to: Address, name: &str, data: &[u8]) -> bool {
        fn debit(state: &mut ChainState, token: Address, owner: Address, spender: Address, amount: U256) -> bool {
            let allowance = state.allowances.get(&(token, owner, spender)).copied().unwrap_or_default();
            let balance = state.balances.get(&(token, owner)).copied().unwrap_or_default();
            if allowance < amount || balance < amount {
                return false;
            }
            state.allowances.insert((token, owner, spender), allowance - amount);
            state.balances.insert((token, owner), balance - amount);
            true
        }

        fn credit(state: &mut ChainState, token: Address, owner: Address, amount: U256) {
            let balance = state.balances.entry((token, owner)).or_default();
            *balance += amount;
        }

        if name == "approve" {
            let Ok(call) = IERC20::approveCall::abi_decode(data, true) else {
                return false;
            };
            state.allowances.insert((to, from, call.spender), call.amount);
            return true;
        }
        if to != Self::DEX {
            return false;
        }

        match name {
            "swapAforB" => {
                let Ok(call) = ISimpleDex::swapAforBCall::abi_decode(data, true) else {
                    return false;
                };
                let amount_in = call.amountAIn;
                let amount_out = amount_in * state.reserve_b / (state.reserve_a + amount_in);
                if !debit(state, Self::TOKEN_A, from, Self::DEX, amount_in) {
                    return false;
                }
                credit(state, Self::TOKEN_B, from, amount_out);
                state.reserve_a += amount_in;
                state.reserve_b -= amount_out;
                true
            }
            "swapBforA" => {
                let Ok(call) = ISimpleDex::swapBforACall::abi_decode(data, true) else {
                    return false;
                };
                let amount_in = call.amountBIn;
                let amount_out = amount_in * state.reserve_a / (state.reserve_b + amount_in);
                if !debit(state, Self::TOKEN_B, from, Self::DEX, amount_in) {
                    return false;
                }
                credit(state, Self::TOKEN_A, from, amount_out);
                state.reserve_b += amount_in;
                state.reserve_a -= amount_out;
                true
            }
            "addLiquidity" => {
                let Ok(call) = ISimpleDex::addLiquidityCall::abi_decode(data, true) else {
                    return false;
                };
                let (amount_a, amount_b) = (call.amountA, call.amountB);
                if !debit(state, Self::TOKEN_A, from, Self::DEX, amount_a)
                    || !debit(state, Self::TOKEN_B, from, Self::DEX, amount_b)
                {
                    return false;
                }
                state.reserve_a += amount_a;
                state.reserve_b += amount_b;
                true
            }
            "removeLiquidity" => {
                let Ok(call) = ISimpleDex::removeLiquidityCall::abi_decode(data, true) else {
                    return false;
                };
                let (amount_a, amount_b) = (call.amountA, call.amountB);
                if amount_a > state.reserve_a || amount_b > state.reserve_b {
                    return false;
                }
                state.reserve_a -= amount_a;
                state.reserve_b -= amount_b;
                credit(state, Self::TOKEN_A, from, amount_a);
                credit(state, Self::TOKEN_B, from, amount_b);
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl WalletProvider for MockChain {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let gate = self.accounts_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.with_state(|state| {
            state.calls.push(Call::RequestAccounts);
            Ok(state.accounts.clone())
        })
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        self.with_state(|state| {
            state.calls.push(Call::ChainId);
            state
                .chain_id
                .ok_or_else(|| ProviderError::Transport("chain id unavailable".to_owned()))
        })
    }

    async fn get_balance(&self, _account: Address) -> Result<U256, ProviderError> {
        self.with_state(|state| {
            state.calls.push(Call::GetBalance);
            if state.fail_reads {
                return Err(ProviderError::Transport("connection reset".to_owned()));
            }
            Ok(state.native_balance)
        })
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        let name = self.function_name(&data)?;
        let fail = self.with_state(|state| {
            state.calls.push(Call::Read(name));
            state.fail_reads
        });
        if fail {
            return Err(ProviderError::Transport("connection reset".to_owned()));
        }
        self.read(to, name, &data)
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<B256, ProviderError> {
        let name = self.function_name(&data)?;
        self.with_state(|state| {
            state.calls.push(Call::Send(name));
            if state.reject_sends {
                return Err(ProviderError::UserRejected);
            }

            let forced_revert = state.revert_next == Some(name);
            if forced_revert {
                state.revert_next = None;
            }
            let status = !forced_revert && Self::execute(state, from, to, name, &data);

            state.nonce += 1;
            state.block += 1;
            let mut bytes = [0_u8; 32];
            bytes[24..].copy_from_slice(&state.nonce.to_be_bytes());
            let tx_hash = B256::from(bytes);
            state.receipts.insert(
                tx_hash,
                TxReceipt {
                    tx_hash,
                    block_number: state.block,
                    status,
                },
            );
            Ok(tx_hash)
        })
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, ProviderError> {
        let gate = self.receipt_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.with_state(|state| {
            state.calls.push(Call::Receipt);
            state
                .receipts
                .get(&tx_hash)
                .cloned()
                .ok_or_else(|| ProviderError::Decode(format!("unknown transaction {tx_hash}")))
        })
    }
}

#[derive(Debug, Default)]
struct SinkLog {
    regions: HashMap<Region, String>,
    field_errors: HashMap<InputField, String>,
    cleared: Vec<InputField>,
    notices: Vec<Notice>,
    dismissals: usize,
    transactions: Vec<TransactionDetail>,
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    log: Mutex<SinkLog>,
}

impl RecordingSink {
    pub(crate) fn region(&self, region: Region) -> Option<String> {
        self.log.lock().unwrap().regions.get(&region).cloned()
    }

    pub(crate) fn field_error(&self, field: InputField) -> Option<String> {
        self.log.lock().unwrap().field_errors.get(&field).cloned()
    }

    pub(crate) fn cleared(&self) -> Vec<InputField> {
        self.log.lock().unwrap().cleared.clone()
    }

    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.log.lock().unwrap().notices.clone()
    }

    pub(crate) fn last_notice(&self) -> Option<Notice> {
        self.log.lock().unwrap().notices.last().cloned()
    }

    pub(crate) fn dismissals(&self) -> usize {
        self.log.lock().unwrap().dismissals
    }

    pub(crate) fn transactions(&self) -> Vec<TransactionDetail> {
        self.log.lock().unwrap().transactions.clone()
    }
}

impl DisplaySink for RecordingSink {
    fn set_region(&self, region: Region, text: &str) {
        self.log.lock().unwrap().regions.insert(region, text.to_owned());
    }

    fn set_field_error(&self, field: InputField, message: Option<&str>) {
        let mut log = self.log.lock().unwrap();
        match message {
            Some(message) => {
                log.field_errors.insert(field, message.to_owned());
            }
            None => {
                log.field_errors.remove(&field);
            }
        }
    }

    fn clear_input(&self, field: InputField) {
        self.log.lock().unwrap().cleared.push(field);
    }

    fn show_notice(&self, notice: Notice) {
        self.log.lock().unwrap().notices.push(notice);
    }

    fn dismiss_notice(&self) {
        self.log.lock().unwrap().dismissals += 1;
    }

    fn show_transaction(&self, detail: &TransactionDetail) {
        self.log.lock().unwrap().transactions.push(detail.clone());
    }
}
