use anyhow::Context;
use dex_chain_client::{InterfaceDescriptor, NetworkRegistry};
use dex_chain_rpc::{DEFAULT_RECEIPT_POLL, DEFAULT_RPC_URL};
use dex_session::{DexSettings, parse_token_address};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Optional JSON file named by `SIMPLE_DEX_CONFIG`. Environment variables
/// override every key.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    rpc_url: Option<String>,
    contract_address: Option<String>,
    abi_path: Option<PathBuf>,
    erc20_abi_path: Option<PathBuf>,
    receipt_poll_ms: Option<u64>,
    /// Extra chain id to display name mappings.
    networks: BTreeMap<u64, String>,
}

impl ConfigFile {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }
}

pub(crate) struct ConsoleConfig {
    pub(crate) rpc_url: String,
    pub(crate) receipt_poll: Duration,
    pub(crate) settings: DexSettings,
    pub(crate) networks: NetworkRegistry,
}

impl ConsoleConfig {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    fn resolve(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let file = match var("SIMPLE_DEX_CONFIG") {
            Some(path) => ConfigFile::load(Path::new(&path))?,
            None => ConfigFile::default(),
        };

        let rpc_url = var("SIMPLE_DEX_RPC_URL")
            .or(file.rpc_url)
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_owned());

        let contract = var("SIMPLE_DEX_CONTRACT_ADDRESS")
            .or(file.contract_address)
            .context("SIMPLE_DEX_CONTRACT_ADDRESS is not set")?;
        let contract_address = parse_token_address(&contract)
            .with_context(|| format!("invalid SimpleDEX contract address: {contract}"))?;

        let receipt_poll = match var("SIMPLE_DEX_RECEIPT_POLL_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse()
                    .with_context(|| format!("invalid SIMPLE_DEX_RECEIPT_POLL_MS: {raw}"))?,
            ),
            None => file
                .receipt_poll_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_RECEIPT_POLL),
        };

        let mut settings = DexSettings::new(contract_address);
        if let Some(path) = var("SIMPLE_DEX_ABI_PATH").map(PathBuf::from).or(file.abi_path) {
            settings.dex_interface = Arc::new(load_interface("SimpleDEX", &path)?);
        }
        if let Some(path) = var("SIMPLE_DEX_ERC20_ABI_PATH")
            .map(PathBuf::from)
            .or(file.erc20_abi_path)
        {
            settings.erc20_interface = Arc::new(load_interface("ERC20", &path)?);
        }

        let mut networks = NetworkRegistry::default();
        for (chain_id, name) in file.networks {
            networks.register(chain_id, name);
        }

        Ok(Self {
            rpc_url,
            receipt_poll,
            settings,
            networks,
        })
    }
}

fn load_interface(name: &str, path: &Path) -> anyhow::Result<InterfaceDescriptor> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ABI file: {}", path.display()))?;
    InterfaceDescriptor::from_json_abi(name, &json)
        .with_context(|| format!("failed to parse ABI file: {}", path.display()))
}
