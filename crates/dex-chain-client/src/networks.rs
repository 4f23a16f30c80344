use dex_api_types::NetworkInfo;
use std::collections::HashMap;

const KNOWN_NETWORKS: &[(u64, &str)] = &[
    (1, "Ethereum Mainnet"),
    (3, "Ropsten"),
    (4, "Rinkeby"),
    (42, "Kovan"),
    (56, "Binance Smart Chain"),
    (97, "Binance Smart Chain Testnet"),
    (137, "Polygon Mainnet"),
    (80001, "Mumbai"),
    (42161, "Arbitrum One"),
    (421611, "Arbitrum Goerli"),
    (10, "Optimism"),
    (420, "Optimism Goerli"),
    (42170, "Avalanche"),
    (43113, "Avalanche Fuji"),
    (43114, "Avalanche Mainnet"),
    (11155111, "Sepolia"),
    (534351, "Scroll Sepolia"),
];

/// Chain id to display name lookup. Seeded with the well-known networks.
pub struct NetworkRegistry {
    names: HashMap<u64, String>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self {
            names: KNOWN_NETWORKS
                .iter()
                .map(|(id, name)| (*id, (*name).to_owned()))
                .collect(),
        }
    }
}

impl NetworkRegistry {
    pub fn register(&mut self, chain_id: u64, name: impl Into<String>) {
        self.names.insert(chain_id, name.into());
    }

    pub fn resolve(&self, chain_id: u64) -> NetworkInfo {
        let name = self
            .names
            .get(&chain_id)
            .cloned()
            .unwrap_or_else(|| format!("Network {chain_id}"));
        NetworkInfo { chain_id, name }
    }
}
