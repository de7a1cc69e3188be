use serde_json::json;
use std::env;
use std::time::Duration;

/// Fixed parameter set describing an EVM network, as a wallet needs it to
/// register and switch to the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainParams {
    pub label: &'static str,
    pub chain_id: u64,
    pub native_token: &'static str,
    pub decimals: u8,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
}

impl ChainParams {
    pub const fn new(
        label: &'static str,
        chain_id: u64,
        native_token: &'static str,
        decimals: u8,
        rpc_url: &'static str,
        explorer_url: &'static str,
    ) -> Self {
        Self {
            label,
            chain_id,
            native_token,
            decimals,
            rpc_url,
            explorer_url,
        }
    }

    /// Chain id as the `0x`-prefixed hex quantity wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Full URL to view a transaction on the block explorer
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }

    /// Full URL to view an address on the block explorer
    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }

    /// EIP-3085 `wallet_addEthereumChain` parameter object.
    pub fn add_chain_params(&self) -> serde_json::Value {
        json!({
            "chainId": self.chain_id_hex(),
            "chainName": self.label,
            "rpcUrls": [self.rpc_url],
            "nativeCurrency": {
                "name": self.native_token,
                "symbol": self.native_token,
                "decimals": self.decimals,
            },
            "blockExplorerUrls": [self.explorer_url],
        })
    }
}

/// The chain every signing action is pinned to.
pub const MONAD_TESTNET: ChainParams = ChainParams::new(
    "Monad Testnet",
    10143,
    "MON",
    18,
    "https://testnet-rpc.monad.xyz",
    "https://testnet.monadexplorer.com",
);

/// Networks a wallet commonly reports while the user is elsewhere.
/// Only used to put a name on the active chain in messages.
pub const KNOWN_NETWORKS: &[ChainParams] = &[
    MONAD_TESTNET,
    ChainParams::new("Ethereum", 1, "ETH", 18, "https://ethereum-rpc.publicnode.com", "https://etherscan.io"),
    ChainParams::new("Sepolia", 11155111, "ETH", 18, "https://ethereum-sepolia-rpc.publicnode.com", "https://sepolia.etherscan.io"),
    ChainParams::new("Base", 8453, "ETH", 18, "https://mainnet.base.org", "https://basescan.org"),
    ChainParams::new("Polygon", 137, "POL", 18, "https://polygon-rpc.com", "https://polygonscan.com"),
];

/// Find a network by chain ID
pub fn find_network_by_chain_id(chain_id: u64) -> Option<&'static ChainParams> {
    KNOWN_NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Human label for a chain id, falling back to the bare number.
pub fn chain_label(chain_id: u64) -> String {
    find_network_by_chain_id(chain_id)
        .map(|n| n.label.to_string())
        .unwrap_or_else(|| format!("chain {}", chain_id))
}

/// Default desktop wallet bridge (EIP-1193 over HTTP).
pub const DEFAULT_WALLET_RPC_URL: &str = "http://127.0.0.1:1248";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
const DEFAULT_PROMPT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_RETRY_DELAY_MS: u64 = 500;
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 90;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Clone)]
pub struct Config {
    pub rpc_url: String,
    pub wallet_rpc_url: String,
    pub private_key: Option<String>,
    pub chain: ChainParams,
    pub request_timeout: Duration,
    pub prompt_timeout: Duration, // Calls that wait on the user approving in the wallet
    pub read_retries: u32,     // Extra attempts for gateway reads, never for sends
    pub retry_delay_ms: u64,   // First backoff delay, doubled per attempt
    pub wait_for_receipt: bool,
    pub confirmation_timeout_secs: u64,
}

impl Config {
    pub fn new(chain: ChainParams) -> Self {
        Self {
            rpc_url: chain.rpc_url.to_string(),
            wallet_rpc_url: DEFAULT_WALLET_RPC_URL.to_string(),
            private_key: None,
            chain,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            prompt_timeout: Duration::from_secs(DEFAULT_PROMPT_TIMEOUT_SECS),
            read_retries: 0,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            wait_for_receipt: true,
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        }
    }

    /// Build the config from `MONVIEW_*` environment variables on top of the
    /// Monad testnet defaults. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Self {
        let mut config = Self::new(MONAD_TESTNET);

        if let Ok(url) = env::var("MONVIEW_RPC_URL") {
            if !url.trim().is_empty() {
                config.rpc_url = url.trim().to_string();
            }
        }
        if let Ok(url) = env::var("MONVIEW_WALLET_RPC_URL") {
            if !url.trim().is_empty() {
                config.wallet_rpc_url = url.trim().to_string();
            }
        }
        config.private_key = env::var("MONVIEW_PRIVATE_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        config.request_timeout = Duration::from_secs(
            env_or("MONVIEW_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS).max(1),
        );
        config.prompt_timeout = Duration::from_secs(
            env_or("MONVIEW_PROMPT_TIMEOUT_SECS", DEFAULT_PROMPT_TIMEOUT_SECS).max(1),
        );
        config.read_retries = env_or("MONVIEW_READ_RETRIES", 0);
        config.retry_delay_ms = env_or("MONVIEW_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS);
        config.wait_for_receipt = env_or("MONVIEW_WAIT_FOR_RECEIPT", true);
        config.confirmation_timeout_secs =
            env_or("MONVIEW_CONFIRMATION_TIMEOUT_SECS", DEFAULT_CONFIRMATION_TIMEOUT_SECS);

        config
    }

    pub fn native_token(&self) -> &str {
        self.chain.native_token
    }

    pub fn network_label(&self) -> &str {
        self.chain.label
    }

    /// Whether signing goes through a local key instead of the wallet bridge.
    pub fn uses_local_key(&self) -> bool {
        self.private_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(MONAD_TESTNET)
    }
}
