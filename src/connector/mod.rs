//! Wallet connector seam.
//!
//! A connector is whatever holds the user's key and prompts them: a desktop
//! wallet bridge speaking EIP-1193 over HTTP, or a local key loaded from the
//! environment. Flows only see the [`WalletConnector`] trait.

mod eip1193;
mod local;

pub use eip1193::Eip1193Connector;
pub use local::LocalKeyConnector;

use crate::config::{ChainParams, Config};
use crate::error::{ConnectorError, FlowError};
use crate::gateway::ChainGateway;
use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use std::sync::Arc;
use tracing::info;

/// Something that can sign and submit a native transfer.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn address(&self) -> Address;

    async fn send_transaction(&self, to: Address, value: U256) -> Result<TxHash, FlowError>;
}

#[async_trait]
pub trait WalletConnector: Send + Sync {
    async fn get_active_chain_id(&self) -> Result<u64, ConnectorError>;

    async fn request_switch_chain(&self, chain_id: u64) -> Result<(), ConnectorError>;

    /// Make the wallet aware of a chain it does not know yet.
    async fn register_chain(&self, params: &ChainParams) -> Result<(), ConnectorError>;

    /// Ask the user to expose an account; returns the active one.
    async fn request_accounts(&self) -> Result<Address, ConnectorError>;

    async fn get_signer(&self) -> Result<Arc<dyn TransactionSigner>, ConnectorError>;
}

/// Pick the connector the config asks for: a local key when
/// `MONVIEW_PRIVATE_KEY` is set, the wallet bridge otherwise.
pub fn from_config(
    config: &Config,
    gateway: Arc<dyn ChainGateway>,
) -> Result<Arc<dyn WalletConnector>, FlowError> {
    match &config.private_key {
        Some(key) => {
            let connector = LocalKeyConnector::from_private_key(key, config.chain.chain_id, gateway)?;
            info!("Using local key connector for {:?}", connector.address());
            Ok(Arc::new(connector))
        }
        None => {
            let connector = Eip1193Connector::new(
                &config.wallet_rpc_url,
                config.request_timeout,
                config.prompt_timeout,
            )?;
            info!("Using wallet bridge at {}", config.wallet_rpc_url);
            Ok(Arc::new(connector))
        }
    }
}
