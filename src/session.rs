use crate::config::ChainParams;
use crate::connector::WalletConnector;
use crate::error::FlowError;
use crate::network::ensure_network;
use ethers::types::Address;
use std::sync::Arc;
use tracing::info;

/// Connected-wallet state: the connector, the chain signing is pinned to,
/// and the account the user exposed, if any.
#[derive(Clone)]
pub struct WalletSession {
    connector: Arc<dyn WalletConnector>,
    chain: ChainParams,
    account: Option<Address>,
}

impl WalletSession {
    pub fn new(connector: Arc<dyn WalletConnector>, chain: ChainParams) -> Self {
        Self {
            connector,
            chain,
            account: None,
        }
    }

    /// Wallet connection handshake. Assures the network first, then asks for
    /// an account. On failure the previous account, if any, is kept.
    pub async fn connect(&mut self) -> Result<Address, FlowError> {
        ensure_network(self.connector.as_ref(), &self.chain).await?;

        let account = self
            .connector
            .request_accounts()
            .await
            .map_err(|e| FlowError::from_connector("wallet connection", e))?;

        info!("Wallet connected: {:?} on {}", account, self.chain.label);
        self.account = Some(account);
        Ok(account)
    }

    pub fn disconnect(&mut self) {
        if let Some(account) = self.account.take() {
            info!("Wallet disconnected: {:?}", account);
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn connector(&self) -> Arc<dyn WalletConnector> {
        self.connector.clone()
    }

    pub fn chain(&self) -> &ChainParams {
        &self.chain
    }
}
