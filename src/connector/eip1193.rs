//! Connector for wallets exposing the EIP-1193 method set over JSON-RPC
//! (desktop wallet bridges, browser-extension relays).

use super::{TransactionSigner, WalletConnector};
use crate::config::ChainParams;
use crate::error::{ConnectorError, FlowError};
use crate::gateway::connect_http;
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::{Http, Provider, RpcError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// EIP-1193 "User Rejected Request"
const CODE_USER_REJECTED: i64 = 4001;
/// EIP-3326 "Unrecognized chain ID"
const CODE_UNRECOGNIZED_CHAIN: i64 = 4902;

#[derive(Clone)]
struct WalletRpc {
    provider: Arc<Provider<Http>>,
}

impl WalletRpc {
    async fn call<P, R>(&self, method: &str, params: P, limit: Duration) -> Result<R, ConnectorError>
    where
        P: Debug + Serialize + Send + Sync,
        R: Debug + Serialize + DeserializeOwned + Send,
    {
        debug!("wallet request {}", method);
        match timeout(limit, self.provider.request::<P, R>(method, params)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(map_provider_error(&e)),
            Err(_) => Err(ConnectorError::timeout(method, limit)),
        }
    }
}

/// Translate a provider failure into the connector taxonomy.
fn map_provider_error(err: &ProviderError) -> ConnectorError {
    match RpcError::as_error_response(err) {
        Some(resp) if resp.code == CODE_USER_REJECTED => ConnectorError::UserRejected,
        Some(resp) => ConnectorError::Rpc {
            code: resp.code,
            message: resp.message.clone(),
        },
        None => ConnectorError::Unavailable(err.to_string()),
    }
}

/// Connector backed by an EIP-1193 wallet endpoint.
#[derive(Clone)]
pub struct Eip1193Connector {
    rpc: WalletRpc,
    request_timeout: Duration,
    prompt_timeout: Duration,
}

impl Eip1193Connector {
    pub fn new(
        wallet_rpc_url: &str,
        request_timeout: Duration,
        prompt_timeout: Duration,
    ) -> Result<Self, FlowError> {
        let provider = connect_http(wallet_rpc_url)
            .map_err(|e| FlowError::Connector(e.to_string()))?;
        Ok(Self {
            rpc: WalletRpc { provider },
            request_timeout,
            prompt_timeout,
        })
    }

    async fn first_account(&self, method: &str, limit: Duration) -> Result<Address, ConnectorError> {
        let accounts: Vec<Address> = self.rpc.call(method, (), limit).await?;
        accounts
            .into_iter()
            .next()
            .ok_or_else(|| ConnectorError::Unavailable("wallet returned no accounts".to_string()))
    }
}

#[async_trait]
impl WalletConnector for Eip1193Connector {
    async fn get_active_chain_id(&self) -> Result<u64, ConnectorError> {
        let chain_id: U64 = self.rpc.call("eth_chainId", (), self.request_timeout).await?;
        Ok(chain_id.as_u64())
    }

    async fn request_switch_chain(&self, chain_id: u64) -> Result<(), ConnectorError> {
        let params = [json!({ "chainId": format!("{:#x}", chain_id) })];
        match self
            .rpc
            .call::<_, Value>("wallet_switchEthereumChain", params, self.prompt_timeout)
            .await
        {
            Ok(_) => Ok(()),
            Err(ConnectorError::Rpc { code, .. }) if code == CODE_UNRECOGNIZED_CHAIN => {
                Err(ConnectorError::ChainNotAdded(chain_id))
            }
            Err(e) => Err(e),
        }
    }

    async fn register_chain(&self, params: &ChainParams) -> Result<(), ConnectorError> {
        info!("Asking wallet to add {} ({})", params.label, params.chain_id);
        self.rpc
            .call::<_, Value>("wallet_addEthereumChain", [params.add_chain_params()], self.prompt_timeout)
            .await
            .map(|_| ())
    }

    async fn request_accounts(&self) -> Result<Address, ConnectorError> {
        self.first_account("eth_requestAccounts", self.prompt_timeout).await
    }

    async fn get_signer(&self) -> Result<Arc<dyn TransactionSigner>, ConnectorError> {
        let address = self.first_account("eth_accounts", self.request_timeout).await?;
        Ok(Arc::new(Eip1193Signer {
            rpc: self.rpc.clone(),
            address,
            prompt_timeout: self.prompt_timeout,
        }))
    }
}

/// Signer that delegates signing and broadcast to the wallet.
struct Eip1193Signer {
    rpc: WalletRpc,
    address: Address,
    prompt_timeout: Duration,
}

#[async_trait]
impl TransactionSigner for Eip1193Signer {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, to: Address, value: U256) -> Result<TxHash, FlowError> {
        let tx = TransactionRequest::new().from(self.address).to(to).value(value);
        self.rpc
            .call::<_, TxHash>("eth_sendTransaction", [tx], self.prompt_timeout)
            .await
            .map_err(|e| FlowError::from_connector("transfer", e))
    }
}
