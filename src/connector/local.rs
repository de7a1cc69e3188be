//! Connector backed by a private key held in process memory.
//!
//! Behaves like a wallet that only knows the chains it was told about:
//! switching to anything else fails with `ChainNotAdded` until the chain is
//! registered. Transfers are signed locally and broadcast through the chain
//! gateway.

use super::{TransactionSigner, WalletConnector};
use crate::config::ChainParams;
use crate::error::{ConnectorError, FlowError};
use crate::gateway::ChainGateway;
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Gas for a plain native transfer.
const TRANSFER_GAS: u64 = 21_000;

#[derive(Default)]
struct ChainRegistry {
    active: u64,
    known: BTreeSet<u64>,
}

pub struct LocalKeyConnector {
    wallet: LocalWallet,
    gateway: Arc<dyn ChainGateway>,
    chains: StdMutex<ChainRegistry>,
    next_nonce: Arc<Mutex<Option<u64>>>,
}

impl LocalKeyConnector {
    pub fn new(wallet: LocalWallet, chain_id: u64, gateway: Arc<dyn ChainGateway>) -> Self {
        let mut known = BTreeSet::new();
        known.insert(chain_id);
        Self {
            wallet,
            gateway,
            chains: StdMutex::new(ChainRegistry { active: chain_id, known }),
            next_nonce: Arc::new(Mutex::new(None)),
        }
    }

    pub fn from_private_key(
        key: &str,
        chain_id: u64,
        gateway: Arc<dyn ChainGateway>,
    ) -> Result<Self, FlowError> {
        let wallet: LocalWallet = key
            .trim()
            .parse()
            .map_err(|e| FlowError::Connector(format!("invalid private key: {}", e)))?;
        Ok(Self::new(wallet, chain_id, gateway))
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, ChainRegistry> {
        // A poisoned registry still holds consistent chain ids.
        self.chains.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WalletConnector for LocalKeyConnector {
    async fn get_active_chain_id(&self) -> Result<u64, ConnectorError> {
        Ok(self.registry().active)
    }

    async fn request_switch_chain(&self, chain_id: u64) -> Result<(), ConnectorError> {
        let mut registry = self.registry();
        if !registry.known.contains(&chain_id) {
            return Err(ConnectorError::ChainNotAdded(chain_id));
        }
        if registry.active != chain_id {
            info!("Local wallet switching from chain {} to {}", registry.active, chain_id);
            registry.active = chain_id;
        }
        Ok(())
    }

    async fn register_chain(&self, params: &ChainParams) -> Result<(), ConnectorError> {
        if self.registry().known.insert(params.chain_id) {
            info!("Local wallet registered {} ({})", params.label, params.chain_id);
        }
        Ok(())
    }

    async fn request_accounts(&self) -> Result<Address, ConnectorError> {
        Ok(self.wallet.address())
    }

    async fn get_signer(&self) -> Result<Arc<dyn TransactionSigner>, ConnectorError> {
        let chain_id = self.registry().active;
        Ok(Arc::new(LocalSigner {
            wallet: self.wallet.clone().with_chain_id(chain_id),
            gateway: self.gateway.clone(),
            chain_id,
            next_nonce: self.next_nonce.clone(),
        }))
    }
}

struct LocalSigner {
    wallet: LocalWallet,
    gateway: Arc<dyn ChainGateway>,
    chain_id: u64,
    next_nonce: Arc<Mutex<Option<u64>>>,
}

impl LocalSigner {
    /// Next nonce: the larger of the cached and on-chain values, so queued
    /// sends that are not mined yet are not reused.
    async fn reserve_nonce(&self) -> Result<u64, FlowError> {
        let mut guard = self.next_nonce.lock().await;
        let on_chain = self.gateway.get_transaction_count(self.wallet.address()).await?;
        let nonce = match *guard {
            Some(cached) => cached.max(on_chain),
            None => on_chain,
        };
        *guard = Some(nonce + 1);
        Ok(nonce)
    }

    async fn forget_nonce(&self) {
        *self.next_nonce.lock().await = None;
    }
}

#[async_trait]
impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    async fn send_transaction(&self, to: Address, value: U256) -> Result<TxHash, FlowError> {
        let gas_price = self.gateway.get_gas_price().await?;
        let nonce = self.reserve_nonce().await?;

        let tx: TypedTransaction = TransactionRequest::new()
            .from(self.wallet.address())
            .to(to)
            .value(value)
            .gas(TRANSFER_GAS)
            .gas_price(gas_price)
            .nonce(nonce)
            .chain_id(self.chain_id)
            .into();

        let signature = self
            .wallet
            .sign_transaction(&tx)
            .await
            .map_err(|e| FlowError::Connector(format!("signing failed: {}", e)))?;

        match self.gateway.send_transaction(tx.rlp_signed(&signature)).await {
            Ok(hash) => Ok(hash),
            Err(e) => {
                warn!("Broadcast with nonce {} failed, refreshing nonce: {}", nonce, e);
                self.forget_nonce().await;
                Err(e)
            }
        }
    }
}
