//! Chain gateway: the single JSON-RPC endpoint every read and raw send goes
//! through. Reads may be retried with exponential backoff, sends never are.

use crate::config::Config;
use crate::error::FlowError;
use crate::utils;
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};
use url::Url;

/// Interval between receipt polls.
const RECEIPT_POLL_INTERVAL_MS: u64 = 500;

#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Address-validity predicate applied before any lookup or transfer.
    fn is_valid_address_format(&self, input: &str) -> bool {
        utils::is_valid_address_format(input)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, FlowError>;

    async fn get_transaction_count(&self, address: Address) -> Result<u64, FlowError>;

    /// Broadcast an already-signed transaction.
    async fn send_transaction(&self, signed: Bytes) -> Result<TxHash, FlowError>;

    async fn get_gas_price(&self) -> Result<U256, FlowError>;

    /// Block number of the receipt, `None` while still pending.
    async fn get_receipt_block(&self, tx_hash: TxHash) -> Result<Option<u64>, FlowError>;
}

/// Gateway over an HTTPS JSON-RPC provider.
#[derive(Clone)]
pub struct HttpGateway {
    provider: Arc<Provider<Http>>,
    request_timeout: Duration,
    read_retries: u32,
    retry_delay_ms: u64,
}

impl HttpGateway {
    pub fn new(config: &Config) -> Result<Self, FlowError> {
        let provider = connect_http(&config.rpc_url)?;
        info!("Chain gateway using {}", config.rpc_url);
        Ok(Self {
            provider,
            request_timeout: config.request_timeout,
            read_retries: config.read_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    pub fn provider(&self) -> Arc<Provider<Http>> {
        self.provider.clone()
    }

    /// One call under the per-call timeout, no retry.
    async fn attempt<T, Fut>(&self, operation: &str, call: Fut) -> Result<T, FlowError>
    where
        Fut: Future<Output = Result<T, ProviderError>> + Send,
    {
        match timeout(self.request_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(FlowError::gateway(e)),
            Err(_) => Err(FlowError::timeout(operation, self.request_timeout)),
        }
    }

    /// Run a read with the per-call timeout, retrying failures with a
    /// doubling delay up to `read_retries` extra attempts.
    async fn read<T, F, Fut>(&self, operation: &str, call: F) -> Result<T, FlowError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, ProviderError>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempt += 1;
            let err = match self.attempt(operation, call()).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt > self.read_retries {
                return Err(err);
            }

            warn!(
                "{} attempt {}/{} failed: {}. Retrying in {}ms",
                operation,
                attempt,
                self.read_retries + 1,
                err,
                delay
            );
            sleep(Duration::from_millis(delay)).await;
            delay = delay.saturating_mul(2);
        }
    }
}

/// Build an HTTP provider after validating the endpoint URL.
pub(crate) fn connect_http(rpc_url: &str) -> Result<Arc<Provider<Http>>, FlowError> {
    let url = Url::parse(rpc_url)
        .map_err(|e| FlowError::Gateway(format!("invalid RPC URL '{}': {}", rpc_url, e)))?;
    let provider = Provider::<Http>::try_from(url.as_str()).map_err(FlowError::gateway)?;
    Ok(Arc::new(provider))
}

#[async_trait]
impl ChainGateway for HttpGateway {
    async fn get_balance(&self, address: Address) -> Result<U256, FlowError> {
        self.read("balance lookup", || self.provider.get_balance(address, None))
            .await
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64, FlowError> {
        let count = self
            .read("transaction count lookup", || {
                self.provider.get_transaction_count(address, None)
            })
            .await?;
        if count > U256::from(u64::MAX) {
            return Err(FlowError::Gateway(format!(
                "transaction count out of range: {}",
                count
            )));
        }
        Ok(count.as_u64())
    }

    async fn send_transaction(&self, signed: Bytes) -> Result<TxHash, FlowError> {
        // Single attempt; sends are never retried
        self.attempt("transaction broadcast", async {
            self.provider
                .send_raw_transaction(signed)
                .await
                .map(|pending| pending.tx_hash())
        })
        .await
    }

    async fn get_gas_price(&self) -> Result<U256, FlowError> {
        self.read("gas price lookup", || self.provider.get_gas_price())
            .await
    }

    async fn get_receipt_block(&self, tx_hash: TxHash) -> Result<Option<u64>, FlowError> {
        let receipt = self
            .read("receipt lookup", || self.provider.get_transaction_receipt(tx_hash))
            .await?;
        Ok(receipt.and_then(|r| r.block_number).map(|n| n.as_u64()))
    }
}

/// Poll for a receipt until it is mined or `timeout_secs` elapses.
pub async fn wait_for_receipt(
    gateway: &dyn ChainGateway,
    tx_hash: TxHash,
    timeout_secs: u64,
) -> Result<u64, FlowError> {
    let max_attempts = (timeout_secs * 1000 / RECEIPT_POLL_INTERVAL_MS).max(1);
    let mut attempts = 0;

    loop {
        if let Ok(Some(block)) = gateway.get_receipt_block(tx_hash).await {
            return Ok(block);
        }

        attempts += 1;
        if attempts >= max_attempts {
            return Err(FlowError::RequestTimeout {
                operation: format!("confirmation of {:?}", tx_hash),
                seconds: timeout_secs,
            });
        }

        sleep(Duration::from_millis(RECEIPT_POLL_INTERVAL_MS)).await;
    }
}
