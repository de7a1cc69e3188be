//! Wallet lookup: balance and transaction count for a pasted address.

use crate::error::{FlowError, ValidationError};
use crate::gateway::ChainGateway;
use crate::types::{BalanceReading, WalletSnapshot};
use chrono::Local;
use ethers::types::Address;
use tracing::{info, warn};

/// Validate `address_text` and read its balance and transaction count.
///
/// Malformed input never reaches the gateway. Both reads run concurrently
/// and either both land in the snapshot or the whole query fails.
pub async fn query_wallet(
    gateway: &dyn ChainGateway,
    address_text: &str,
) -> Result<WalletSnapshot, FlowError> {
    let input = address_text.trim();
    if input.is_empty() {
        return Err(ValidationError::EmptyAddress.into());
    }
    if !gateway.is_valid_address_format(input) {
        return Err(ValidationError::InvalidAddress(input.to_string()).into());
    }
    let address: Address = input
        .parse()
        .map_err(|_| ValidationError::InvalidAddress(input.to_string()))?;

    info!("Querying {:?}", address);
    let (raw, tx_count) = tokio::try_join!(
        gateway.get_balance(address),
        gateway.get_transaction_count(address)
    )
    .map_err(|e| {
        warn!("Query for {:?} failed: {}", address, e);
        e
    })?;

    let balance = BalanceReading::from_wei(raw);
    let tier = balance.tier();
    info!(
        "{:?}: {} ({:?}), {} transactions",
        address, balance.formatted, tier, tx_count
    );

    Ok(WalletSnapshot {
        address,
        balance,
        tx_count,
        tier,
        fetched_at: Local::now(),
    })
}
