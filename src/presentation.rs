//! Display-side helpers. Nothing here decides anything; flows produce
//! results and these functions turn them into text and numbers for the UI.

use crate::config::ChainParams;
use crate::error::FlowError;
use crate::types::{BalanceTier, WalletSnapshot};
use ethers::types::Address;
use std::time::Duration;

/// Eased value of a count-up animation toward `target`.
///
/// Cubic ease-out: fast at the start, settling on `target` once `elapsed`
/// reaches `duration`.
pub fn count_up_value(target: f64, elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() || elapsed >= duration {
        return target;
    }
    let t = elapsed.as_secs_f64() / duration.as_secs_f64();
    let eased = 1.0 - (1.0 - t).powi(3);
    target * eased
}

pub fn tier_message(tier: BalanceTier, symbol: &str) -> String {
    match tier {
        BalanceTier::Empty => format!("No {} here yet. Grab some from the faucet.", symbol),
        BalanceTier::Low => format!("Some {} in the tank. Enough to try things out.", symbol),
        BalanceTier::High => format!("Plenty of {}. This wallet is well funded.", symbol),
    }
}

/// "0x1234...abcd"
pub fn short_address(address: &Address) -> String {
    let full = ethers::utils::to_checksum(address, None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Clipboard text for sharing a lookup.
pub fn share_text(snapshot: &WalletSnapshot, chain: &ChainParams) -> String {
    let address = ethers::utils::to_checksum(&snapshot.address, None);
    format!(
        "{} on {}: {} {} across {} transactions.\n{}",
        short_address(&snapshot.address),
        chain.label,
        snapshot.balance.formatted,
        chain.native_token,
        snapshot.tx_count,
        chain.address_url(&address)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Info(String),
    Error(String),
}

/// What the check panel shows. Each query result produces a new model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayModel {
    pub snapshot: Option<WalletSnapshot>,
    pub status: Option<StatusLine>,
}

impl DisplayModel {
    /// Success replaces both readings together. Failure keeps whatever was
    /// shown before and attaches the error.
    pub fn with_query_result(
        &self,
        result: &Result<WalletSnapshot, FlowError>,
        symbol: &str,
    ) -> DisplayModel {
        match result {
            Ok(snapshot) => DisplayModel {
                snapshot: Some(snapshot.clone()),
                status: Some(StatusLine::Info(tier_message(snapshot.tier, symbol))),
            },
            Err(err) => DisplayModel {
                snapshot: self.snapshot.clone(),
                status: Some(StatusLine::Error(err.user_message())),
            },
        }
    }
}
