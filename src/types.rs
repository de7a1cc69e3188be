//! Common types shared across modules.

use crate::utils;
use chrono::{DateTime, Local};
use ethers::types::{Address, TxHash, U256};

/// Balances at or above this many native units are classed as `High`.
pub const HIGH_TIER_THRESHOLD: f64 = 100.0;

/// A balance read from the chain, in smallest units and display units.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReading {
    pub raw: U256,
    pub display_value: f64,
    pub formatted: String,
}

impl BalanceReading {
    pub fn from_wei(raw: U256) -> Self {
        Self {
            raw,
            display_value: utils::wei_to_display_value(raw),
            formatted: utils::format_amount_trimmed(raw),
        }
    }

    pub fn tier(&self) -> BalanceTier {
        BalanceTier::classify(self.display_value)
    }
}

/// Qualitative classification of a balance, for status messaging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceTier {
    Empty,
    Low,
    High,
}

impl BalanceTier {
    pub fn classify(display_value: f64) -> Self {
        if display_value <= 0.0 {
            BalanceTier::Empty
        } else if display_value < HIGH_TIER_THRESHOLD {
            BalanceTier::Low
        } else {
            BalanceTier::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BalanceTier::Empty => "Empty",
            BalanceTier::Low => "Low",
            BalanceTier::High => "High",
        }
    }
}

/// Result of one wallet query. Both readings come from the same query.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletSnapshot {
    pub address: Address,
    pub balance: BalanceReading,
    pub tx_count: u64,
    pub tier: BalanceTier,
    pub fetched_at: DateTime<Local>,
}

/// Active vs required chain, re-read before every signing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkState {
    pub active_chain_id: u64,
    pub required_chain_id: u64,
}

impl NetworkState {
    pub fn matches(&self) -> bool {
        self.active_chain_id == self.required_chain_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferResult {
    Success {
        tx_hash: TxHash,
        block_number: Option<u64>,
    },
    Failure {
        reason: String,
    },
}

/// Outcome of submitting one transfer of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub recipient: Address,
    pub result: TransferResult,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.result, TransferResult::Success { .. })
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self.result {
            TransferResult::Success { tx_hash, .. } => Some(tx_hash),
            TransferResult::Failure { .. } => None,
        }
    }
}
