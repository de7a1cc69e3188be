//! Small formatting helpers for the views.

use super::notifications::{NotificationEntry, NotificationLevel};
use super::theme::AppTheme;
use crate::batch::{BatchProgress, BatchStatus};
use crate::types::{BalanceTier, TransferOutcome, TransferResult};
use eframe::egui;
use ethers::types::TxHash;

/// Duration of the balance count-up animation.
pub const COUNT_UP_MILLIS: u64 = 900;

pub fn tier_color(theme: &AppTheme, tier: BalanceTier) -> egui::Color32 {
    match tier {
        BalanceTier::Empty => theme.text_secondary,
        BalanceTier::Low => theme.warning,
        BalanceTier::High => theme.success,
    }
}

pub fn level_color(theme: &AppTheme, level: NotificationLevel) -> egui::Color32 {
    match level {
        NotificationLevel::Info => theme.text_primary,
        NotificationLevel::Success => theme.success,
        NotificationLevel::Cancelled => theme.text_secondary,
        NotificationLevel::Error => theme.error,
    }
}

/// "0xabcdef...1234"
pub fn short_hash(hash: &TxHash) -> String {
    let full = format!("{:?}", hash);
    format!("{}...{}", &full[..8], &full[full.len() - 4..])
}

/// One row of the live batch table.
pub fn outcome_line(outcome: &TransferOutcome) -> String {
    let to = crate::presentation::short_address(&outcome.recipient);
    match &outcome.result {
        TransferResult::Success {
            tx_hash,
            block_number: Some(block),
        } => format!("[OK] {} {} (block {})", to, short_hash(tx_hash), block),
        TransferResult::Success { tx_hash, block_number: None } => {
            format!("[OK] {} {}", to, short_hash(tx_hash))
        }
        TransferResult::Failure { reason } => format!("[!!] {} {}", to, reason),
    }
}

pub fn progress_line(progress: &BatchProgress) -> String {
    match progress {
        BatchProgress::Submitted { index, recipient, tx_hash } => format!(
            "#{} {} submitted {}",
            index + 1,
            crate::presentation::short_address(recipient),
            short_hash(tx_hash)
        ),
        BatchProgress::Finished { index, outcome } => {
            format!("#{} {}", index + 1, outcome_line(outcome))
        }
    }
}

pub fn status_level(status: &BatchStatus) -> NotificationLevel {
    match status {
        BatchStatus::Completed => NotificationLevel::Success,
        BatchStatus::Cancelled { .. } => NotificationLevel::Cancelled,
        BatchStatus::Aborted { .. } => NotificationLevel::Error,
    }
}

/// Message for the red line under the send form. Declines stay silent there.
pub fn inline_error(entry: &NotificationEntry) -> Option<String> {
    (entry.level == NotificationLevel::Error).then(|| entry.message.clone())
}
