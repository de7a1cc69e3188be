//! Batch native transfers: one transaction per recipient, sent in order.
//!
//! The flow is split in two so a UI can show the plan before anything is
//! signed: [`prepare_batch`] validates input and builds a [`TransferPlan`],
//! [`execute_batch`] assures the network once and submits sequentially.
//! [`send_batch`] chains both around a [`Confirmer`].
//!
//! The first failed transfer aborts the rest of the batch. Batches are not
//! resumable; [`BatchReport::remaining_recipients`] gives the unsent tail so
//! a new batch can be started from it.

use crate::config::Config;
use crate::error::{FlowError, ValidationError};
use crate::gateway::{wait_for_receipt, ChainGateway};
use crate::network::ensure_network;
use crate::session::WalletSession;
use crate::types::{TransferOutcome, TransferResult};
use crate::utils::{self, DIVIDE_DECIMALS};
use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

/// Raw recipient entries in input order.
pub type RecipientList = Vec<String>;

/// Split free-form text on whitespace, commas and newlines, dropping empty
/// entries. Idempotent.
pub fn parse_recipients(text: &str) -> RecipientList {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Valid and invalid entries of a recipient list. Disjoint, and together
/// they cover every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientPartition {
    pub valid: Vec<Address>,
    pub invalid: Vec<String>,
}

pub fn partition_recipients<F>(list: &[String], is_valid: F) -> RecipientPartition
where
    F: Fn(&str) -> bool,
{
    let mut partition = RecipientPartition::default();
    for entry in list {
        match entry.parse::<Address>() {
            Ok(address) if is_valid(entry) => partition.valid.push(address),
            _ => partition.invalid.push(entry.clone()),
        }
    }
    partition
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Every recipient gets the full amount.
    Uniform,
    /// The amount is split evenly across recipients.
    Divided,
}

impl TransferMode {
    pub fn label(&self) -> &'static str {
        match self {
            TransferMode::Uniform => "same amount to each",
            TransferMode::Divided => "divided evenly",
        }
    }
}

/// What the user typed into the send form.
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest<'a> {
    pub recipients: &'a str,
    pub amount: &'a str,
    pub divide: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Amount as entered.
    pub total: U256,
    pub per_recipient: U256,
    pub mode: TransferMode,
    pub recipients: Vec<Address>,
    pub symbol: &'static str,
}

impl TransferPlan {
    pub fn recipient_count(&self) -> usize {
        self.recipients.len()
    }

    /// What actually leaves the wallet: the per-recipient amount times the
    /// recipient count. In uniform mode this is the entered amount times the
    /// count; in divided mode it is the entered amount up to rounding.
    /// Plans from `prepare_batch` are checked not to overflow here.
    pub fn effective_total(&self) -> U256 {
        self.per_recipient
            .saturating_mul(U256::from(self.recipients.len()))
    }

    pub fn per_recipient_display(&self) -> String {
        match self.mode {
            TransferMode::Divided => {
                utils::format_amount_fixed(self.per_recipient, DIVIDE_DECIMALS as usize)
            }
            TransferMode::Uniform => utils::format_amount_trimmed(self.per_recipient),
        }
    }

    pub fn effective_total_display(&self) -> String {
        utils::format_amount_trimmed(self.effective_total())
    }

    pub fn confirmation_prompt(&self) -> String {
        let count = self.recipient_count();
        let noun = if count == 1 { "recipient" } else { "recipients" };
        match self.mode {
            TransferMode::Uniform => format!(
                "Send {per} {sym} to each of {count} {noun}? {per} {sym} x {count} = {total} {sym} total.",
                per = self.per_recipient_display(),
                sym = self.symbol,
                count = count,
                noun = noun,
                total = self.effective_total_display(),
            ),
            TransferMode::Divided => {
                let mut prompt = format!(
                    "Send {total} {sym} total, divided across {count} {noun} ({per} {sym} each)?",
                    total = self.effective_total_display(),
                    sym = self.symbol,
                    count = count,
                    noun = noun,
                    per = self.per_recipient_display(),
                );
                if self.effective_total() != self.total {
                    prompt.push_str(&format!(
                        " Rounded from {} {}.",
                        utils::format_amount_trimmed(self.total),
                        self.symbol
                    ));
                }
                prompt
            }
        }
    }
}

/// Validate the send form and compute the plan. Makes no network calls.
///
/// Checks run in order and stop at the first failure: connected wallet,
/// at least one recipient, a positive amount, then every recipient address
/// (all invalid entries are reported together).
pub fn prepare_batch(
    session: &WalletSession,
    gateway: &dyn ChainGateway,
    request: &BatchRequest<'_>,
) -> Result<TransferPlan, FlowError> {
    if session.account().is_none() {
        return Err(ValidationError::WalletNotConnected.into());
    }

    let list = parse_recipients(request.recipients);
    if list.is_empty() {
        return Err(ValidationError::NoRecipients.into());
    }

    let total = utils::parse_amount(request.amount)?;

    let partition = partition_recipients(&list, |entry| gateway.is_valid_address_format(entry));
    if !partition.invalid.is_empty() {
        return Err(ValidationError::InvalidRecipients(partition.invalid).into());
    }

    let count = partition.valid.len();
    let (mode, per_recipient) = if request.divide {
        let per = utils::divide_rounded(total, count, DIVIDE_DECIMALS);
        if per.is_zero() {
            return Err(ValidationError::AmountTooSmallToDivide(count).into());
        }
        (TransferMode::Divided, per)
    } else {
        (TransferMode::Uniform, total)
    };
    if per_recipient.checked_mul(U256::from(count)).is_none() {
        return Err(ValidationError::TotalTooLarge(count).into());
    }

    Ok(TransferPlan {
        total,
        per_recipient,
        mode,
        recipients: partition.valid,
        symbol: session.chain().native_token,
    })
}

/// Asks the user to approve a plan before anything is signed.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, plan: &TransferPlan) -> bool;
}

/// Per-recipient progress, streamed while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchProgress {
    Submitted {
        index: usize,
        recipient: Address,
        tx_hash: TxHash,
    },
    Finished {
        index: usize,
        outcome: TransferOutcome,
    },
}

#[derive(Debug, Default)]
pub struct BatchOptions {
    pub wait_for_receipt: bool,
    pub confirmation_timeout_secs: u64,
    pub progress: Option<mpsc::UnboundedSender<BatchProgress>>,
    pub cancel: Option<oneshot::Receiver<()>>,
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            wait_for_receipt: config.wait_for_receipt,
            confirmation_timeout_secs: config.confirmation_timeout_secs,
            progress: None,
            cancel: None,
        }
    }

    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<BatchProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn with_cancel(mut self, receiver: oneshot::Receiver<()>) -> Self {
        self.cancel = Some(receiver);
        self
    }

    fn report(&self, update: BatchProgress) {
        if let Some(sender) = &self.progress {
            let _ = sender.send(update);
        }
    }

    fn cancel_requested(&mut self) -> bool {
        match self.cancel.as_mut() {
            Some(receiver) => receiver.try_recv().is_ok(),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Completed,
    /// A transfer failed; `sent` transfers went out before it.
    Aborted { sent: usize, reason: String },
    Cancelled { sent: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub plan: TransferPlan,
    /// In recipient order. On abort the last entry is the failure.
    pub outcomes: Vec<TransferOutcome>,
    pub status: BatchStatus,
}

impl BatchReport {
    pub fn sent_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.status == BatchStatus::Completed
    }

    /// Recipients that did not receive their transfer, in order.
    pub fn remaining_recipients(&self) -> Vec<Address> {
        self.plan
            .recipients
            .iter()
            .skip(self.sent_count())
            .copied()
            .collect()
    }

    pub fn summary(&self) -> String {
        let total = self.plan.recipient_count();
        match &self.status {
            BatchStatus::Completed => format!(
                "Sent {} of {} transfers ({} {}).",
                self.sent_count(),
                total,
                self.plan.effective_total_display(),
                self.plan.symbol
            ),
            BatchStatus::Aborted { sent, reason } => format!(
                "Batch stopped after {} of {} transfers: {}",
                sent, total, reason
            ),
            BatchStatus::Cancelled { sent } => {
                format!("Batch cancelled after {} of {} transfers.", sent, total)
            }
        }
    }
}

/// Submit an approved plan. Network assurance runs once up front; a failure
/// there returns an error before anything is sent. After that the result is
/// always a report, whatever happened to the individual transfers.
pub async fn execute_batch(
    session: &WalletSession,
    gateway: &dyn ChainGateway,
    plan: TransferPlan,
    mut options: BatchOptions,
) -> Result<BatchReport, FlowError> {
    let connector = session.connector();
    ensure_network(connector.as_ref(), session.chain()).await?;

    let signer = connector
        .get_signer()
        .await
        .map_err(|e| FlowError::from_connector("signer request", e))?;
    if session.account().is_some_and(|account| account != signer.address()) {
        warn!(
            "Wallet now signs as {:?}, connected as {:?}",
            signer.address(),
            session.account()
        );
    }

    info!(
        "Sending {} {} to {} recipients ({:?})",
        plan.per_recipient_display(),
        plan.symbol,
        plan.recipient_count(),
        plan.mode
    );

    let mut outcomes = Vec::with_capacity(plan.recipient_count());
    let mut status = BatchStatus::Completed;

    for (index, &recipient) in plan.recipients.iter().enumerate() {
        if options.cancel_requested() {
            info!("Batch cancelled before recipient {}", index + 1);
            status = BatchStatus::Cancelled { sent: outcomes.len() };
            break;
        }

        let outcome = match signer.send_transaction(recipient, plan.per_recipient).await {
            Ok(tx_hash) => {
                info!("[{}/{}] {:?} -> {:?}", index + 1, plan.recipient_count(), recipient, tx_hash);
                options.report(BatchProgress::Submitted { index, recipient, tx_hash });

                let block_number = if options.wait_for_receipt {
                    match wait_for_receipt(gateway, tx_hash, options.confirmation_timeout_secs).await {
                        Ok(block) => Some(block),
                        Err(e) => {
                            warn!("{:?} not confirmed yet: {}", tx_hash, e);
                            None
                        }
                    }
                } else {
                    None
                };

                TransferOutcome {
                    recipient,
                    result: TransferResult::Success { tx_hash, block_number },
                }
            }
            Err(e) => {
                let reason = e.user_message();
                error!(
                    "Transfer {}/{} to {:?} failed, aborting batch: {}",
                    index + 1,
                    plan.recipient_count(),
                    recipient,
                    e
                );
                status = BatchStatus::Aborted {
                    sent: outcomes.len(),
                    reason: reason.clone(),
                };
                TransferOutcome {
                    recipient,
                    result: TransferResult::Failure { reason },
                }
            }
        };

        options.report(BatchProgress::Finished {
            index,
            outcome: outcome.clone(),
        });
        outcomes.push(outcome);

        if status != BatchStatus::Completed {
            break;
        }
    }

    let report = BatchReport {
        plan,
        outcomes,
        status,
    };
    info!("{}", report.summary());
    Ok(report)
}

/// Prepare, confirm and execute. A declined confirmation returns
/// `UserRejected` without touching the wallet.
pub async fn send_batch(
    session: &WalletSession,
    gateway: &dyn ChainGateway,
    confirmer: &dyn Confirmer,
    request: &BatchRequest<'_>,
    options: BatchOptions,
) -> Result<BatchReport, FlowError> {
    let plan = prepare_batch(session, gateway, request)?;

    if !confirmer.confirm(&plan).await {
        info!("Batch of {} transfers declined", plan.recipient_count());
        return Err(FlowError::UserRejected("batch transfer".to_string()));
    }

    execute_batch(session, gateway, plan, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MONAD_TESTNET;
    use crate::testing::{addr, ether, FakeConnector, FakeGateway, ScriptedConfirmer};
    use std::sync::Arc;

    fn hex(byte: u8) -> String {
        format!("{:?}", addr(byte))
    }

    async fn connected(fake: Arc<FakeConnector>) -> WalletSession {
        let mut session = WalletSession::new(fake, MONAD_TESTNET);
        session.connect().await.unwrap();
        session
    }

    fn no_wait() -> BatchOptions {
        BatchOptions::default()
    }

    fn request<'a>(recipients: &'a str, amount: &'a str, divide: bool) -> BatchRequest<'a> {
        BatchRequest {
            recipients,
            amount,
            divide,
        }
    }

    // ==================== parsing tests ====================

    #[test]
    fn test_parse_recipients_mixed_separators() {
        let list = parse_recipients("0xAAA, 0xBBB\n0xCCC");
        assert_eq!(list, vec!["0xAAA", "0xBBB", "0xCCC"]);
    }

    #[test]
    fn test_parse_recipients_drops_empty_segments() {
        let list = parse_recipients(" ,,\n\t 0x1 ,\r\n , 0x2,, \n");
        assert_eq!(list, vec!["0x1", "0x2"]);
        assert!(parse_recipients("  \n , ").is_empty());
    }

    #[test]
    fn test_parse_recipients_idempotent() {
        let text = "0xAAA,0xBBB\n\n  0xCCC 0xDDD";
        let once = parse_recipients(text);
        let twice = parse_recipients(&once.join("\n"));
        assert_eq!(once, parse_recipients(text));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_partition_is_disjoint_and_exhaustive() {
        let list = vec![hex(1), "0xAAA".to_string(), hex(2), "junk".to_string()];
        let partition = partition_recipients(&list, utils::is_valid_address_format);

        assert_eq!(partition.valid, vec![addr(1), addr(2)]);
        assert_eq!(partition.invalid, vec!["0xAAA", "junk"]);
        assert_eq!(partition.valid.len() + partition.invalid.len(), list.len());
    }

    // ==================== plan tests ====================

    #[tokio::test]
    async fn test_divided_plan() {
        let session = connected(Arc::new(FakeConnector::on_chain(10143))).await;
        let text = format!("{}, {}\n{}", hex(1), hex(2), hex(3));
        let plan = prepare_batch(&session, &FakeGateway::new(), &request(&text, "9", true)).unwrap();

        assert_eq!(plan.mode, TransferMode::Divided);
        assert_eq!(plan.per_recipient_display(), "3.000000");
        assert_eq!(plan.effective_total(), ether(9));
        assert_eq!(
            plan.confirmation_prompt(),
            "Send 9 MON total, divided across 3 recipients (3.000000 MON each)?"
        );
    }

    #[tokio::test]
    async fn test_uniform_plan_spells_out_multiplication() {
        let session = connected(Arc::new(FakeConnector::on_chain(10143))).await;
        let text = format!("{},{}", hex(1), hex(2));
        let plan = prepare_batch(&session, &FakeGateway::new(), &request(&text, "5", false)).unwrap();

        assert_eq!(plan.mode, TransferMode::Uniform);
        assert_eq!(plan.per_recipient_display(), "5");
        assert_eq!(plan.effective_total_display(), "10");
        assert_eq!(
            plan.confirmation_prompt(),
            "Send 5 MON to each of 2 recipients? 5 MON x 2 = 10 MON total."
        );
    }

    #[tokio::test]
    async fn test_divided_rounding_stays_within_tolerance() {
        let session = connected(Arc::new(FakeConnector::on_chain(10143))).await;
        let text = format!("{} {} {}", hex(1), hex(2), hex(3));
        let plan = prepare_batch(&session, &FakeGateway::new(), &request(&text, "10", true)).unwrap();

        assert_eq!(plan.per_recipient_display(), "3.333333");
        assert_eq!(plan.total - plan.effective_total(), U256::exp10(12));
        assert!(plan.confirmation_prompt().ends_with("Rounded from 10 MON."));
    }

    #[tokio::test]
    async fn test_divided_error_bounded_by_half_unit_per_recipient() {
        let session = connected(Arc::new(FakeConnector::on_chain(10143))).await;
        // Half of the sixth decimal, in wei
        let half_unit = U256::from(5u64) * U256::exp10(11);

        for (amount, count) in [("10", 3u8), ("10", 7), ("2", 3), ("1", 6), ("1", 9), ("0.5", 13)] {
            let text = (1..=count).map(hex).collect::<Vec<_>>().join(" ");
            let plan = prepare_batch(&session, &FakeGateway::new(), &request(&text, amount, true)).unwrap();
            let effective = plan.effective_total();
            let diff = if effective > plan.total {
                effective - plan.total
            } else {
                plan.total - effective
            };
            assert!(
                diff <= half_unit * U256::from(count),
                "{} across {} off by {} wei",
                amount,
                count,
                diff
            );
        }
    }

    #[tokio::test]
    async fn test_divided_half_up_can_exceed_entered_total() {
        let session = connected(Arc::new(FakeConnector::on_chain(10143))).await;
        let text = format!("{} {} {}", hex(1), hex(2), hex(3));
        let plan = prepare_batch(&session, &FakeGateway::new(), &request(&text, "2", true)).unwrap();

        assert_eq!(plan.per_recipient_display(), "0.666667");
        assert_eq!(plan.effective_total() - plan.total, U256::exp10(12));
        assert!(plan.confirmation_prompt().ends_with("Rounded from 2 MON."));

        // 10 across 7 lands 3e-6 under the total
        let text = (1..=7u8).map(hex).collect::<Vec<_>>().join(" ");
        let plan = prepare_batch(&session, &FakeGateway::new(), &request(&text, "10", true)).unwrap();
        assert_eq!(plan.per_recipient_display(), "1.428571");
        assert_eq!(plan.total - plan.effective_total(), U256::from(3u64) * U256::exp10(12));
    }

    #[tokio::test]
    async fn test_uniform_total_overflow_is_rejected() {
        let session = connected(Arc::new(FakeConnector::on_chain(10143))).await;
        let text = (1..=20).map(hex).collect::<Vec<_>>().join(",");
        let huge = format!("1{}", "0".repeat(58));

        let err = prepare_batch(&session, &FakeGateway::new(), &request(&text, &huge, false)).unwrap_err();
        assert_eq!(err, FlowError::Validation(ValidationError::TotalTooLarge(20)));
    }

    #[tokio::test]
    async fn test_large_uniform_plan_renders_prompt() {
        let session = connected(Arc::new(FakeConnector::on_chain(10143))).await;
        let text = format!("{},{}", hex(1), hex(2));
        let amount = format!("1{}", "0".repeat(40));

        let plan = prepare_batch(&session, &FakeGateway::new(), &request(&text, &amount, false)).unwrap();
        assert_eq!(plan.effective_total(), U256::exp10(58) * U256::from(2u8));
        assert!(plan.confirmation_prompt().contains("x 2 ="));
    }

    #[tokio::test]
    async fn test_validation_order_wallet_first() {
        let session = WalletSession::new(Arc::new(FakeConnector::on_chain(10143)), MONAD_TESTNET);
        let err = prepare_batch(&session, &FakeGateway::new(), &request("", "abc", true)).unwrap_err();
        assert_eq!(err, FlowError::Validation(ValidationError::WalletNotConnected));
    }

    #[tokio::test]
    async fn test_validation_order_recipients_before_amount() {
        let session = connected(Arc::new(FakeConnector::on_chain(10143))).await;
        let err = prepare_batch(&session, &FakeGateway::new(), &request(" , \n", "-1", false)).unwrap_err();
        assert_eq!(err, FlowError::Validation(ValidationError::NoRecipients));
    }

    #[tokio::test]
    async fn test_validation_order_amount_before_addresses() {
        let session = connected(Arc::new(FakeConnector::on_chain(10143))).await;
        let err = prepare_batch(&session, &FakeGateway::new(), &request("0xAAA", "0", false)).unwrap_err();
        assert_eq!(err, FlowError::Validation(ValidationError::NonPositiveAmount));

        let err = prepare_batch(&session, &FakeGateway::new(), &request("0xAAA", "lots", false)).unwrap_err();
        assert_eq!(err, FlowError::Validation(ValidationError::InvalidAmount("lots".into())));
    }

    #[tokio::test]
    async fn test_all_invalid_recipients_reported() {
        let session = connected(Arc::new(FakeConnector::on_chain(10143))).await;
        let text = format!("0xAAA, {}\n0xCCC", hex(2));
        let err = prepare_batch(&session, &FakeGateway::new(), &request(&text, "1", false)).unwrap_err();
        assert_eq!(
            err,
            FlowError::Validation(ValidationError::InvalidRecipients(vec![
                "0xAAA".into(),
                "0xCCC".into()
            ]))
        );
    }

    #[tokio::test]
    async fn test_amount_too_small_to_divide() {
        let session = connected(Arc::new(FakeConnector::on_chain(10143))).await;
        let text = format!("{} {}", hex(1), hex(2));
        let err = prepare_batch(&session, &FakeGateway::new(), &request(&text, "0.0000001", true)).unwrap_err();
        assert_eq!(err, FlowError::Validation(ValidationError::AmountTooSmallToDivide(2)));
    }

    // ==================== execution tests ====================

    #[tokio::test]
    async fn test_declined_confirmation_makes_no_wallet_calls() {
        let fake = Arc::new(FakeConnector::on_chain(10143));
        let session = connected(fake.clone()).await;
        let calls_before = fake.calls().len();
        let confirmer = ScriptedConfirmer::declining();
        let text = format!("{},{}", hex(1), hex(2));

        let err = send_batch(&session, &FakeGateway::new(), &confirmer, &request(&text, "5", false), no_wait())
            .await
            .unwrap_err();

        assert_eq!(err, FlowError::UserRejected("batch transfer".into()));
        assert!(err.is_silent());
        assert_eq!(fake.calls().len(), calls_before);
        assert!(fake.signer().sent().is_empty());
        assert_eq!(
            confirmer.prompts(),
            vec!["Send 5 MON to each of 2 recipients? 5 MON x 2 = 10 MON total."]
        );
    }

    #[tokio::test]
    async fn test_sends_sequentially_in_order() {
        let fake = Arc::new(FakeConnector::on_chain(10143));
        let session = connected(fake.clone()).await;
        let text = format!("{}\n{}\n{}", hex(3), hex(1), hex(2));

        let report = send_batch(
            &session,
            &FakeGateway::new(),
            &ScriptedConfirmer::accepting(),
            &request(&text, "9", true),
            no_wait(),
        )
        .await
        .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.sent_count(), 3);
        let sent: Vec<Address> = fake.signer().sent().iter().map(|(to, _)| *to).collect();
        assert_eq!(sent, vec![addr(3), addr(1), addr(2)]);
        assert!(fake.signer().sent().iter().all(|(_, value)| *value == ether(3)));
        assert_eq!(report.summary(), "Sent 3 of 3 transfers (9 MON).");
    }

    #[tokio::test]
    async fn test_network_assured_once_before_loop() {
        let fake = Arc::new(FakeConnector::on_chain(1));
        let mut session = WalletSession::new(fake.clone(), MONAD_TESTNET);
        session.connect().await.unwrap();
        fake.set_active_chain(1);
        let before = fake.calls().len();

        let text = format!("{} {}", hex(1), hex(2));
        let plan = prepare_batch(&session, &FakeGateway::new(), &request(&text, "1", false)).unwrap();
        execute_batch(&session, &FakeGateway::new(), plan, no_wait()).await.unwrap();

        let calls = fake.calls()[before..].to_vec();
        assert_eq!(
            calls,
            vec!["chain_id", "switch:10143", "chain_id", "signer"]
        );
    }

    #[tokio::test]
    async fn test_failed_assurance_sends_nothing() {
        let fake = Arc::new(FakeConnector::on_chain(10143).switch_fails_with(
            crate::error::ConnectorError::Rpc {
                code: -32603,
                message: "internal error".into(),
            },
        ));
        let session = connected(fake.clone()).await;
        fake.set_active_chain(1);

        let text = hex(1);
        let plan = prepare_batch(&session, &FakeGateway::new(), &request(&text, "1", false)).unwrap();
        let err = execute_batch(&session, &FakeGateway::new(), plan, no_wait()).await.unwrap_err();

        assert!(matches!(err, FlowError::Connector(_)));
        assert!(fake.signer().sent().is_empty());
    }

    #[tokio::test]
    async fn test_first_failure_aborts_remaining() {
        let fake = Arc::new(
            FakeConnector::on_chain(10143)
                .signer_fails_at(1, FlowError::Gateway("insufficient funds".into())),
        );
        let session = connected(fake.clone()).await;
        let text = format!("{} {} {} {}", hex(1), hex(2), hex(3), hex(4));
        let plan = prepare_batch(&session, &FakeGateway::new(), &request(&text, "1", false)).unwrap();

        let report = execute_batch(&session, &FakeGateway::new(), plan, no_wait()).await.unwrap();

        assert_eq!(
            report.status,
            BatchStatus::Aborted {
                sent: 1,
                reason: "RPC error: insufficient funds".into()
            }
        );
        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes[0].is_success());
        assert!(!report.outcomes[1].is_success());
        assert_eq!(fake.signer().sent().len(), 1);
        assert_eq!(report.remaining_recipients(), vec![addr(2), addr(3), addr(4)]);
        assert_eq!(
            report.summary(),
            "Batch stopped after 1 of 4 transfers: RPC error: insufficient funds"
        );
    }

    #[tokio::test]
    async fn test_cancel_checked_between_recipients() {
        let fake = Arc::new(FakeConnector::on_chain(10143));
        let session = connected(fake.clone()).await;
        let text = format!("{} {} {}", hex(1), hex(2), hex(3));
        let plan = prepare_batch(&session, &FakeGateway::new(), &request(&text, "1", false)).unwrap();

        let (cancel_tx, cancel_rx) = oneshot::channel();
        cancel_tx.send(()).unwrap();
        let report = execute_batch(&session, &FakeGateway::new(), plan, no_wait().with_cancel(cancel_rx))
            .await
            .unwrap();

        assert_eq!(report.status, BatchStatus::Cancelled { sent: 0 });
        assert!(report.outcomes.is_empty());
        assert!(fake.signer().sent().is_empty());
        assert_eq!(report.remaining_recipients().len(), 3);
    }

    #[tokio::test]
    async fn test_dropped_cancel_sender_does_not_cancel() {
        let fake = Arc::new(FakeConnector::on_chain(10143));
        let session = connected(fake).await;
        let plan = prepare_batch(&session, &FakeGateway::new(), &request(&hex(1), "1", false)).unwrap();

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        drop(cancel_tx);
        let report = execute_batch(&session, &FakeGateway::new(), plan, no_wait().with_cancel(cancel_rx))
            .await
            .unwrap();
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_progress_and_receipts() {
        let fake = Arc::new(FakeConnector::on_chain(10143));
        let session = connected(fake).await;
        let gateway = FakeGateway::new();
        gateway.set_receipt(TxHash::from_low_u64_be(1), 100);
        gateway.set_receipt(TxHash::from_low_u64_be(2), 101);

        let text = format!("{} {}", hex(1), hex(2));
        let plan = prepare_batch(&session, &gateway, &request(&text, "2", true)).unwrap();
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let options = BatchOptions {
            wait_for_receipt: true,
            confirmation_timeout_secs: 5,
            ..BatchOptions::default()
        }
        .with_progress(progress_tx);

        let report = execute_batch(&session, &gateway, plan, options).await.unwrap();
        assert_eq!(
            report.outcomes[1].result,
            TransferResult::Success {
                tx_hash: TxHash::from_low_u64_be(2),
                block_number: Some(101)
            }
        );

        let mut updates = Vec::new();
        while let Ok(update) = progress_rx.try_recv() {
            updates.push(update);
        }
        assert_eq!(updates.len(), 4);
        assert!(matches!(updates[0], BatchProgress::Submitted { index: 0, .. }));
        assert!(matches!(updates[3], BatchProgress::Finished { index: 1, .. }));
    }
}
