//! In-memory gateway and connector doubles for flow tests.

use crate::batch::{Confirmer, TransferPlan};
use crate::config::ChainParams;
use crate::connector::{TransactionSigner, WalletConnector};
use crate::error::{ConnectorError, FlowError};
use crate::gateway::ChainGateway;
use async_trait::async_trait;
use ethers::types::{Address, Bytes, TxHash, U256};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn ether(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

// ==================== FakeGateway ====================

#[derive(Default)]
struct GatewayState {
    balances: HashMap<Address, U256>,
    counts: HashMap<Address, u64>,
    receipts: HashMap<TxHash, u64>,
    balance_error: Option<FlowError>,
    count_error: Option<FlowError>,
    send_error: Option<FlowError>,
    raw_sent: Vec<Bytes>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<GatewayState>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, address: Address, wei: U256) {
        self.state.lock().unwrap().balances.insert(address, wei);
    }

    pub fn set_transaction_count(&self, address: Address, count: u64) {
        self.state.lock().unwrap().counts.insert(address, count);
    }

    pub fn set_receipt(&self, tx_hash: TxHash, block: u64) {
        self.state.lock().unwrap().receipts.insert(tx_hash, block);
    }

    pub fn fail_balance_with(&self, err: FlowError) {
        self.state.lock().unwrap().balance_error = Some(err);
    }

    pub fn fail_count_with(&self, err: FlowError) {
        self.state.lock().unwrap().count_error = Some(err);
    }

    pub fn fail_sends_with(&self, err: FlowError) {
        self.state.lock().unwrap().send_error = Some(err);
    }

    pub fn raw_transactions(&self) -> Vec<Bytes> {
        self.state.lock().unwrap().raw_sent.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl ChainGateway for FakeGateway {
    async fn get_balance(&self, address: Address) -> Result<U256, FlowError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("balance".into());
        if let Some(err) = state.balance_error.clone() {
            return Err(err);
        }
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64, FlowError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("count".into());
        if let Some(err) = state.count_error.clone() {
            return Err(err);
        }
        Ok(state.counts.get(&address).copied().unwrap_or_default())
    }

    async fn send_transaction(&self, signed: Bytes) -> Result<TxHash, FlowError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("send".into());
        if let Some(err) = state.send_error.clone() {
            return Err(err);
        }
        state.raw_sent.push(signed);
        Ok(TxHash::from_low_u64_be(state.raw_sent.len() as u64))
    }

    async fn get_gas_price(&self) -> Result<U256, FlowError> {
        Ok(U256::exp10(9))
    }

    async fn get_receipt_block(&self, tx_hash: TxHash) -> Result<Option<u64>, FlowError> {
        Ok(self.state.lock().unwrap().receipts.get(&tx_hash).copied())
    }
}

// ==================== FakeSigner ====================

pub struct FakeSigner {
    address: Address,
    fail_at: Option<(usize, FlowError)>,
    sent: Mutex<Vec<(Address, U256)>>,
}

impl FakeSigner {
    pub fn sent(&self) -> Vec<(Address, U256)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSigner for FakeSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, to: Address, value: U256) -> Result<TxHash, FlowError> {
        let mut sent = self.sent.lock().unwrap();
        let index = sent.len();
        if let Some((fail_index, err)) = &self.fail_at {
            if *fail_index == index {
                return Err(err.clone());
            }
        }
        sent.push((to, value));
        Ok(TxHash::from_low_u64_be(index as u64 + 1))
    }
}

// ==================== FakeConnector ====================

struct ConnectorState {
    active_chain: u64,
    known: BTreeSet<u64>,
    switch_error: Option<ConnectorError>,
    register_error: Option<ConnectorError>,
    accounts_error: Option<ConnectorError>,
    chain_id_error: Option<ConnectorError>,
    ignore_registration: bool,
    switch_has_no_effect: bool,
    calls: Vec<String>,
}

/// Scripted wallet: knows a set of chains, records every call.
pub struct FakeConnector {
    state: Mutex<ConnectorState>,
    signer: Arc<FakeSigner>,
}

impl FakeConnector {
    pub fn on_chain(chain_id: u64) -> Self {
        let mut known = BTreeSet::new();
        known.insert(chain_id);
        Self {
            state: Mutex::new(ConnectorState {
                active_chain: chain_id,
                known,
                switch_error: None,
                register_error: None,
                accounts_error: None,
                chain_id_error: None,
                ignore_registration: false,
                switch_has_no_effect: false,
                calls: Vec::new(),
            }),
            signer: Arc::new(FakeSigner {
                address: addr(0xAA),
                fail_at: None,
                sent: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn knows(self, chain_id: u64) -> Self {
        self.state.lock().unwrap().known.insert(chain_id);
        self
    }

    pub fn switch_fails_with(self, err: ConnectorError) -> Self {
        self.state.lock().unwrap().switch_error = Some(err);
        self
    }

    pub fn register_fails_with(self, err: ConnectorError) -> Self {
        self.state.lock().unwrap().register_error = Some(err);
        self
    }

    pub fn accounts_fail_with(self, err: ConnectorError) -> Self {
        self.state.lock().unwrap().accounts_error = Some(err);
        self
    }

    pub fn chain_id_fails_with(self, err: ConnectorError) -> Self {
        self.state.lock().unwrap().chain_id_error = Some(err);
        self
    }

    /// Registration reports success but the wallet still does not know the chain.
    pub fn ignoring_registration(self) -> Self {
        self.state.lock().unwrap().ignore_registration = true;
        self
    }

    /// Switch reports success but the active chain stays put.
    pub fn switch_without_effect(self) -> Self {
        self.state.lock().unwrap().switch_has_no_effect = true;
        self
    }

    pub fn signer_fails_at(mut self, index: usize, err: FlowError) -> Self {
        self.signer = Arc::new(FakeSigner {
            address: self.signer.address,
            fail_at: Some((index, err)),
            sent: Mutex::new(Vec::new()),
        });
        self
    }

    pub fn account(&self) -> Address {
        self.signer.address
    }

    pub fn signer(&self) -> Arc<FakeSigner> {
        self.signer.clone()
    }

    pub fn set_active_chain(&self, chain_id: u64) {
        self.state.lock().unwrap().active_chain = chain_id;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl WalletConnector for FakeConnector {
    async fn get_active_chain_id(&self) -> Result<u64, ConnectorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("chain_id".into());
        if let Some(err) = state.chain_id_error.clone() {
            return Err(err);
        }
        Ok(state.active_chain)
    }

    async fn request_switch_chain(&self, chain_id: u64) -> Result<(), ConnectorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("switch:{}", chain_id));
        if let Some(err) = state.switch_error.clone() {
            return Err(err);
        }
        if !state.known.contains(&chain_id) {
            return Err(ConnectorError::ChainNotAdded(chain_id));
        }
        if !state.switch_has_no_effect {
            state.active_chain = chain_id;
        }
        Ok(())
    }

    async fn register_chain(&self, params: &ChainParams) -> Result<(), ConnectorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("register:{}", params.chain_id));
        if let Some(err) = state.register_error.clone() {
            return Err(err);
        }
        if !state.ignore_registration {
            state.known.insert(params.chain_id);
        }
        Ok(())
    }

    async fn request_accounts(&self) -> Result<Address, ConnectorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("accounts".into());
        if let Some(err) = state.accounts_error.clone() {
            return Err(err);
        }
        Ok(self.signer.address)
    }

    async fn get_signer(&self) -> Result<Arc<dyn TransactionSigner>, ConnectorError> {
        self.state.lock().unwrap().calls.push("signer".into());
        Ok(self.signer.clone())
    }
}

// ==================== Confirmers ====================

/// Answers every confirmation the same way and keeps the prompts it saw.
pub struct ScriptedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn accepting() -> Self {
        Self { answer: true, prompts: Mutex::new(Vec::new()) }
    }

    pub fn declining() -> Self {
        Self { answer: false, prompts: Mutex::new(Vec::new()) }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, plan: &TransferPlan) -> bool {
        self.prompts.lock().unwrap().push(plan.confirmation_prompt());
        self.answer
    }
}
