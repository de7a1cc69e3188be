//! Network assurance: put the wallet on the required chain before anything
//! is signed.
//!
//! Runs as a small state machine:
//! `Checking -> Switching -> Registering -> Switching -> Checking -> Done`.
//! A registration is attempted at most once, only after the wallet reports
//! the chain as unknown, so there are never more than two switch requests.
//! Nothing is cached: every signing action calls [`ensure_network`] again.

use crate::config::{chain_label, ChainParams};
use crate::connector::WalletConnector;
use crate::error::{ConnectorError, FlowError};
use crate::types::NetworkState;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssuranceStep {
    Checking,
    Switching,
    Registering,
    Done,
    Failed,
}

/// Path taken by a successful assurance run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssuranceReport {
    pub visited: Vec<AssuranceStep>,
    pub network: NetworkState,
    pub switch_attempts: u32,
    pub registered: bool,
}

impl AssuranceReport {
    /// True when the wallet was already on the right chain.
    pub fn was_already_on_chain(&self) -> bool {
        self.switch_attempts == 0
    }

    pub fn path(&self) -> String {
        self.visited
            .iter()
            .map(|s| format!("{:?}", s))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

enum State {
    Checking,
    Switching,
    Registering,
    Done(NetworkState),
    Failed(FlowError),
}

impl State {
    fn step(&self) -> AssuranceStep {
        match self {
            State::Checking => AssuranceStep::Checking,
            State::Switching => AssuranceStep::Switching,
            State::Registering => AssuranceStep::Registering,
            State::Done(_) => AssuranceStep::Done,
            State::Failed(_) => AssuranceStep::Failed,
        }
    }
}

/// Make sure the connector's active chain is `chain`, switching and
/// registering as needed.
pub async fn ensure_network(
    connector: &dyn WalletConnector,
    chain: &ChainParams,
) -> Result<AssuranceReport, FlowError> {
    let required = chain.chain_id;
    let mut state = State::Checking;
    let mut visited = Vec::new();
    let mut switch_attempts = 0u32;
    let mut registered = false;

    loop {
        let step = state.step();
        visited.push(step);
        debug!("Network assurance for {}: {:?}", chain.label, step);

        state = match state {
            State::Checking => match connector.get_active_chain_id().await {
                Ok(active) if active == required => State::Done(NetworkState {
                    active_chain_id: active,
                    required_chain_id: required,
                }),
                Ok(active) if switch_attempts == 0 => {
                    info!(
                        "Wallet is on {}, switching to {}",
                        chain_label(active),
                        chain.label
                    );
                    State::Switching
                }
                Ok(active) => State::Failed(FlowError::Connector(format!(
                    "wallet is still on {} after switching to {}",
                    chain_label(active),
                    chain.label
                ))),
                Err(e) => State::Failed(FlowError::from_connector("network check", e)),
            },

            State::Switching => {
                switch_attempts += 1;
                match connector.request_switch_chain(required).await {
                    Ok(()) => State::Checking,
                    Err(ConnectorError::ChainNotAdded(_)) if !registered => {
                        info!("Wallet does not know {}, registering it", chain.label);
                        State::Registering
                    }
                    Err(e) => State::Failed(FlowError::from_connector("network switch", e)),
                }
            }

            State::Registering => {
                registered = true;
                match connector.register_chain(chain).await {
                    Ok(()) => State::Switching,
                    Err(e) => State::Failed(FlowError::from_connector("network registration", e)),
                }
            }

            State::Done(network) => {
                return Ok(AssuranceReport {
                    visited,
                    network,
                    switch_attempts,
                    registered,
                });
            }

            State::Failed(err) => {
                if err.is_silent() {
                    info!("Network assurance stopped: {}", err);
                } else {
                    warn!("Network assurance failed: {}", err);
                }
                return Err(err);
            }
        };
    }
}
