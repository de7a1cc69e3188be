//! Monad testnet wallet viewer: balance lookup, network assurance and
//! sequential batch transfers behind an egui desktop shell.

pub mod batch;
pub mod config;
pub mod connector;
pub mod error;
pub mod gateway;
pub mod gui;
pub mod network;
pub mod presentation;
pub mod query;
pub mod session;
pub mod types;
pub mod utils;

#[cfg(test)]
mod testing;
