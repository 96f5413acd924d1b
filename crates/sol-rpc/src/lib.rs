//! # sol-rpc
//!
//! The network boundary of the token page: a Solana JSON-RPC client behind
//! the [`Connection`] trait, and the send-then-confirm loop.

pub mod client;
pub mod commitment;
pub mod connection;
pub mod error;

pub use client::RpcClient;
pub use commitment::{CommitmentLevel, SignatureStatus};
pub use connection::{confirm_transaction, ConfirmOptions, Connection, LatestBlockhash};
pub use error::RpcError;
