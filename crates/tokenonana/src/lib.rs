//! # tokenonana
//!
//! A token page for SPL tokens on Solana devnet: create a mint, then
//! transfer, mint, and burn it from a connected wallet.
//!
//! [`TokenPage`] holds the form and runs the handlers; every submission
//! goes through [`Submitter`], which signs, sends, and waits for
//! `processed` confirmation.

pub mod config;
pub mod context;
pub mod error;
pub mod form;
pub mod page;
pub mod submit;

pub use config::{Config, ConfigError};
pub use context::WalletContext;
pub use error::{PageError, SubmitError};
pub use form::TokenForm;
pub use page::TokenPage;
pub use submit::Submitter;
