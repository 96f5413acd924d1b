//! The token page: form state plus one handler per operation.
//!
//! Every handler has the same shape. Check the wallet is connected and the
//! handler's fields are filled in, build a transaction from the instruction
//! factories, hand it to the [`Submitter`], log the outcome.
//!
//! Handlers return `Err` when the input is rejected or the transaction
//! cannot be assembled (nothing touches the network), `Ok(None)` when an
//! RPC call or the submission failed, and `Ok(Some(sig))` on success.

use chain_sol::{spl_token, system, Keypair, Pubkey, Signature, Signer, SolError, Transaction};
use sol_rpc::Connection;

use crate::context::WalletContext;
use crate::error::PageError;
use crate::form::{self, TokenForm};
use crate::submit::Submitter;

pub struct TokenPage<C> {
    pub form: TokenForm,
    wallet: WalletContext,
    submitter: Submitter<C>,
    decimals: u8,
    active_mint: Option<Pubkey>,
}

/// Log a rejection and return it.
fn reject<T>(err: PageError) -> Result<T, PageError> {
    log::error!("{}", err);
    Err(err)
}

fn assembled(tx: Result<Transaction, SolError>) -> Result<Transaction, PageError> {
    tx.or_else(|e| reject(e.into()))
}

fn create_mint_transaction(
    owner: &Pubkey,
    mint: &Pubkey,
    lamports: u64,
    decimals: u8,
) -> Result<Transaction, SolError> {
    let instructions = [
        system::create_account(
            owner,
            mint,
            lamports,
            spl_token::MINT_SIZE,
            &spl_token::TOKEN_PROGRAM_ID,
        ),
        spl_token::initialize_mint(mint, owner, Some(owner), decimals),
    ];
    Transaction::new_with_payer(&instructions, owner)
}

fn transfer_transaction(
    owner: &Pubkey,
    recipient: &Pubkey,
    mint: &Pubkey,
    amount: u64,
) -> Result<Transaction, SolError> {
    let source = spl_token::derive_associated_token_address(owner, mint)?;
    let destination = spl_token::derive_associated_token_address(recipient, mint)?;
    let instructions = [
        spl_token::create_associated_token_account_idempotent(owner, recipient, mint)?,
        spl_token::transfer(&source, &destination, owner, amount)?,
    ];
    Transaction::new_with_payer(&instructions, owner)
}

fn mint_transaction(
    owner: &Pubkey,
    mint: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Transaction, SolError> {
    let destination = spl_token::derive_associated_token_address(owner, mint)?;
    let instructions = [
        spl_token::create_associated_token_account_idempotent(owner, owner, mint)?,
        spl_token::mint_to_checked(mint, &destination, owner, amount, decimals)?,
    ];
    Transaction::new_with_payer(&instructions, owner)
}

fn burn_transaction(
    owner: &Pubkey,
    mint: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Transaction, SolError> {
    let account = spl_token::derive_associated_token_address(owner, mint)?;
    let ix = spl_token::burn_checked(&account, mint, owner, amount, decimals)?;
    Transaction::new_with_payer(&[ix], owner)
}

impl<C: Connection> TokenPage<C> {
    pub fn new(wallet: WalletContext, submitter: Submitter<C>, decimals: u8) -> Self {
        Self {
            form: TokenForm::default(),
            wallet,
            submitter,
            decimals,
            active_mint: None,
        }
    }

    pub fn with_mint(mut self, mint: Option<Pubkey>) -> Self {
        self.active_mint = mint;
        self
    }

    pub fn wallet(&self) -> &WalletContext {
        &self.wallet
    }

    pub fn wallet_mut(&mut self) -> &mut WalletContext {
        &mut self.wallet
    }

    pub fn submitter(&self) -> &Submitter<C> {
        &self.submitter
    }

    /// The mint transfer/mint/burn operate on.
    pub fn active_mint(&self) -> Option<Pubkey> {
        self.active_mint
    }

    /// `"Account: <address>"`, blank after the colon while disconnected.
    pub fn account_label(&self) -> String {
        match self.wallet.public_key() {
            Some(pubkey) => format!("Account: {pubkey}"),
            None => "Account:".to_string(),
        }
    }

    /// Wallet button text: the first seven characters of the address.
    pub fn wallet_button_label(&self) -> String {
        match self.wallet.public_key() {
            Some(pubkey) => format!("{}...", &pubkey.to_string()[..7]),
            None => "Connect Wallet".to_string(),
        }
    }

    fn owner(&self) -> Result<Pubkey, PageError> {
        match self.wallet.public_key() {
            Some(pubkey) => Ok(pubkey),
            None => reject(PageError::WalletNotConnected),
        }
    }

    fn mint(&self) -> Result<Pubkey, PageError> {
        match self.active_mint {
            Some(mint) => Ok(mint),
            None => reject(PageError::MintNotSet),
        }
    }

    /// Create a new mint with the wallet as mint and freeze authority.
    ///
    /// On success the new mint becomes the active mint.
    pub async fn handle_create_token(&mut self) -> Result<Option<Signature>, PageError> {
        let owner = self.owner()?;

        log::info!("Creating token...");

        let mint = Keypair::generate();
        let lamports = match self
            .submitter
            .connection()
            .get_minimum_balance_for_rent_exemption(spl_token::MINT_SIZE)
            .await
        {
            Ok(lamports) => lamports,
            Err(e) => {
                log::error!("Error fetching rent-exempt balance: {}", e);
                return Ok(None);
            }
        };

        let tx = assembled(create_mint_transaction(
            &owner,
            &mint.pubkey(),
            lamports,
            self.decimals,
        ))?;

        let signature = self.submitter.submit(&self.wallet, tx, &[&mint]).await;
        if signature.is_some() {
            log::info!("Token created: {}", mint.pubkey());
            self.active_mint = Some(mint.pubkey());
        }
        Ok(signature)
    }

    /// Send `transfer_amount` of the active mint to `recipient`, creating the
    /// recipient's token account if needed.
    pub async fn handle_transfer(&mut self) -> Result<Option<Signature>, PageError> {
        let owner = self.owner()?;
        let (amount, recipient) = match self.transfer_inputs() {
            Ok(inputs) => inputs,
            Err(e) => return reject(e),
        };
        let mint = self.mint()?;

        log::info!("Transferring tokens...");

        let tx = assembled(transfer_transaction(&owner, &recipient, &mint, amount))?;

        let signature = self.submitter.submit(&self.wallet, tx, &[]).await;
        if signature.is_some() {
            log::info!("Transfer completed");
        }
        Ok(signature)
    }

    fn transfer_inputs(&self) -> Result<(u64, Pubkey), PageError> {
        let amount = form::required("transfer amount", &self.form.transfer_amount)?;
        let recipient = form::required("recipient", &self.form.recipient)?;
        let recipient = form::parse_wallet_address("recipient", recipient)?;
        let amount = form::parse_amount("transfer amount", amount)?;
        Ok((amount, recipient))
    }

    /// Mint `mint_amount` of the active mint into the wallet's token account.
    pub async fn handle_mint(&mut self) -> Result<Option<Signature>, PageError> {
        let owner = self.owner()?;
        let amount = match form::required("mint amount", &self.form.mint_amount)
            .and_then(|v| form::parse_amount("mint amount", v))
        {
            Ok(amount) => amount,
            Err(e) => return reject(e),
        };
        let mint = self.mint()?;

        log::info!("Minting tokens...");

        let tx = assembled(mint_transaction(&owner, &mint, amount, self.decimals))?;

        let signature = self.submitter.submit(&self.wallet, tx, &[]).await;
        if signature.is_some() {
            log::info!("Minting completed");
        }
        Ok(signature)
    }

    /// Burn `burn_amount` of the active mint from the wallet's token account.
    pub async fn handle_burn(&mut self) -> Result<Option<Signature>, PageError> {
        let owner = self.owner()?;
        let amount = match form::required("burn amount", &self.form.burn_amount)
            .and_then(|v| form::parse_amount("burn amount", v))
        {
            Ok(amount) => amount,
            Err(e) => return reject(e),
        };
        let mint = self.mint()?;

        log::info!("Burning tokens...");

        let tx = assembled(burn_transaction(&owner, &mint, amount, self.decimals))?;

        let signature = self.submitter.submit(&self.wallet, tx, &[]).await;
        if signature.is_some() {
            log::info!("Burning completed");
        }
        Ok(signature)
    }

    /// Validate `delegate_address`. Delegation itself is not enabled: no
    /// approve instruction is built and nothing is submitted.
    pub async fn handle_delegate(&mut self) -> Result<Option<Signature>, PageError> {
        self.owner()?;
        let delegate = match form::required("delegate", &self.form.delegate_address)
            .and_then(|v| form::parse_wallet_address("delegate", v))
        {
            Ok(delegate) => delegate,
            Err(e) => return reject(e),
        };

        log::info!("Delegating tokens...");
        log::warn!(
            "Delegation to {} is not enabled; no transaction was submitted",
            delegate
        );
        Ok(None)
    }
}
