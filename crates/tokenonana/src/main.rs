use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sol_rpc::{CommitmentLevel, RpcClient};
use tokenonana::{Config, Submitter, TokenPage, WalletContext};
use wallet_adapter::LocalWallet;

#[derive(Parser, Debug)]
#[command(author, version, about = "Create, transfer, mint, and burn SPL tokens on devnet")]
struct Cli {
    /// Config file. Defaults to the platform config dir when present.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Wallet keypair file in `solana-keygen` JSON format.
    #[arg(short, long, value_name = "PATH", conflicts_with = "mnemonic_env")]
    keypair: Option<PathBuf>,

    /// Name of an environment variable holding a BIP-39 phrase to derive the wallet from.
    #[arg(long, value_name = "VAR")]
    mnemonic_env: Option<String>,

    /// Account index for mnemonic derivation.
    #[arg(long, default_value_t = 0)]
    account: u32,

    /// RPC URL, overriding config and environment.
    #[arg(short, long)]
    url: Option<String>,

    /// Mint to operate on.
    #[arg(long)]
    mint: Option<String>,

    /// Commitment to wait for after sending.
    #[arg(long)]
    commitment: Option<CommitmentLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the connected wallet's address.
    Address,
    /// Create a new mint owned by the wallet.
    CreateToken,
    /// Send tokens of the active mint to another wallet.
    Transfer {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        recipient: String,
    },
    /// Mint tokens of the active mint into the wallet.
    Mint {
        #[arg(long)]
        amount: String,
    },
    /// Burn tokens of the active mint from the wallet.
    Burn {
        #[arg(long)]
        amount: String,
    },
    /// Validate a delegate address. Delegation is not enabled.
    Delegate {
        #[arg(long)]
        address: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let wallet = connect_wallet(&cli, &config)?;

    let client = RpcClient::new(config.endpoint(), config.commitment)?;
    log::debug!("Waiting for {} commitment", client.commitment());

    let submitter = Submitter::new(client, config.commitment, config.confirm_options());
    let mut page =
        TokenPage::new(wallet, submitter, config.decimals).with_mint(config.mint_pubkey()?);

    let signature = match cli.command {
        Command::Address => {
            println!("{}", page.account_label());
            return Ok(());
        }
        Command::CreateToken => page.handle_create_token().await?,
        Command::Transfer { amount, recipient } => {
            page.form.transfer_amount = amount;
            page.form.recipient = recipient;
            page.handle_transfer().await?
        }
        Command::Mint { amount } => {
            page.form.mint_amount = amount;
            page.handle_mint().await?
        }
        Command::Burn { amount } => {
            page.form.burn_amount = amount;
            page.handle_burn().await?
        }
        Command::Delegate { address } => {
            page.form.delegate_address = address;
            page.handle_delegate().await?;
            return Ok(());
        }
    };

    let Some(signature) = signature else {
        bail!("transaction was not confirmed");
    };
    println!("Signature: {signature}");
    if let Some(mint) = page.active_mint() {
        println!("Mint: {mint}");
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = &cli.url {
        config.rpc_url = url.clone();
    }
    if let Some(mint) = &cli.mint {
        config.mint = Some(mint.clone());
    }
    if let Some(commitment) = cli.commitment {
        config.commitment = commitment;
    }
    if cli.keypair.is_some() {
        config.keypair = cli.keypair.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Flags first, then the configured keypair, then the Solana CLI default.
/// With none of those the page runs disconnected.
fn connect_wallet(cli: &Cli, config: &Config) -> Result<WalletContext> {
    if let Some(var) = &cli.mnemonic_env {
        let phrase = std::env::var(var)
            .map(SecretString::from)
            .with_context(|| format!("{var} is not set"))?;
        let passphrase = SecretString::from(String::new());
        let wallet = LocalWallet::from_mnemonic(&phrase, &passphrase, cli.account)?;
        return Ok(WalletContext::connected(Arc::new(wallet)));
    }

    let path = match &config.keypair {
        Some(path) => Some(path.clone()),
        None => Config::default_keypair_path().filter(|path| path.exists()),
    };

    match path {
        Some(path) => {
            let wallet = LocalWallet::from_keypair_file(&path)?;
            Ok(WalletContext::connected(Arc::new(wallet)))
        }
        None => {
            log::warn!("No wallet keypair found; running disconnected");
            Ok(WalletContext::disconnected())
        }
    }
}
