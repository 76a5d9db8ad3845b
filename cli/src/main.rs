// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # bos
//!
//! Command-line front end for `bos-protocol`. Parses arguments, sets up
//! logging, and runs one intent against the configured network:
//!
//! - `create-account`  create and fund one account
//! - `create-accounts` create many accounts from a file, 100 per transaction
//! - `pay`             send native units and report both balance changes
//! - `inflation`       submit an inflation vote
//! - `check-account`   print the network's view of accounts

mod cli;
mod logging;
mod report;

use anyhow::{bail, Context, Result};
use clap::Parser;

use bos_protocol::bulk::Funding;
use bos_protocol::horizon::{Horizon, HorizonClient};
use bos_protocol::transaction::Asset;
use bos_protocol::{AccountIdentity, Error, TxClient};

use cli::{BosCli, Commands};
use logging::LogFormat;
use report::BalanceChange;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = BosCli::parse();
    logging::init_logging(
        logging::default_directives(cli.global.verbose),
        LogFormat::from_str_lossy(&cli.global.log_format),
    );

    let config = cli.global.client_config();
    let client = TxClient::from_config(&config)
        .with_context(|| format!("invalid client configuration for {}", config.horizon_url))?;

    match cli.command {
        Commands::CreateAccount(args) => create_account(&client, &cli.global, args).await,
        Commands::CreateAccounts(args) => create_accounts(&client, &cli.global, args).await,
        Commands::Pay(args) => pay(&client, &cli.global, args).await,
        Commands::Inflation(args) => inflation(&client, &cli.global, args).await,
        Commands::CheckAccount(args) => check_accounts(&client, args).await,
    }
}

fn identity(seed: &str) -> Result<AccountIdentity> {
    AccountIdentity::from_secret_seed(seed).context("invalid secret seed")
}

async fn create_account(
    client: &TxClient<HorizonClient>,
    global: &cli::GlobalArgs,
    args: cli::CreateAccountArgs,
) -> Result<()> {
    let source = identity(&args.seed)?;
    if client.horizon().account_exists(&args.address).await? {
        bail!("account {} already exists", args.address);
    }

    let accepted = client
        .create_account(&source, &args.address, args.amount, global.sequence_mode())
        .await
        .with_context(|| format!("failed to create account {}", args.address))?;

    tracing::info!(ledger = accepted.ledger, hash = %accepted.hash, "account created");
    println!("account {} created with {}", args.address, args.amount);
    Ok(())
}

async fn create_accounts(
    client: &TxClient<HorizonClient>,
    global: &cli::GlobalArgs,
    args: cli::CreateAccountsArgs,
) -> Result<()> {
    let source = identity(&args.seed)?;
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let fundings = parse_fundings(&text)
        .with_context(|| format!("invalid destination file {}", args.file.display()))?;

    let outcomes = client
        .create_accounts_bulk(&source, &fundings, global.sequence_mode())
        .await?;

    let mut failed = 0;
    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            tracing::error!(batch = outcome.index, error = %e, "batch failed");
            failed += 1;
        }
        for line in report::outcome_lines(outcome) {
            println!("{line}");
        }
    }

    if failed > 0 {
        bail!("{failed} of {} transactions failed", outcomes.len());
    }
    Ok(())
}

/// Parses `ADDRESS,AMOUNT` lines. Blank lines and `#` comments are skipped.
fn parse_fundings(text: &str) -> Result<Vec<Funding>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            line.parse::<Funding>()
                .with_context(|| format!("line {}", n + 1))
        })
        .collect()
}

async fn pay(
    client: &TxClient<HorizonClient>,
    global: &cli::GlobalArgs,
    args: cli::PayArgs,
) -> Result<()> {
    let source = identity(&args.seed)?;
    let sender = *source.public_key();
    let receiver = args.address;

    let sender_before = client
        .native_balance(&sender)
        .await
        .context("sender account unavailable")?;
    let receiver_before = client
        .native_balance(&receiver)
        .await
        .context("receiver account unavailable")?;

    client
        .pay(
            &source,
            &receiver,
            args.amount,
            Asset::Native,
            global.sequence_mode(),
        )
        .await
        .context("payment failed")?;

    let sender_after = client.native_balance(&sender).await?;
    let receiver_after = client.native_balance(&receiver).await?;

    println!(
        "{}",
        report::payment_report(
            args.amount,
            &sender,
            &receiver,
            BalanceChange::new(sender_before, sender_after),
            BalanceChange::new(receiver_before, receiver_after),
        )
    );
    Ok(())
}

async fn inflation(
    client: &TxClient<HorizonClient>,
    global: &cli::GlobalArgs,
    args: cli::InflationArgs,
) -> Result<()> {
    let source = identity(&args.seed)?;
    let accepted = client
        .inflation_vote(&source, global.sequence_mode())
        .await
        .context("inflation vote failed")?;
    println!("inflation submitted in ledger {} ({})", accepted.ledger, accepted.hash);
    Ok(())
}

async fn check_accounts(
    client: &TxClient<HorizonClient>,
    args: cli::CheckAccountArgs,
) -> Result<()> {
    let mut missing = 0;
    for address in &args.addresses {
        match client.horizon().account(address).await {
            Ok(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            Err(Error::AccountNotFound { .. }) => {
                println!("{address}: does not exist");
                missing += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("failed to look up {address}")),
        }
    }

    if missing > 0 {
        bail!("{missing} of {} accounts do not exist", args.addresses.len());
    }
    Ok(())
}
