//! # CLI Interface
//!
//! Argument structure for `bos`, via `clap` derive. Global flags configure
//! the network client; each subcommand maps to one intent of
//! [`bos_protocol::TxClient`].

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use bos_protocol::config::{DEFAULT_BASE_FEE, DEFAULT_HORIZON_URL};
use bos_protocol::crypto::PublicKey;
use bos_protocol::transaction::{Amount, SequenceMode};
use bos_protocol::{ClientConfig, EnvelopeVersion};

/// Create, fund and pay accounts on a BOS network.
#[derive(Parser, Debug)]
#[command(
    name = "bos",
    about = "Create, fund and pay accounts on a BOS network",
    version,
    propagate_version = true
)]
pub struct BosCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Base URL of the network API.
    #[arg(long, global = true, env = "BOS_HORIZON", default_value = DEFAULT_HORIZON_URL)]
    pub horizon: String,

    /// Base fee per operation, in stroops.
    #[arg(long, global = true, env = "BOS_FEE", default_value_t = DEFAULT_BASE_FEE)]
    pub fee: u32,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, env = "BOS_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Envelope layout: legacy (pre-protocol-13 nodes) or v1.
    #[arg(long, global = true, env = "BOS_ENVELOPE", default_value = "legacy")]
    pub envelope: EnvelopeVersion,

    /// Last used sequence number of the source account.
    ///
    /// When given, no lookup is made and the transaction uses this value
    /// plus one. Pass the value the network reports, not the next one.
    #[arg(long, global = true)]
    pub sequence: Option<i64>,

    /// Log at debug level.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Log output format: pretty or json.
    #[arg(long, global = true, env = "BOS_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

impl GlobalArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.horizon.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_base_fee(self.fee)
            .with_envelope(self.envelope)
    }

    pub fn sequence_mode(&self) -> SequenceMode {
        SequenceMode::from_last_used(self.sequence)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create and fund a new account.
    CreateAccount(CreateAccountArgs),
    /// Create many accounts from a file of `ADDRESS,AMOUNT` lines.
    CreateAccounts(CreateAccountsArgs),
    /// Send native units to an existing account.
    Pay(PayArgs),
    /// Submit an inflation vote.
    Inflation(InflationArgs),
    /// Print the network's view of one or more accounts.
    CheckAccount(CheckAccountArgs),
}

#[derive(Args, Debug)]
pub struct CreateAccountArgs {
    /// Secret seed of the funding account.
    pub seed: String,

    /// Address of the account to create.
    #[arg(value_parser = PublicKey::from_address)]
    pub address: PublicKey,

    /// Starting balance, e.g. `20` or `0.5`.
    #[arg(value_parser = Amount::parse)]
    pub amount: Amount,
}

#[derive(Args, Debug)]
pub struct CreateAccountsArgs {
    /// Secret seed of the funding account.
    pub seed: String,

    /// File with one `ADDRESS,AMOUNT` per line. Blank lines and lines
    /// starting with `#` are skipped.
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct PayArgs {
    /// Secret seed of the sending account.
    pub seed: String,

    /// Address of the receiving account.
    #[arg(value_parser = PublicKey::from_address)]
    pub address: PublicKey,

    #[arg(value_parser = Amount::parse)]
    pub amount: Amount,
}

#[derive(Args, Debug)]
pub struct InflationArgs {
    /// Secret seed of the voting account.
    pub seed: String,
}

#[derive(Args, Debug)]
pub struct CheckAccountArgs {
    /// Addresses to look up.
    #[arg(required = true, value_parser = PublicKey::from_address)]
    pub addresses: Vec<PublicKey>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const ADDRESS: &str = "GDFQVQCYYB7GKCGSCUSIQYXTPLV5YJ3XWDMWGQMDNM4EAXAL7LITIBQ7";

    #[test]
    fn verify_cli_structure() {
        BosCli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = BosCli::try_parse_from([
            "bos",
            "pay",
            "SEED",
            ADDRESS,
            "10.5",
            "--sequence",
            "41",
            "--fee",
            "100",
        ])
        .unwrap();

        assert_eq!(cli.global.sequence, Some(41));
        assert_eq!(cli.global.client_config().base_fee, 100);
        match cli.command {
            Commands::Pay(args) => assert_eq!(args.amount.stroops(), 105_000_000),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bad_address_and_amount_fail_at_parse_time() {
        assert!(BosCli::try_parse_from(["bos", "pay", "SEED", "GBAD", "1"]).is_err());
        assert!(BosCli::try_parse_from(["bos", "pay", "SEED", ADDRESS, "-1"]).is_err());
        assert!(BosCli::try_parse_from(["bos", "check-account"]).is_err());
    }

    #[test]
    fn no_sequence_means_auto() {
        let cli = BosCli::try_parse_from(["bos", "inflation", "SEED"]).unwrap();
        assert_eq!(cli.global.sequence_mode(), SequenceMode::Auto);
        assert_eq!(cli.global.client_config().envelope, EnvelopeVersion::Legacy);
    }

    #[test]
    fn envelope_flag_selects_v1() {
        let cli =
            BosCli::try_parse_from(["bos", "inflation", "SEED", "--envelope", "v1"]).unwrap();
        assert_eq!(cli.global.client_config().envelope, EnvelopeVersion::V1);
        assert!(BosCli::try_parse_from(["bos", "inflation", "SEED", "--envelope", "v9"]).is_err());
    }
}
