use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::*;
use log::{error, info};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde_json::json;

use obscura_ringct::blockchain::assembler::GroupingPolicy;
use obscura_ringct::utils::init_logging;
use obscura_ringct::wallet::{construct_transaction, scan_transaction, AccountKeys, Destination};
use obscura_ringct::{
    RctConfig, RctError, RctResult, RangeProofEngine, Transaction, TransactionProofValidator,
};

#[derive(Parser)]
#[clap(author, version, about)]
/// Build, verify and inspect bulletproof range-proofed transactions
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Log level, overrides the configured one
    #[clap(short, long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a transaction paying each amount to a fresh account
    Prove {
        /// Comma-separated output amounts
        #[clap(short, long, value_delimiter = ',', required = true)]
        amounts: Vec<u64>,

        /// `aggregated`, `per-output`, or comma-separated group sizes
        #[clap(short, long)]
        grouping: Option<String>,

        /// Seed for reproducible output
        #[clap(short, long)]
        seed: Option<u64>,
    },

    /// Validate the range proofs of a hex-encoded transaction
    Verify {
        /// Hex-encoded transaction
        tx: String,
    },

    /// Print the structure of a hex-encoded transaction as JSON
    #[clap(alias = "show")]
    Inspect {
        /// Hex-encoded transaction
        tx: String,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match RctConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return ExitCode::from(2);
        }
    };
    init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level));

    match run(&cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run(command: &Commands, config: &RctConfig) -> RctResult<ExitCode> {
    let engine = RangeProofEngine::new(config.range_bits, config.max_aggregation)?;

    match command {
        Commands::Prove {
            amounts,
            grouping,
            seed,
        } => {
            let policy = match grouping {
                Some(text) => parse_grouping(text)?,
                None => config.default_grouping.clone(),
            };
            prove(amounts, &policy, &engine, *seed)
        }
        Commands::Verify { tx } => {
            let tx = decode_tx(tx)?;
            let validator = TransactionProofValidator::new(engine, config.verification_threads)?;
            let verdict = validator.verdict(&tx);
            if verdict.is_accept() {
                println!("{}", verdict.to_string().green().bold());
                Ok(ExitCode::SUCCESS)
            } else {
                println!("{}", verdict.to_string().red().bold());
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Inspect { tx } => {
            let tx = decode_tx(tx)?;
            inspect(&tx, &engine)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn prove(
    amounts: &[u64],
    policy: &GroupingPolicy,
    engine: &RangeProofEngine,
    seed: Option<u64>,
) -> RctResult<ExitCode> {
    let mut rng = match seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };

    let accounts: Vec<AccountKeys> = amounts.iter().map(|_| AccountKeys::generate(&mut rng)).collect();
    let destinations: Vec<Destination> = accounts
        .iter()
        .zip(amounts)
        .map(|(account, &amount)| Destination {
            address: account.address(),
            amount,
        })
        .collect();

    let (tx, _) = construct_transaction(&destinations, policy, engine, &mut rng)?;
    info!("Built transaction {}", hex::encode(tx.hash()));

    // Each recipient must recover exactly its own output
    for (index, account) in accounts.iter().enumerate() {
        let owned = scan_transaction(&tx, &account.spend.public, &account.decoder())?;
        if owned.len() != 1 || owned[0].index != index {
            return Err(RctError::CryptographicFailure(format!(
                "recipient {} could not recover its output",
                index
            )));
        }
    }

    println!("{} {}", "hash:".bold(), hex::encode(tx.hash()));
    println!("{} {}", "proofs:".bold(), tx.rct_signatures.payload.range_proofs.len());
    println!("{}", hex::encode(tx.to_bytes()));
    Ok(ExitCode::SUCCESS)
}

fn inspect(tx: &Transaction, engine: &RangeProofEngine) -> RctResult<()> {
    let payload = &tx.rct_signatures.payload;
    let proofs: Vec<_> = payload
        .range_proofs
        .iter()
        .map(|proof| {
            json!({
                "rounds": proof.rounds(),
                "amounts": engine.amount_count(proof),
                "size": proof.serialized_size(),
            })
        })
        .collect();

    let summary = json!({
        "hash": hex::encode(tx.hash()),
        "version": tx.version,
        "rct_type": tx.rct_signatures.rct_type,
        "outputs": tx.outputs.len(),
        "commitments": payload.commitments.iter().map(|c| hex::encode(c.to_bytes())).collect::<Vec<_>>(),
        "range_proofs": proofs,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn decode_tx(text: &str) -> RctResult<Transaction> {
    Transaction::from_bytes(&hex::decode(text.trim())?)
}

fn parse_grouping(text: &str) -> RctResult<GroupingPolicy> {
    match text {
        "aggregated" => Ok(GroupingPolicy::Aggregated),
        "per-output" => Ok(GroupingPolicy::PerOutput),
        _ => text
            .split(',')
            .map(|size| {
                size.trim()
                    .parse::<usize>()
                    .map_err(|_| RctError::InvalidInputSize(format!("bad group size '{}'", size)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(GroupingPolicy::Explicit),
    }
}
