//! nftscout command-line entry point

use clap::{Parser, Subcommand};
use nftscout::enrich::enrich_tokens;
use nftscout::errors::{DataError, InputError, NftScoutError, RpcError};
use nftscout::fetch::{resolve_tokens, TokenSelector};
use nftscout::logger::{self, LogLevel, LogTag};
use nftscout::paperhands::run_paperhands;
use nftscout::prices::PriceMethod;
use nftscout::rarity::rank_by_rarity;
use nftscout::rpc::init_rpc;
use nftscout::storage::{load_records, write_records};
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "nftscout", version, about = "Solana NFT enrichment toolkit")]
struct Cli {
    /// RPC endpoint (defaults to NFTSCOUT_RPC_URL or mainnet-beta)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Show per-record diagnostics
    #[arg(long, global = true)]
    verbose: bool,

    /// Show errors only
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and enrich NFTs selected by exactly one of the selectors
    Fetch {
        /// All NFTs currently held by this wallet
        #[arg(long)]
        owner: Option<String>,
        /// All NFTs whose first verified creator is this address
        #[arg(long)]
        creator: Option<String>,
        /// A single NFT by its mint
        #[arg(long)]
        mint: Option<String>,
        /// All NFTs controlled by this update authority
        #[arg(long = "update-authority")]
        update_authority: Option<String>,
        /// Output directory for the enriched records
        #[arg(long, default_value = "nfts")]
        out: PathBuf,
    },
    /// Replay an address's marketplace history and compute paper/diamond hands
    Paperhands {
        /// Wallet whose trade history to replay
        #[arg(long)]
        address: String,
        /// Reference statistic for the paper/diamond deltas
        #[arg(long, value_enum, default_value_t = PriceMethod::Median)]
        price_method: PriceMethod,
        /// Output directory for the position records
        #[arg(long, default_value = "paperhands")]
        out: PathBuf,
    },
    /// Rank previously fetched records by statistical rarity
    Rarity {
        /// Directory of nft-*.json records from a fetch run
        #[arg(long, default_value = "nfts")]
        dir: PathBuf,
        /// How many of the rarest records to print
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn parse_selector_key(
    value: Option<String>,
    what: &str,
) -> Result<Option<Pubkey>, NftScoutError> {
    match value {
        Some(v) => Pubkey::from_str(&v).map(Some).map_err(|e| {
            NftScoutError::from(InputError::InvalidPubkey {
                value: format!("{} '{}'", what, v),
                reason: e.to_string(),
            })
        }),
        None => Ok(None),
    }
}

async fn run_fetch(
    owner: Option<String>,
    creator: Option<String>,
    mint: Option<String>,
    update_authority: Option<String>,
    out: PathBuf,
) -> Result<(), NftScoutError> {
    let selector = TokenSelector::from_options(
        parse_selector_key(owner, "owner")?,
        parse_selector_key(creator, "creator")?,
        parse_selector_key(mint, "mint")?,
        parse_selector_key(update_authority, "update authority")?,
    )?;
    let tokens = resolve_tokens(selector).await?;
    let enriched = enrich_tokens(tokens).await;
    let written = write_records(&out, &enriched).await.map_err(|e| {
        NftScoutError::from(DataError::Malformed {
            what: "record storage".to_string(),
            reason: e,
        })
    })?;
    println!("{} records written to {}", written, out.display());
    Ok(())
}

async fn run_paperhands_command(
    address: String,
    price_method: PriceMethod,
    out: PathBuf,
) -> Result<(), NftScoutError> {
    let address = Pubkey::from_str(&address).map_err(|e| {
        NftScoutError::from(InputError::InvalidPubkey {
            value: address.clone(),
            reason: e.to_string(),
        })
    })?;
    let ledger = run_paperhands(&address, price_method).await.map_err(|e| {
        NftScoutError::from(RpcError::Request {
            method: "history replay".to_string(),
            reason: e,
        })
    })?;

    let written = write_records(&out, &ledger.positions).await.map_err(|e| {
        NftScoutError::from(DataError::Malformed {
            what: "record storage".to_string(),
            reason: e,
        })
    })?;
    println!("spent:   {:.4} SOL", ledger.spent);
    println!("earned:  {:.4} SOL", ledger.earned);
    println!("profit:  {:.4} SOL", ledger.profit());
    println!("held:    {} NFTs", ledger.inventory.len());
    println!("{} records written to {}", written, out.display());
    Ok(())
}

async fn run_rarity(dir: PathBuf, top: usize) -> Result<(), NftScoutError> {
    let records = load_records(&dir).await.map_err(|e| {
        NftScoutError::from(DataError::Missing {
            what: format!("record directory: {}", e),
        })
    })?;
    let ranked = rank_by_rarity(records);
    for record in ranked.iter().take(top) {
        println!(
            "#{:<4} {} score {:.2}",
            record["rarity_rank"],
            record["mint"].as_str().unwrap_or("<unknown mint>"),
            record["total_score"].as_f64().unwrap_or(0.0),
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else if cli.quiet {
        LogLevel::Error
    } else {
        LogLevel::Info
    };
    logger::init(level);

    if let Some(url) = &cli.rpc_url {
        init_rpc(url);
    }

    let result = match cli.command {
        Command::Fetch {
            owner,
            creator,
            mint,
            update_authority,
            out,
        } => run_fetch(owner, creator, mint, update_authority, out).await,
        Command::Paperhands {
            address,
            price_method,
            out,
        } => run_paperhands_command(address, price_method, out).await,
        Command::Rarity { dir, top } => run_rarity(dir, top).await,
    };

    if let Err(e) = result {
        logger::error(LogTag::System, &e.to_string());
        if e.is_fatal() {
            std::process::exit(2);
        }
    }
}
