//! `kwitter` - command-line front end for a locally persisted ledger.
//!
//! # Usage
//!
//! ```text
//! kwitter init --owner deployer                 # create the ledger
//! kwitter post --from alice "hello world"       # pays the post price
//! kwitter vote --from bob 1                     # pays the vote price
//! kwitter feed --viewer bob --sort most-voted
//! kwitter feed --viewer bob --account alice     # alice's profile
//! kwitter delete --from deployer 1              # owner only
//! kwitter withdraw --from deployer              # owner only
//! kwitter info
//! ```
//!
//! Identities are `0x`-prefixed hex addresses or seed names; a seed name
//! always maps to the same address.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use kwitter::feed::{Feed, FeedAssembler, FeedConfig, FeedError, SortBy};
use kwitter::fees::{format_ether, Amount, FeePolicy, WEI_PER_ETHER};
use kwitter::identity::Address;
use kwitter::ledger::{remaining_bytes, EntryId, Ledger, LedgerError, SharedLedger, Slot};
use kwitter::storage::{KwitterStore, StoreError};
use thiserror::Error;
use tracing::{debug, info};

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "kwitter", version, about = "Pay-to-post social feed ledger")]
struct Cli {
    /// Ledger database directory.
    #[arg(long, global = true, env = "KWITTER_DB", default_value = "kwitter-db")]
    db: PathBuf,

    /// Log level filter, used when RUST_LOG is not set.
    #[arg(long, global = true, env = "KWITTER_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new ledger.
    Init {
        /// Owner identity (address or seed name).
        #[arg(long, value_parser = parse_identity)]
        owner: Address,

        /// Price to post, in wei or with an `eth` suffix.
        #[arg(long, value_parser = parse_amount)]
        post_price: Option<Amount>,

        /// Price to vote, in wei or with an `eth` suffix.
        #[arg(long, value_parser = parse_amount)]
        vote_price: Option<Amount>,

        /// Share of the balance paid out by `withdraw`.
        #[arg(long)]
        withdraw_percent: Option<u8>,
    },

    /// Publish an entry.
    Post {
        #[arg(long, value_parser = parse_identity)]
        from: Address,

        /// Payment (defaults to the post price).
        #[arg(long, value_parser = parse_amount)]
        pay: Option<Amount>,

        /// Entry text (1 to 256 bytes after trimming).
        content: String,
    },

    /// Vote on an entry.
    Vote {
        #[arg(long, value_parser = parse_identity)]
        from: Address,

        /// Payment (defaults to the vote price).
        #[arg(long, value_parser = parse_amount)]
        pay: Option<Amount>,

        id: u64,
    },

    /// Tombstone an entry (owner only).
    Delete {
        #[arg(long, value_parser = parse_identity)]
        from: Address,

        id: u64,
    },

    /// Withdraw collected fees (owner only).
    Withdraw {
        #[arg(long, value_parser = parse_identity)]
        from: Address,
    },

    /// Show a feed.
    Feed {
        /// Whose point of view (controls the "voted" markers).
        #[arg(long, value_parser = parse_identity)]
        viewer: Address,

        /// `newest` or `most-voted`.
        #[arg(long, default_value = "newest")]
        sort: SortBy,

        /// Only show this account's entries.
        #[arg(long, value_parser = parse_identity)]
        account: Option<Address>,
    },

    /// Show a single entry.
    Show { id: u64 },

    /// Show ledger configuration and statistics.
    Info,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("no ledger at {0}; run `kwitter init` first")]
    NotInitialized(PathBuf),

    #[error("a ledger already exists at {0}")]
    AlreadyInitialized(PathBuf),
}

fn parse_identity(s: &str) -> Result<Address, String> {
    if s.trim().is_empty() {
        return Err("identity cannot be empty".to_string());
    }
    Address::resolve(s).map_err(|e| format!("invalid address '{}': {}", s, e))
}

/// Parse `1000` (wei) or `0.01eth`
fn parse_amount(s: &str) -> Result<Amount, String> {
    let s = s.trim();
    let Some(ether) = s.strip_suffix("eth") else {
        return s.parse::<Amount>().map_err(|e| format!("invalid amount '{}': {}", s, e));
    };

    let (whole, frac) = ether.split_once('.').unwrap_or((ether, ""));
    if frac.len() > 18 {
        return Err(format!("too many decimals in '{}'", s));
    }
    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|e| format!("invalid amount '{}': {}", s, e))?
    };
    let frac: Amount = if frac.is_empty() {
        0
    } else {
        format!("{:0<18}", frac)
            .parse()
            .map_err(|e| format!("invalid amount '{}': {}", s, e))?
    };

    whole
        .checked_mul(WEI_PER_ETHER)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| format!("amount '{}' is too large", s))
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_tracing(&cli.log_level);

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the given level.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let store = KwitterStore::open(&cli.db)?;

    if let Commands::Init {
        owner,
        post_price,
        vote_price,
        withdraw_percent,
    } = cli.command
    {
        if store.has_ledger()? {
            return Err(CliError::AlreadyInitialized(cli.db));
        }
        let mut fees = FeePolicy::default();
        if let Some(price) = post_price {
            fees = fees.with_post_price(price);
        }
        if let Some(price) = vote_price {
            fees = fees.with_vote_price(price);
        }
        if let Some(percent) = withdraw_percent {
            fees = fees.with_withdraw_percent(percent);
        }
        let ledger = Ledger::new(owner, fees)?;
        store.save_ledger(&ledger)?;
        store.flush()?;
        info!(db = %cli.db.display(), owner = %owner, "ledger created");
        println!("ledger created, owner {}", owner);
        return Ok(());
    }

    let ledger = store
        .load_ledger()?
        .ok_or_else(|| CliError::NotInitialized(cli.db.clone()))?;
    let shared = SharedLedger::new(ledger);

    let mutated = execute(&shared, cli.command).await?;
    if mutated {
        store.save_ledger(&shared.snapshot().await)?;
        store.flush()?;
        debug!(db = %cli.db.display(), "ledger saved");
    }
    Ok(())
}

/// Run a command against the ledger; returns whether state changed
async fn execute(shared: &SharedLedger, command: Commands) -> Result<bool, CliError> {
    let ledger = shared.snapshot().await;

    match command {
        Commands::Init { .. } => Ok(false),
        Commands::Post { from, pay, content } => {
            let content = content.trim();
            let remaining = remaining_bytes(content.as_bytes());
            if remaining < 0 {
                println!("content is {} bytes over the limit", -remaining);
            }
            let payment = pay.unwrap_or(ledger.post_price());
            let id = shared.create_entry(content, payment, from, now()).await?;
            println!("posted entry {}", id);
            Ok(true)
        }
        Commands::Vote { from, pay, id } => {
            let payment = pay.unwrap_or(ledger.vote_price());
            shared.vote(EntryId::new(id), payment, from).await?;
            println!("voted on entry {}", id);
            Ok(true)
        }
        Commands::Delete { from, id } => {
            if shared.delete_entry(EntryId::new(id), &from).await? {
                println!("entry {} deleted", id);
                Ok(true)
            } else {
                println!("entry {} does not exist or is already deleted", id);
                Ok(false)
            }
        }
        Commands::Withdraw { from } => {
            let split = shared.withdraw(&from).await?;
            println!(
                "withdrew {} eth to {}, {} eth retained",
                format_ether(split.payout),
                from,
                format_ether(split.retained)
            );
            Ok(true)
        }
        Commands::Feed {
            viewer,
            sort,
            account,
        } => {
            let assembler = FeedAssembler::new(FeedConfig::default())?;
            match account {
                Some(account) => {
                    let profile = assembler
                        .account_profile(shared, &viewer, &account, sort)
                        .await?;
                    println!("{}", profile.account);
                    if profile.is_owner {
                        println!("  this account belongs to the ledger owner");
                    }
                    if profile.account == viewer {
                        println!("  this is you");
                    }
                    if let Some(first) = profile.first_entry_at {
                        println!("  posting since {}", format_timestamp(first));
                    }
                    print_feed(&profile.feed, &viewer, ledger.owner());
                }
                None => {
                    let feed = assembler
                        .fetch_ordered_entries(shared, &viewer, sort, None)
                        .await?;
                    print_feed(&feed, &viewer, ledger.owner());
                }
            }
            Ok(false)
        }
        Commands::Show { id } => {
            match ledger.get_entry(EntryId::new(id)) {
                Slot::Present(entry) => {
                    println!("id:        {}", entry.id());
                    println!("author:    {}", entry.author());
                    println!("content:   {}", entry.content_str());
                    println!("votes:     {}", entry.vote_count());
                    println!("timestamp: {}", format_timestamp(entry.timestamp()));
                }
                Slot::Tombstoned => println!("id:        0 (deleted or never created)"),
            }
            Ok(false)
        }
        Commands::Info => {
            let stats = ledger.statistics();
            println!("owner:            {}", ledger.owner());
            println!("post price:       {} eth", format_ether(ledger.post_price()));
            println!("vote price:       {} eth", format_ether(ledger.vote_price()));
            println!("withdraw share:   {}%", ledger.fee_policy().withdraw_percent);
            println!("total entries:    {}", stats.total_entries);
            println!("live entries:     {}", stats.live_entries);
            println!("deleted entries:  {}", stats.tombstoned_entries);
            println!("total votes:      {}", stats.total_votes);
            println!("authors:          {}", stats.unique_authors);
            println!("balance:          {} eth", format_ether(stats.balance));
            println!("total withdrawn:  {} eth", format_ether(stats.total_withdrawn));
            Ok(false)
        }
    }
}

fn print_feed(feed: &Feed, viewer: &Address, owner: &Address) {
    if feed.is_empty() {
        println!("(no entries)");
    }
    for entry in &feed.entries {
        let votes = if entry.vote_count == 1 { "vote" } else { "votes" };
        let marker = if entry.has_voted {
            " [voted]"
        } else if !entry.can_vote(viewer) {
            " [yours]"
        } else {
            ""
        };
        let badge = if &entry.author == owner { " (owner)" } else { "" };
        println!(
            "#{} {}{}  {}  {} {}{}",
            entry.id,
            entry.author.short(),
            badge,
            format_timestamp(entry.timestamp),
            entry.vote_count,
            votes,
            marker
        );
        println!("    {}", entry.content_str());
    }
    for failure in &feed.failures {
        println!("#{} unavailable: {}", failure.id, failure.error);
    }
}

fn now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

fn format_timestamp(ts: u64) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}
