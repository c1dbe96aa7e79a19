//! kindstore CLI
//!
//! Inspect and maintain an on-disk kindstore directory.

use clap::{Parser, Subcommand};
use kindstore::wal::WalRecovery;
use kindstore::{Config, Direction, EngineBackend, ListOptions, Query, Store, StoreResult};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// kindstore CLI
#[derive(Parser, Debug)]
#[command(name = "kindstore-cli")]
#[command(about = "Inspect and maintain a kindstore data directory")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./kindstore_data")]
    data_dir: String,

    /// MemTable size limit in MB before flush
    #[arg(short = 'm', long, default_value = "64")]
    memtable_mb: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the write-ahead log without modifying it
    VerifyWal,

    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that need the store opened
#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Record count per kind
    Kinds,

    /// Print one record
    Get {
        kind: String,
        id: String,
    },

    /// Print the records of a kind
    List {
        kind: String,

        /// JSON query, e.g. '{"age": {"gte": 30}}'
        #[arg(short, long)]
        query: Option<String>,

        /// Field to sort by
        #[arg(short, long)]
        order_by: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        #[arg(long, default_value = "0")]
        offset: usize,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Count the records of a kind
    Count {
        kind: String,

        /// JSON query
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Delete one record
    Delete {
        kind: String,
        id: String,
    },

    /// Delete every record
    Clear,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kindstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .memtable_size_limit(args.memtable_mb * 1024 * 1024)
        .build();

    if let Err(e) = run(config, args.command).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config, command: Commands) -> StoreResult<()> {
    let command = match command {
        Commands::VerifyWal => return verify_wal(&config),
        Commands::Store(command) => command,
    };

    tracing::debug!("Opening {}", config.data_dir.display());
    let store = Store::open(config).await?;
    let result = execute(&store, command).await;
    store.close().await?;
    result
}

async fn execute(store: &Store<EngineBackend>, command: StoreCommand) -> StoreResult<()> {
    match command {
        StoreCommand::Kinds => {
            for (kind, count) in store.kinds().await? {
                println!("{kind}\t{count}");
            }
        }
        StoreCommand::Get { kind, id } => {
            print_json(&store.get_document(&kind, &id).await?);
        }
        StoreCommand::List {
            kind,
            query,
            order_by,
            desc,
            offset,
            limit,
        } => {
            let mut options = ListOptions::new().offset(offset);
            if let Some(limit) = limit {
                options = options.limit(limit);
            }
            if let Some(query) = query {
                options = options.query(Query::parse(&query)?);
            }
            if let Some(field) = order_by {
                let direction = if desc { Direction::Desc } else { Direction::Asc };
                options = options.order_by(field, direction);
            }

            let docs = store.list_documents(&kind, &options).await?;
            print_json(&Value::Array(docs));
        }
        StoreCommand::Count { kind, query } => {
            let query = query.as_deref().map(Query::parse).transpose()?;
            println!("{}", store.count_documents(&kind, query.as_ref()).await?);
        }
        StoreCommand::Delete { kind, id } => {
            store.delete_by_id(&kind, &id).await?;
            tracing::info!("Deleted {}_{}", kind, id);
        }
        StoreCommand::Clear => {
            store.clear().await?;
            tracing::info!("Cleared all records");
        }
    }
    Ok(())
}

fn verify_wal(config: &Config) -> StoreResult<()> {
    let path = config.wal_path();
    if !path.exists() {
        println!("no WAL at {}", path.display());
        return Ok(());
    }

    let result = WalRecovery::verify(&path)?;
    println!("entries:   {}", result.entries_recovered);
    println!("corrupted: {}", result.entries_corrupted);
    println!("last lsn:  {}", result.last_lsn);
    println!("torn tail: {}", result.was_truncated);
    Ok(())
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::error!("Failed to format output: {}", e),
    }
}
