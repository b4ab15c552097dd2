mod ingest;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "newsdb-cli")]
#[command(about = "newsdb feed ingestion and maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every configured feed once and store new items.
    Ingest {
        /// Feed list to use instead of `NEWSDB_FEEDS_PATH`.
        #[arg(long)]
        feeds: Option<PathBuf>,
        /// Fetch and normalize without writing to the database.
        #[arg(long)]
        dry_run: bool,
    },
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    Feeds {
        #[command(subcommand)]
        command: FeedsCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable.
    Ping,
    /// Apply pending migrations.
    Migrate,
}

#[derive(Debug, Subcommand)]
enum FeedsCommands {
    /// Print the configured feed sources.
    List {
        #[arg(long)]
        feeds: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("newsdb-cli: no command given (try --help)");
        return Ok(());
    };

    let config = newsdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Ingest { feeds, dry_run } => {
            ingest::run_ingest(&config, feeds.as_deref(), dry_run).await?;
        }
        Commands::Db { command } => run_db(&config, command).await?,
        Commands::Feeds {
            command: FeedsCommands::List { feeds },
        } => {
            let path = feeds.unwrap_or_else(|| config.feeds_path.clone());
            let file = newsdb_core::load_feeds(&path)?;
            for source in &file.feeds {
                println!(
                    "{}\t{}",
                    source.category.as_deref().unwrap_or("-"),
                    source.url
                );
            }
            println!("{} feed(s) in {}", file.feeds.len(), path.display());
        }
    }

    Ok(())
}

async fn run_db(config: &newsdb_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool_config = newsdb_db::PoolConfig::from_app_config(config);
    let pool = newsdb_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        DbCommands::Ping => {
            newsdb_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = newsdb_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }

    pool.close().await;
    Ok(())
}
