//! geomirror command-line entry point
//!
//! Two modes: `run` walks an edition catalog once and exits, `serve` exposes
//! the on-demand update API until a termination signal arrives.

use clap::{Parser, Subcommand};
use geomirror::runner::EditionResult;
use geomirror::{BatchRunner, Catalog, Config, GeoUpdater, Result, S3Store};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "geomirror",
    about = "Mirrors versioned GeoIP editions into S3-compatible object storage",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Update every edition in a catalog file, then exit
    Run {
        /// Path to the catalog JSON file (labeled {id, format} entries)
        #[arg(long, value_name = "PATH", default_value = "products.json")]
        products: PathBuf,

        /// Republish even when the mirrored version already matches
        #[arg(long)]
        force: bool,
    },
    /// Serve the on-demand update API
    Serve {
        /// Address to bind to (overrides the configured bind address)
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.verbose = config.verbose || cli.verbose;
    init_tracing(config.verbose);

    let store = Arc::new(S3Store::new(&config.storage));
    let updater = GeoUpdater::new(&config, store);

    let cancel = CancellationToken::new();
    tokio::spawn(geomirror::cancel_on_signal(cancel.clone()));

    match cli.command {
        Command::Run { products, force } => run_batch(updater, &products, force, &cancel).await,
        Command::Serve { bind } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.api.bind_address = bind;
            }
            geomirror::api::start_api_server(Arc::new(updater), Arc::new(config), cancel).await
        }
    }
}

async fn run_batch(
    updater: GeoUpdater,
    products: &PathBuf,
    force: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let catalog = Catalog::load(products).await?;
    let summary = BatchRunner::new(updater).run(&catalog, force, cancel).await?;

    for (edition, result) in &summary.results {
        match result {
            EditionResult::Ok(outcome) if outcome.updated() => {
                println!("{edition}: updated to {}", outcome.version());
            }
            EditionResult::Ok(outcome) => {
                println!("{edition}: up to date ({})", outcome.version());
            }
            EditionResult::Failed(message) => {
                eprintln!("{edition}: FAILED - {message}");
            }
        }
    }
    println!(
        "{} updated, {} up to date, {} failed",
        summary.updated(),
        summary.up_to_date(),
        summary.failed().len()
    );

    // A failing edition is reported above but does not fail the run; the next
    // scheduled invocation picks it up again.
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "geomirror=debug"
    } else {
        "geomirror=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
