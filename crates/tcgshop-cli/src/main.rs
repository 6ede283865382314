mod catalog;

use std::time::Duration;

use clap::{Parser, Subcommand};
use tcgshop_core::SortOrder;

#[derive(Debug, Parser)]
#[command(name = "tcgshop-cli")]
#[command(about = "TCG storefront catalog command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Page through the storefront catalog and print the normalized items
    Search {
        /// Free-text search term
        #[arg(long)]
        query: Option<String>,
        /// Comma-separated stock states (IN_STOCK, SOLD_OUT)
        #[arg(long, default_value = "IN_STOCK")]
        stock: String,
        /// name_asc, name_desc, price_asc or price_desc
        #[arg(long, default_value = "name_asc")]
        sort: SortOrder,
        /// Stop after this many pages
        #[arg(long, default_value_t = 1)]
        pages: usize,
        /// Minimum spacing between page requests, in milliseconds
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,
    },
    /// Print one product with all of its variations
    Product {
        id: String,
        #[arg(long, default_value = "IN_STOCK")]
        stock: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("tcgshop-cli: run with --help to list commands");
        return Ok(());
    };

    let config = tcgshop_core::load_app_config()?;
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Search {
            query,
            stock,
            sort,
            pages,
            interval_ms,
        } => {
            let options = catalog::SearchOptions {
                max_pages: pages,
                interval: Duration::from_millis(interval_ms),
            };
            catalog::run_search(&config, query, &stock, sort, options).await
        }
        Commands::Product { id, stock } => catalog::run_product(&config, &id, &stock).await,
    }
}
