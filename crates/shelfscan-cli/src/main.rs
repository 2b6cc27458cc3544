use clap::{Parser, Subcommand};

mod lookup;
mod market;

#[derive(Debug, Parser)]
#[command(name = "shelfscan-cli")]
#[command(about = "ShelfScan product resolution and price comparison")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract ranked identifier candidates from recognized text
    Extract {
        /// Raw text, e.g. OCR or barcode-reader output
        text: String,
    },
    /// Resolve recognized text to a canonical product via the lookup sources
    Resolve {
        /// Raw text containing a product identifier
        text: String,
    },
    /// Search retailers for a product and rank listings by price
    Compare {
        /// Product name to search for
        #[arg(long)]
        name: Option<String>,
        /// Brand, used for relevance gating
        #[arg(long)]
        brand: Option<String>,
        /// Identifier to resolve first; overrides --name/--brand
        #[arg(long)]
        identifier: Option<String>,
        /// Retailer key, repeatable (defaults to all registered)
        #[arg(long = "retailer")]
        retailers: Vec<String>,
        /// Maximum listings in the ranked output
        #[arg(long)]
        max_results: Option<usize>,
    },
    /// Analyze the price trend of one product history (JSON file)
    Trend {
        /// Path to a JSON array of price history entries
        history: String,
        /// Window in days
        #[arg(long, default_value = "30")]
        days: i64,
    },
    /// Rank products by price movement (JSON file of keyed histories)
    Trending {
        /// Path to a JSON object mapping product keys to history arrays
        histories: String,
        /// Window in days
        #[arg(long, default_value = "30")]
        days: i64,
        /// Rank biggest rises first instead of biggest drops
        #[arg(long)]
        rises: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract { text } => lookup::run_extract(&text),
        Commands::Resolve { text } => lookup::run_resolve(&text).await,
        Commands::Compare {
            name,
            brand,
            identifier,
            retailers,
            max_results,
        } => {
            market::run_compare(
                name.as_deref(),
                brand.as_deref(),
                identifier.as_deref(),
                retailers,
                max_results,
            )
            .await
        }
        Commands::Trend { history, days } => market::run_trend(&history, days),
        Commands::Trending {
            histories,
            days,
            rises,
        } => market::run_trending(&histories, days, rises),
    }
}
