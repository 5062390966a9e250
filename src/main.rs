//! product-analyzer command-line entry point.
//!
//! Submits one product (URL or label photograph) to the analysis service,
//! saves the result to the local history and prints it.
//!
//! ```text
//! product-analyzer analyze <url> [--name <product name>]
//! product-analyzer analyze --image <path> [--name <product name>]
//! product-analyzer history
//! product-analyzer delete <timestamp>
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use product_analyzer::client::HttpTransport;
use product_analyzer::config::AnalyzerConfig;
use product_analyzer::domain::{
    AnalysisRecord, EventBus, ImageUpload, InputMode, PreviewRegistry, RequestInput,
};
use product_analyzer::persistence::{JsonFileStore, LocalAnalysisStore};
use product_analyzer::service::AnalysisRequestController;

/// Product analysis client with a local history.
#[derive(Parser, Debug)]
#[command(name = "product-analyzer", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a product and save the result to the history
    Analyze {
        #[command(flatten)]
        target: Target,
        /// Label saved with the record
        #[arg(long)]
        name: Option<String>,
    },
    /// List saved analyses, newest first
    History,
    /// Delete a saved analysis
    Delete {
        /// Timestamp of the record, as shown by `history`
        timestamp: i64,
    },
}

/// Exactly one of a product page URL or a label photograph.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Target {
    /// Product page URL
    url: Option<String>,
    /// Label photograph to upload instead of a URL
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = AnalyzerConfig::from_env()?;
    tracing::info!(service = %config.service_url, history = %config.history_path.display(), "starting product-analyzer");

    let events = EventBus::new(config.event_capacity);
    let history = LocalAnalysisStore::new(JsonFileStore::open(&config.history_path)?, events.clone());

    let (target, product_name) = match cli.command {
        Command::History => {
            print_history(&history)?;
            return Ok(());
        }
        Command::Delete { timestamp } => {
            if !history.delete(timestamp)? {
                tracing::warn!(timestamp, "no saved analysis with that timestamp");
            }
            return Ok(());
        }
        Command::Analyze { target, name } => (target, name),
    };

    let transport = HttpTransport::new(&config)?;
    let controller = AnalysisRequestController::new(transport, PreviewRegistry::shared(), events);

    match controller.check_health().await {
        Ok(true) => {}
        Ok(false) => tracing::warn!("analysis service reports itself unhealthy"),
        Err(e) => tracing::warn!(error = %e, "analysis service health check failed"),
    }

    let outcome = match (target.url, target.image) {
        (Some(url), _) => controller.submit(RequestInput::Url(url)).await,
        (None, Some(path)) => {
            controller.set_mode(InputMode::Image)?;
            let preview = controller.select_image(ImageUpload::from_path(&path).await?)?;
            tracing::info!(%preview, path = %path.display(), "image selected");
            controller.submit_selected().await
        }
        (None, None) => return Err("a product URL or --image is required".into()),
    };
    controller.teardown();

    let payload = match outcome {
        Ok(payload) => payload,
        Err(e) => return Err(e.user_message().into()),
    };

    let record = AnalysisRecord::new(payload, product_name);
    history.save(&record)?;

    println!("{}", serde_json::to_string_pretty(record.data.as_value())?);
    println!();
    print_history(&history)?;
    Ok(())
}

fn print_history(
    history: &LocalAnalysisStore<JsonFileStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = history.list()?;
    if records.is_empty() {
        println!("No recent analyses");
        return Ok(());
    }
    println!("Recent analyses:");
    for record in records {
        let when = record
            .analyzed_at()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_default();
        let rating = record
            .data
            .overall_rating()
            .map(|r| format!("  rating {r}/5"))
            .unwrap_or_default();
        println!("  {}  {when}  {}{rating}", record.timestamp, record.display_name());
    }
    Ok(())
}
