use clap::{Parser, Subcommand};
use covid_stats_service::config::AppConfig;
use covid_stats_service::fips::FipsDirectory;
use covid_stats_service::ingest::coronadatascraper::get_corona_data;
use covid_stats_service::ingest::HttpFeedSource;
use covid_stats_service::logging::{ConsoleLogger, DataSource, SharedLogger};
use covid_stats_service::server::{self, AppState};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file; defaults and COVID_* variables apply without it
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the API and the frontend bundle (default)
    Serve,
    /// Fetch the feed once and print the breakdown as JSON
    Snapshot,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let logger: SharedLogger = ConsoleLogger::shared(
        config.logging.min_level()?,
        config.logging.file.as_deref().and_then(|p| p.to_str()),
        config.logging.timestamps,
    );

    let directory = match &config.fips.county_file {
        Some(path) => {
            let directory = FipsDirectory::load(path)?;
            logger.info(
                DataSource::Config,
                None,
                &format!("Loaded {} county FIPS codes (including {})", directory.len(), path.display()),
            );
            directory
        }
        None => FipsDirectory::bundled()?,
    };

    let source = HttpFeedSource::new(config.feed.url.clone(), config.feed.timeout())?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            logger.info(DataSource::System, None, &format!("Feed: {}", config.feed.url));
            let app = AppState::new(source, directory, logger);
            server::start_server(&config, app).await?;
        }
        Commands::Snapshot => {
            let breakdown = get_corona_data(&source, &directory, logger.as_ref()).await;
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
        }
    }

    Ok(())
}
