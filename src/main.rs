use clap::Parser;
use oi_screener::acquisition::AcquisitionTuning;
use oi_screener::cli::{Cli, Commands};
use oi_screener::config::Config;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::parse(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    oi_screener::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(exchange = %config.exchange.name, "Starting screener");
            args.execute(config, PathBuf::from(&cli.config)).await?;
        }
        Commands::Config => {
            let exchange = config.exchange.name;
            let tuning = AcquisitionTuning::from_config(&config.acquisition);
            println!("Current configuration:");
            println!("  Exchange: {} {}", exchange, config.exchange.market_type);
            println!(
                "  Polling: every {:?}, chunks of {} with {:?} pause, bulk={}, normalize={}",
                tuning.poll_interval_for(exchange),
                tuning.chunk_size_for(exchange),
                tuning.chunk_interval_for(exchange),
                exchange.has_bulk_open_interest(),
                exchange.reports_contracts()
            );
            println!(
                "  Screener: growth>{}% over {}s, cooldown {}s, ready={}",
                config.screener.min_growth_pct,
                config.screener.lookback_secs,
                config.screener.cooldown_secs,
                config.screener.is_ready()
            );
            println!("  Log level: {}", config.telemetry.log_level);
        }
    }

    Ok(())
}
