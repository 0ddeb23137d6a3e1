use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mashupgen::cli::{Cli, Commands};
use mashupgen::config::Config;
use mashupgen::pipeline::MashupPipeline;
use mashupgen::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "mashupgen=debug"
    } else {
        "mashupgen=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().await?;

    match cli.command {
        Commands::Generate {
            artist,
            videos,
            duration,
            email,
        } => {
            // Check for required external tools before starting a run
            let missing_deps = utils::check_dependencies().await;
            if !missing_deps.is_empty() {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
            }

            let pipeline = MashupPipeline::new(config)?;
            let outcome = pipeline.run(&artist, videos, duration, &email).await;

            if outcome.is_success() {
                println!("🎉 {}", outcome.message());
            } else {
                eprintln!("{}", outcome.message());
                std::process::exit(1);
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Edit the config file directly.");
                println!("SMTP credentials come from SENDER_EMAIL / EMAIL_PASSWORD.");
                config.display();
            }
        }
    }

    Ok(())
}
