use anyhow::Context;
use clap::Parser;
use sigilo::cli::commands::{self, MaskOptions};
use sigilo::cli::{Cli, Commands};
use sigilo::types::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = match (cli.config.exists(), &cli.command) {
        (false, _) => Config::default_config(),
        // doctor re-reads the file and reports parse errors itself
        (true, Commands::Doctor) => Config::load(&cli.config).unwrap_or_default(),
        (true, _) => Config::load(&cli.config)
            .with_context(|| format!("failed to load {}", cli.config.display()))?,
    };

    // Determine log level: CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("sigilo={}", log_level)
            .parse()
            .unwrap_or_else(|_| "sigilo=info".parse().expect("fallback directive is valid")),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if config.general.log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            commands::init(path).await?;
        }
        Commands::Mask {
            input,
            view,
            role,
            user,
            purposes,
            consent,
            emergency,
            show_audit,
        } => {
            let options = MaskOptions {
                input,
                view,
                role,
                user,
                purposes,
                consent,
                emergency,
                show_audit,
            };
            commands::mask(options, &config).await?;
        }
        Commands::Rules { json } => {
            commands::rules(json, &config).await?;
        }
        Commands::Key { namespace, params } => {
            commands::key(&namespace, &params)?;
        }
        Commands::Audit { limit, user } => {
            commands::audit(limit, user.as_deref(), &config).await?;
        }
        Commands::Doctor => {
            commands::doctor(&cli.config, &config).await?;
        }
        Commands::Version => {
            commands::version();
        }
    }

    Ok(())
}
