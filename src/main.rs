// ABOUTME: Entry point for the hl CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use hl::config::{self, HlHome, InitOptions};
use hl::error::Result;
use hl::output::{Output, OutputMode};
use hl::runtime::LogsOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = OutputMode::from_flags(cli.quiet, cli.json);

    if let Err(e) = run(cli, mode).await {
        Output::new(mode).error(e.stage(), &e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let home = match cli.home {
        Some(dir) => HlHome::new(dir),
        None => HlHome::from_env()?,
    };
    let output = Output::new(mode);

    match cli.command {
        Commands::Init {
            app,
            image,
            domain,
            port,
            network,
            force,
        } => {
            let options = InitOptions {
                app,
                image,
                domain,
                port,
                network,
                force,
            };
            let path = config::init_config(&home, &options)?;
            output.success(&format!("Created {}", path.display()));
            Ok(())
        }
        Commands::Deploy {
            app,
            sha,
            branch,
            context,
            dockerfile,
            env,
            force,
        } => {
            let args = commands::DeployArgs {
                app,
                commit: sha,
                branch,
                context,
                dockerfile,
                env,
                force,
            };
            commands::deploy(&home, args, output).await
        }
        Commands::Rollback { app, target, force } => {
            commands::rollback(&home, &app, target, force, output).await
        }
        Commands::Restart { app } => commands::restart(&home, &app, output).await,
        Commands::Logs {
            app,
            follow,
            tail,
            service,
        } => {
            let options = LogsOptions {
                follow,
                tail,
                service,
            };
            commands::logs(&home, &app, options).await
        }
    }
}
