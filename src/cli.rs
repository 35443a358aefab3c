// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use hl::types::{AppName, CommitRef, EnvPair, RollbackTarget};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hl")]
#[command(about = "Build, migrate and release compose apps on a single host")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// hl home directory [default: $HL_HOME or ~/prj]
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create <home>/apps/<app>/hl.yml
    Init {
        /// App name
        #[arg(long)]
        app: AppName,

        /// Image repository, without tag
        #[arg(long)]
        image: String,

        /// Public domain served by the app
        #[arg(long)]
        domain: Option<String>,

        /// Port the app listens on inside the network
        #[arg(long, default_value_t = 3000)]
        port: u16,

        /// Shared docker network
        #[arg(long, default_value = "traefik_proxy")]
        network: String,

        /// Overwrite an existing hl.yml
        #[arg(short, long)]
        force: bool,
    },

    /// Build, migrate, release and health-check a commit
    Deploy {
        /// App name
        #[arg(long)]
        app: AppName,

        /// Commit to deploy
        #[arg(long)]
        sha: CommitRef,

        /// Branch the commit was pushed to
        #[arg(long, default_value = "master")]
        branch: String,

        /// Build from this directory instead of exporting the commit
        #[arg(long, value_name = "DIR")]
        context: Option<PathBuf>,

        /// Dockerfile path [default: <context>/Dockerfile]
        #[arg(long, value_name = "FILE")]
        dockerfile: Option<PathBuf>,

        /// Extra migration environment, may be repeated
        #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
        env: Vec<EnvPair>,

        /// Break an existing deploy lock
        #[arg(long)]
        force: bool,
    },

    /// Point latest back at an earlier image and restart
    Rollback {
        /// App name
        app: AppName,

        /// Commit SHA (7+ hex chars) or image tag to roll back to
        target: RollbackTarget,

        /// Break an existing deploy lock
        #[arg(long)]
        force: bool,
    },

    /// Pull and recreate the app's compose stack
    Restart {
        /// App name
        #[arg(long)]
        app: AppName,
    },

    /// Show logs of the app's compose stack
    Logs {
        /// App name
        app: AppName,

        /// Stream new log output
        #[arg(short, long)]
        follow: bool,

        /// Number of lines to show from the end of the logs
        #[arg(short = 'n', long)]
        tail: Option<u32>,

        /// Only this service [default: all services]
        #[arg(short, long)]
        service: Option<String>,
    },
}
