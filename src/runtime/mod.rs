// ABOUTME: Docker-facing pipeline components: build, migrate, retag, restart, logs.
// ABOUTME: Each one renders docker CLI invocations and runs them through a CommandRunner.

mod builder;
mod migrations;
mod retag;
mod stack;

pub use builder::{BuildRequest, build_and_push, build_command};
pub use migrations::{MigrationRequest, migration_command, run_migrations};
pub use retag::{RetagError, RetagStep, promote_to_latest, retag_commands};
pub use stack::{
    ACCESSORY_PREFIX, LogsOptions, NETWORK_ENV_VAR, PRIMARY_COMPOSE_FILE, RestartError,
    compose_commands, discover_compose_files, logs_command, restart_stack, show_logs,
};

/// The container CLI every component drives.
pub const DOCKER: &str = "docker";
