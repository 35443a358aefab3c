// ABOUTME: Compose stack restart for an app: pull, then up -d across all fragments.
// ABOUTME: Fragment files are discovered at restart time from the app directory.

use std::path::{Path, PathBuf};

use nonempty::NonEmpty;

use super::DOCKER;
use crate::process::{CommandRunner, CommandSpec, ProcessError};

/// The app's main compose file. Required.
pub const PRIMARY_COMPOSE_FILE: &str = "compose.yml";

/// Accessory fragments are named `compose.<name>.yml`.
pub const ACCESSORY_PREFIX: &str = "compose.";
const FRAGMENT_SUFFIX: &str = ".yml";

/// Exposed to compose so fragments can reference the shared network.
pub const NETWORK_ENV_VAR: &str = "HL_NETWORK";

#[derive(Debug, thiserror::Error)]
pub enum RestartError {
    #[error("failed to scan {}: {source}", .dir.display())]
    Discovery {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("primary compose file not found: {}", .0.display())]
    MissingPrimary(PathBuf),

    #[error("compose pull failed: {0}")]
    Pull(#[source] ProcessError),

    #[error("compose up failed: {0}")]
    Up(#[source] ProcessError),

    #[error("compose logs failed: {0}")]
    Logs(#[source] ProcessError),
}

/// Compose files for the app, primary first, then accessory fragments sorted
/// by name. Paths are relative to `app_dir`.
pub async fn discover_compose_files(app_dir: &Path) -> Result<NonEmpty<PathBuf>, RestartError> {
    let primary = app_dir.join(PRIMARY_COMPOSE_FILE);
    if !tokio::fs::metadata(&primary)
        .await
        .is_ok_and(|meta| meta.is_file())
    {
        return Err(RestartError::MissingPrimary(primary));
    }

    let discovery_err = |source| RestartError::Discovery {
        dir: app_dir.to_path_buf(),
        source,
    };

    let mut fragments = Vec::new();
    let mut entries = tokio::fs::read_dir(app_dir).await.map_err(discovery_err)?;
    while let Some(entry) = entries.next_entry().await.map_err(discovery_err)? {
        if !entry.file_type().await.is_ok_and(|ty| ty.is_file()) {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if is_accessory_fragment(&name) {
            fragments.push(PathBuf::from(name));
        }
    }
    fragments.sort();

    Ok(NonEmpty {
        head: PathBuf::from(PRIMARY_COMPOSE_FILE),
        tail: fragments,
    })
}

fn is_accessory_fragment(name: &str) -> bool {
    name.strip_prefix(ACCESSORY_PREFIX)
        .and_then(|rest| rest.strip_suffix(FRAGMENT_SUFFIX))
        .is_some_and(|accessory| !accessory.is_empty() && !accessory.contains('.'))
}

/// `docker compose -f ... pull` and `docker compose -f ... up -d`.
pub fn compose_commands(
    app_dir: &Path,
    files: &NonEmpty<PathBuf>,
    network: &str,
) -> (CommandSpec, CommandSpec) {
    let base = files.iter().fold(
        CommandSpec::new(DOCKER)
            .arg("compose")
            .current_dir(app_dir)
            .env(NETWORK_ENV_VAR, network),
        |cmd, file| cmd.opt("-f", file.display().to_string()),
    );

    let pull = base.clone().arg("pull");
    let up = base.args(["up", "-d"]);
    (pull, up)
}

/// Options for `docker compose logs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogsOptions {
    pub follow: bool,
    /// Lines from the end of each service's log.
    pub tail: Option<u32>,
    /// A single service instead of the whole stack.
    pub service: Option<String>,
}

/// `docker compose -f ... logs [--follow] [--tail N] [service]`.
pub fn logs_command(
    app_dir: &Path,
    files: &NonEmpty<PathBuf>,
    network: &str,
    options: &LogsOptions,
) -> CommandSpec {
    let mut cmd = files
        .iter()
        .fold(
            CommandSpec::new(DOCKER)
                .arg("compose")
                .current_dir(app_dir)
                .env(NETWORK_ENV_VAR, network),
            |cmd, file| cmd.opt("-f", file.display().to_string()),
        )
        .arg("logs");

    if options.follow {
        cmd = cmd.arg("--follow");
    }
    if let Some(tail) = options.tail {
        cmd = cmd.opt("--tail", tail.to_string());
    }
    if let Some(service) = &options.service {
        cmd = cmd.arg(service.as_str());
    }
    cmd
}

/// Stream the stack's logs to the terminal.
pub async fn show_logs<R: CommandRunner + ?Sized>(
    runner: &R,
    app_dir: &Path,
    network: &str,
    options: &LogsOptions,
) -> Result<(), RestartError> {
    let files = discover_compose_files(app_dir).await?;
    let cmd = logs_command(app_dir, &files, network, options);
    runner.run(&cmd).await.map_err(RestartError::Logs)
}

/// Pull and recreate the app's stack.
///
/// Containers are replaced without draining. A failed `up` leaves the stack
/// in whatever state compose reached.
pub async fn restart_stack<R: CommandRunner + ?Sized>(
    runner: &R,
    app_dir: &Path,
    network: &str,
) -> Result<NonEmpty<PathBuf>, RestartError> {
    let files = discover_compose_files(app_dir).await?;
    tracing::debug!(
        files = ?files.iter().collect::<Vec<_>>(),
        "restarting compose stack"
    );

    let (pull, up) = compose_commands(app_dir, &files, network);
    runner.run(&pull).await.map_err(RestartError::Pull)?;
    runner.run(&up).await.map_err(RestartError::Up)?;
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "services: {}\n").unwrap();
    }

    #[tokio::test]
    async fn primary_only() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "compose.yml");

        let files = discover_compose_files(dir.path()).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files.head, PathBuf::from("compose.yml"));
    }

    #[tokio::test]
    async fn accessories_follow_primary_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "compose.yml");
        touch(dir.path(), "compose.redis.yml");
        touch(dir.path(), "compose.postgres.yml");
        touch(dir.path(), "hl.yml");
        touch(dir.path(), "compose.yaml.bak");
        touch(dir.path(), "compose..yml");

        let files: Vec<PathBuf> = discover_compose_files(dir.path())
            .await
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("compose.yml"),
                PathBuf::from("compose.postgres.yml"),
                PathBuf::from("compose.redis.yml"),
            ]
        );
    }

    #[tokio::test]
    async fn missing_primary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "compose.redis.yml");

        assert!(matches!(
            discover_compose_files(dir.path()).await,
            Err(RestartError::MissingPrimary(_))
        ));
    }

    #[test]
    fn commands_share_file_set_and_network() {
        let files = NonEmpty {
            head: PathBuf::from("compose.yml"),
            tail: vec![PathBuf::from("compose.postgres.yml")],
        };
        let (pull, up) = compose_commands(Path::new("/srv/app"), &files, "traefik_proxy");

        assert_eq!(
            pull.arg_strs(),
            vec!["compose", "-f", "compose.yml", "-f", "compose.postgres.yml", "pull"]
        );
        assert_eq!(
            up.arg_strs(),
            vec!["compose", "-f", "compose.yml", "-f", "compose.postgres.yml", "up", "-d"]
        );
        assert_eq!(
            up.env.get(NETWORK_ENV_VAR).map(String::as_str),
            Some("traefik_proxy")
        );
        assert_eq!(up.current_dir.as_deref(), Some(Path::new("/srv/app")));
    }

    #[test]
    fn logs_command_renders_every_option() {
        let files = NonEmpty {
            head: PathBuf::from("compose.yml"),
            tail: vec![PathBuf::from("compose.postgres.yml")],
        };
        let options = LogsOptions {
            follow: true,
            tail: Some(200),
            service: Some("web".to_string()),
        };
        let cmd = logs_command(Path::new("/srv/app"), &files, "traefik_proxy", &options);

        assert_eq!(
            cmd.to_string(),
            "docker compose -f compose.yml -f compose.postgres.yml logs --follow --tail 200 web"
        );
        assert_eq!(cmd.current_dir.as_deref(), Some(Path::new("/srv/app")));
        assert_eq!(
            cmd.env.get(NETWORK_ENV_VAR).map(String::as_str),
            Some("traefik_proxy")
        );
    }

    #[test]
    fn logs_command_defaults_to_whole_stack() {
        let files = NonEmpty::new(PathBuf::from("compose.yml"));
        let cmd = logs_command(Path::new("/srv/app"), &files, "edge", &LogsOptions::default());
        assert_eq!(cmd.arg_strs(), vec!["compose", "-f", "compose.yml", "logs"]);
    }
}
