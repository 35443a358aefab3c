// ABOUTME: Test support utilities.
// ABOUTME: Recording command runner, scripted HTTP probe, and app workspace fixtures.

use std::path::Path;
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use hl::config::{AppConfig, AppWorkspace};
use hl::health::{HttpProbe, ProbeError};
use hl::process::{CommandRunner, CommandSpec, ProcessError};
use hyper::Uri;
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("hl=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Records every command instead of running it. Commands whose rendered form
/// contains the configured pattern fail with exit code 1.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    fail_on: Option<String>,
}

#[allow(dead_code)]
impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pattern: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(pattern.to_string()),
        }
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Rendered commands, in call order.
    pub fn commands(&self) -> Vec<String> {
        self.specs().iter().map(ToString::to_string).collect()
    }

    pub fn position(&self, needle: &str) -> Option<usize> {
        self.commands().iter().position(|c| c.contains(needle))
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.position(needle).is_some()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandSpec) -> Result<(), ProcessError> {
        let rendered = command.to_string();
        self.calls.lock().unwrap().push(command.clone());

        match &self.fail_on {
            Some(pattern) if rendered.contains(pattern.as_str()) => Err(ProcessError::Exit {
                command: rendered,
                code: Some(1),
            }),
            _ => Ok(()),
        }
    }
}

/// Replays a fixed sequence of statuses; the last one repeats forever.
pub struct ScriptedProbe {
    statuses: Vec<u16>,
    polls: Mutex<Vec<Uri>>,
}

#[allow(dead_code)]
impl ScriptedProbe {
    pub fn new(statuses: &[u16]) -> Self {
        assert!(!statuses.is_empty());
        Self {
            statuses: statuses.to_vec(),
            polls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(status: u16) -> Self {
        Self::new(&[status])
    }

    pub fn poll_count(&self) -> usize {
        self.polls.lock().unwrap().len()
    }

    pub fn polled_urls(&self) -> Vec<String> {
        self.polls
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

#[async_trait]
impl HttpProbe for ScriptedProbe {
    async fn get(&self, url: &Uri) -> Result<u16, ProbeError> {
        let mut polls = self.polls.lock().unwrap();
        let index = polls.len().min(self.statuses.len() - 1);
        polls.push(url.clone());
        Ok(self.statuses[index])
    }
}

/// A probe whose every request fails at the transport level.
#[allow(dead_code)]
pub struct RefusingProbe;

#[async_trait]
impl HttpProbe for RefusingProbe {
    async fn get(&self, url: &Uri) -> Result<u16, ProbeError> {
        Err(ProbeError::Connect {
            addr: url.authority().map(|a| a.to_string()).unwrap_or_default(),
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        })
    }
}

/// An app directory holding a primary compose file, loaded with `yaml`.
#[allow(dead_code)]
pub fn workspace(yaml: &str) -> (TempDir, AppWorkspace) {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "compose.yml");
    let config = AppConfig::from_yaml(yaml).unwrap();
    let workspace = AppWorkspace::new(dir.path(), config);
    (dir, workspace)
}

#[allow(dead_code)]
pub fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), "services: {}\n").unwrap();
}

/// App "recipes" with a 2s/45s health gate.
#[allow(dead_code)]
pub const RECIPES_YAML: &str = r#"
app: recipes
image: registry.example/recipes
health:
  url: http://recipes:8080/healthz
  interval: 2s
  timeout: 45s
migrations:
  env:
    RAILS_ENV: production
"#;

/// App "theme" with a short health gate.
#[allow(dead_code)]
pub const THEME_YAML: &str = r#"
app: theme
image: theme
health:
  url: http://theme:3000/up
  interval: 1s
  timeout: 10s
"#;
