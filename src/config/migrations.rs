// ABOUTME: Migration command configuration.
// ABOUTME: The one-shot command run against the freshly built image before promotion.

use nonempty::NonEmpty;
use serde::Deserialize;

use super::deserialize::{deserialize_command, deserialize_env};
use crate::types::EnvPair;

#[derive(Debug, Clone, Deserialize)]
pub struct MigrationsConfig {
    #[serde(
        default = "default_migration_command",
        deserialize_with = "deserialize_command"
    )]
    pub command: NonEmpty<String>,

    #[serde(default, deserialize_with = "deserialize_env")]
    pub env: Vec<EnvPair>,
}

fn default_migration_command() -> NonEmpty<String> {
    NonEmpty {
        head: "bin/rails".to_string(),
        tail: vec!["db:migrate".to_string()],
    }
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            command: default_migration_command(),
            env: Vec::new(),
        }
    }
}

impl MigrationsConfig {
    /// Configured env with `overrides` applied on top. Later keys win.
    pub fn env_with(&self, overrides: &[EnvPair]) -> Vec<EnvPair> {
        let mut env = self.env.clone();
        for pair in overrides {
            match env.iter_mut().find(|p| p.key() == pair.key()) {
                Some(existing) => *existing = pair.clone(),
                None => env.push(pair.clone()),
            }
        }
        env
    }
}
