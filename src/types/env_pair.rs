// ABOUTME: KEY=VALUE environment override parsing.
// ABOUTME: Used for migration environment overrides from config and the command line.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvPairError {
    #[error("expected KEY=VALUE, got '{0}'")]
    MissingSeparator(String),

    #[error("environment variable name cannot be empty")]
    EmptyKey,

    #[error("invalid environment variable name '{0}'")]
    InvalidKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvPair {
    key: String,
    value: String,
}

impl EnvPair {
    pub fn new(key: &str, value: &str) -> Result<Self, EnvPairError> {
        validate_key(key)?;
        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Parse `KEY=VALUE`. The value may be empty and may itself contain `=`.
    pub fn parse(input: &str) -> Result<Self, EnvPairError> {
        let (key, value) = input
            .split_once('=')
            .ok_or_else(|| EnvPairError::MissingSeparator(input.to_string()))?;
        Self::new(key, value)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_parts(self) -> (String, String) {
        (self.key, self.value)
    }
}

fn validate_key(key: &str) -> Result<(), EnvPairError> {
    let mut chars = key.chars();
    let first = chars.next().ok_or(EnvPairError::EmptyKey)?;

    let valid_first = first.is_ascii_alphabetic() || first == '_';
    if !valid_first || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(EnvPairError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl fmt::Display for EnvPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl std::str::FromStr for EnvPair {
    type Err = EnvPairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
