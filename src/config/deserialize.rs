// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Handles app names, image repositories, durations, URLs, platforms and env maps.

use std::collections::BTreeMap;
use std::time::Duration;

use hyper::Uri;
use nonempty::NonEmpty;
use serde::Deserialize;

use super::duration::parse_duration;
use crate::types::{AppName, EnvPair, ImageRef};

pub fn deserialize_app_name<'de, D>(deserializer: D) -> Result<AppName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    AppName::new(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_repository<'de, D>(deserializer: D) -> Result<ImageRef, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ImageRef::parse_repository(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

/// Health URLs must be absolute `http://` URIs with a host.
pub fn deserialize_health_url<'de, D>(deserializer: D) -> Result<Uri, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let uri: Uri = s
        .parse()
        .map_err(|e| serde::de::Error::custom(format!("invalid health url '{s}': {e}")))?;

    if uri.scheme_str() != Some("http") {
        return Err(serde::de::Error::custom(format!(
            "health url must use http://, got '{s}'"
        )));
    }
    if uri.host().is_none() {
        return Err(serde::de::Error::custom(format!(
            "health url has no host: '{s}'"
        )));
    }
    Ok(uri)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlatformsEntry {
    Joined(String),
    List(Vec<String>),
}

/// Accepts `linux/amd64,linux/arm64` or a YAML list.
pub fn deserialize_platforms<'de, D>(deserializer: D) -> Result<NonEmpty<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = match PlatformsEntry::deserialize(deserializer)? {
        PlatformsEntry::Joined(s) => s.split(',').map(str::to_string).collect(),
        PlatformsEntry::List(v) => v,
    };

    let platforms: Vec<String> = raw
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    NonEmpty::from_vec(platforms)
        .ok_or_else(|| serde::de::Error::custom("at least one build platform is required"))
}

pub fn deserialize_command<'de, D>(deserializer: D) -> Result<NonEmpty<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<String> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(values)
        .ok_or_else(|| serde::de::Error::custom("migration command cannot be empty"))
}

/// Environment maps come back sorted by key so generated commands are stable.
pub fn deserialize_env<'de, D>(deserializer: D) -> Result<Vec<EnvPair>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let map: BTreeMap<String, String> = BTreeMap::deserialize(deserializer)?;
    map.iter()
        .map(|(k, v)| EnvPair::new(k, v))
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)
}
