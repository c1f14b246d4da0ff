// crates/domain/src/setting.rs

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

use crate::query::MIN_QUERY_LEN;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// IP address the HTTP listener binds to
    pub ip: IpAddr,

    /// HTTP port
    pub port: u16,
}

/// Knobs for the server-side aggregation. Every field has a default so the
/// section can be omitted from `settings.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Smallest batch requested from any pool
    pub min_batch: usize,

    /// Hard cap on a single pool fetch
    pub max_pool: usize,

    /// Over-fetch factor applied to `first`
    pub multiplier: usize,

    /// Upper clamp for the requested page size
    pub max_first: usize,

    /// Free text shorter than this is ignored
    pub min_query_len: usize,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            min_batch: 24,
            max_pool: 400,
            multiplier: 3,
            max_first: 50,
            min_query_len: MIN_QUERY_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Directory holding `video_entries.json`, `projects.json`, `posts.json`
    pub dir: PathBuf,

    /// Seconds a fetched batch is served from memory
    pub revalidate_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("content"),
            revalidate_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub pools: PoolSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [server]
            ip = "127.0.0.1"
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.discovery, DiscoverySettings::default());
        assert_eq!(settings.pools.revalidate_secs, 300);
    }

    #[test]
    fn partial_discovery_section_keeps_other_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [server]
            ip = "0.0.0.0"
            port = 3000

            [discovery]
            max_pool = 100

            [pools]
            dir = "/srv/content"
            "#,
        )
        .unwrap();

        assert_eq!(settings.discovery.max_pool, 100);
        assert_eq!(settings.discovery.min_batch, 24);
        assert_eq!(settings.pools.dir, PathBuf::from("/srv/content"));
        assert_eq!(settings.pools.revalidate_secs, 300);
    }
}
