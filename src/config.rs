//! Locator process configuration.

use crate::membership::types::{LocatorId, SiteId};

use anyhow::Result;
use std::time::Duration;

const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(5);

pub const USAGE: &str = "--site <id> --bind <host:port> [--server] [--peer <host:port>]... \
[--stats-interval <secs>] [--log-level <level>]";

#[derive(Debug, Clone)]
pub struct LocatorConfig {
    pub site_id: SiteId,
    /// This locator; flagged as a server locator when `--server` is given.
    pub locator: LocatorId,
    /// Other locators of the local site, known at startup.
    pub peers: Vec<LocatorId>,
    pub stats_interval: Duration,
    pub log_level: tracing::Level,
}

impl LocatorConfig {
    /// Parses arguments, excluding the program name.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();

        let mut site_id: Option<SiteId> = None;
        let mut bind: Option<LocatorId> = None;
        let mut server = false;
        let mut peers: Vec<LocatorId> = vec![];
        let mut stats_interval = DEFAULT_STATS_INTERVAL;
        let mut log_level = tracing::Level::INFO;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--site" => {
                    site_id = Some(
                        value(&args, i)?
                            .parse::<SiteId>()
                            .map_err(|e| anyhow::anyhow!("Invalid --site: {}", e))?,
                    );
                    i += 2;
                }
                "--bind" => {
                    bind = Some(value(&args, i)?.parse::<LocatorId>()?);
                    i += 2;
                }
                "--server" => {
                    server = true;
                    i += 1;
                }
                "--peer" => {
                    peers.push(value(&args, i)?.parse::<LocatorId>()?);
                    i += 2;
                }
                "--stats-interval" => {
                    let secs: u64 = value(&args, i)?
                        .parse()
                        .map_err(|e| anyhow::anyhow!("Invalid --stats-interval: {}", e))?;
                    if secs == 0 {
                        anyhow::bail!("--stats-interval must be at least 1 second");
                    }
                    stats_interval = Duration::from_secs(secs);
                    i += 2;
                }
                "--log-level" => {
                    log_level = value(&args, i)?
                        .parse::<tracing::Level>()
                        .map_err(|e| anyhow::anyhow!("Invalid --log-level: {}", e))?;
                    i += 2;
                }
                other => {
                    tracing::warn!("Ignoring unknown argument: {}", other);
                    i += 1;
                }
            }
        }

        let site_id = site_id.ok_or_else(|| anyhow::anyhow!("--site is required"))?;
        let locator = bind
            .ok_or_else(|| anyhow::anyhow!("--bind is required"))?
            .with_server_locator(server);

        Ok(Self {
            site_id,
            locator,
            peers,
            stats_interval,
            log_level,
        })
    }
}

fn value(args: &[String], flag_idx: usize) -> Result<&str> {
    args.get(flag_idx + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("{} expects a value", args[flag_idx]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_minimal_config() {
        let config = LocatorConfig::from_args(args(&["--site", "1", "--bind", "localhost:10334"]))
            .unwrap();

        assert_eq!(config.site_id, 1);
        assert_eq!(config.locator.to_string(), "localhost:10334");
        assert!(!config.locator.is_server_locator());
        assert!(config.peers.is_empty());
        assert_eq!(config.stats_interval, Duration::from_secs(5));
        assert_eq!(config.log_level, tracing::Level::INFO);
    }

    #[test]
    fn test_full_config() {
        let config = LocatorConfig::from_args(args(&[
            "--site",
            "2",
            "--bind",
            "10.0.0.1[10334]",
            "--server",
            "--peer",
            "10.0.0.2:10334",
            "--peer",
            "10.0.0.3[10334]",
            "--stats-interval",
            "30",
            "--log-level",
            "debug",
        ]))
        .unwrap();

        assert_eq!(config.site_id, 2);
        assert!(config.locator.is_server_locator());
        assert_eq!(config.peers.len(), 2);
        assert_eq!(config.peers[1].host(), "10.0.0.3");
        assert_eq!(config.stats_interval, Duration::from_secs(30));
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_missing_required_flags() {
        assert!(LocatorConfig::from_args(args(&["--bind", "a:1"])).is_err());
        assert!(LocatorConfig::from_args(args(&["--site", "1"])).is_err());
    }

    #[test]
    fn test_invalid_values() {
        assert!(LocatorConfig::from_args(args(&["--site", "x", "--bind", "a:1"])).is_err());
        assert!(LocatorConfig::from_args(args(&["--site", "1", "--bind", "a"])).is_err());
        assert!(LocatorConfig::from_args(args(&["--site", "1", "--bind"])).is_err());
        assert!(
            LocatorConfig::from_args(args(&[
                "--site",
                "1",
                "--bind",
                "a:1",
                "--stats-interval",
                "0"
            ]))
            .is_err()
        );
    }
}
