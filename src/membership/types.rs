use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Identifier of one distributed-system site in the WAN topology.
pub type SiteId = i32;

/// Frozen view of every known locator, keyed by site.
///
/// Also the decoded form of the snapshot a remote locator sends during an exchange.
pub type LocatorSnapshot = HashMap<SiteId, HashSet<LocatorId>>;

/// Identity of a single locator process.
///
/// Two ids with the same host and port are the same locator: `server_locator`
/// is carried along but does not take part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorId {
    host: String,
    port: u16,
    server_locator: bool,
}

impl LocatorId {
    pub fn new(host: impl Into<String>, port: u16, server_locator: bool) -> Self {
        Self {
            host: host.into(),
            port,
            server_locator,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether this locator also directs client connections.
    pub fn is_server_locator(&self) -> bool {
        self.server_locator
    }

    /// Same locator, flagged as client-serving or not.
    pub fn with_server_locator(mut self, server_locator: bool) -> Self {
        self.server_locator = server_locator;
        self
    }
}

impl PartialEq for LocatorId {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host && self.port == other.port
    }
}

impl Eq for LocatorId {}

impl Hash for LocatorId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.host.hash(state);
        self.port.hash(state);
    }
}

impl fmt::Display for LocatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parses `host:port` or `host[port]`. The result is not a server locator.
impl FromStr for LocatorId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        let (host, port) = if let Some(stripped) = s.strip_suffix(']') {
            stripped
                .split_once('[')
                .ok_or_else(|| anyhow::anyhow!("Invalid locator '{}': missing '['", s))?
        } else {
            s.rsplit_once(':')
                .ok_or_else(|| anyhow::anyhow!("Invalid locator '{}': expected host:port", s))?
        };

        if host.is_empty() {
            anyhow::bail!("Invalid locator '{}': empty host", s);
        }

        let port = port
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("Invalid locator '{}': bad port: {}", s, e))?;

        Ok(Self::new(host, port, false))
    }
}
