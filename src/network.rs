/* src/network.rs */

use std::net::IpAddr;

use ipnet::IpNet;

use crate::error::{ReqError, Result};

/// Ordered set of networks treated as trusted proxies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedNetworks {
    networks: Vec<IpNet>,
}

impl TrustedNetworks {
    /// Parse textual entries, skipping blank and malformed ones.
    ///
    /// ```rust
    /// use req::TrustedNetworks;
    ///
    /// let nets = TrustedNetworks::parse(["10.0.0.0/8", "127.0.0.1", "bogus"]);
    /// assert_eq!(nets.len(), 2);
    /// assert!(nets.contains("10.1.2.3"));
    /// assert!(nets.contains("127.0.0.1"));
    /// assert!(!nets.contains("127.0.0.2"));
    /// ```
    pub fn parse<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let networks = entries
            .into_iter()
            .filter(|entry| !entry.as_ref().trim().is_empty())
            .filter_map(|entry| match Self::parse_entry(entry.as_ref()) {
                Ok(net) => Some(net),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping trusted proxy entry");
                    None
                }
            })
            .collect();

        Self { networks }
    }

    /// Parse one entry: a single address becomes a host-only network, anything
    /// else must be a CIDR range.
    pub fn parse_entry(entry: &str) -> Result<IpNet> {
        let entry = entry.trim();
        if let Ok(addr) = entry.parse::<IpAddr>() {
            let prefix = if addr.is_ipv4() { 32 } else { 128 };
            return IpNet::new(addr, prefix)
                .map_err(|_| ReqError::InvalidNetwork(entry.to_string()));
        }
        entry
            .parse::<IpNet>()
            .map(|net| net.trunc())
            .map_err(|_| ReqError::InvalidNetwork(entry.to_string()))
    }

    /// Whether `ip` parses and falls inside any trusted network.
    pub fn contains(&self, ip: &str) -> bool {
        match ip.trim().parse::<IpAddr>() {
            Ok(addr) => self.contains_addr(&addr.to_canonical()),
            Err(_) => false,
        }
    }

    /// Whether an already parsed address falls inside any trusted network.
    pub fn contains_addr(&self, addr: &IpAddr) -> bool {
        self.networks.iter().any(|net| net.contains(addr))
    }

    /// Number of parsed networks.
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// Whether no network was parsed.
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}
