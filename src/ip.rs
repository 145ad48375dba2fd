/* src/ip.rs */

use std::net::IpAddr;

use crate::error::{ReqError, Result};
use crate::request::Request;

/// Direct-peer header name.
pub const X_REAL_IP: &str = "x-real-ip";
/// Forwarded-chain header name.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Check whether `ip` is in a private range.
///
/// Private ranges are `10.0.0.0/8`, `172.16.0.0/12`, `192.168.0.0/16`,
/// `100.64.0.0/10` (carrier-grade NAT), `fc00::/7` and `fe80::/10`.
/// Text that does not parse as an IP address is not private.
///
/// ```rust
/// use req::is_private_ip;
///
/// assert!(is_private_ip("10.1.2.3"));
/// assert!(!is_private_ip("8.8.8.8"));
/// assert!(!is_private_ip("not-an-ip"));
/// ```
pub fn is_private_ip(ip: &str) -> bool {
    ip.parse::<IpAddr>().is_ok_and(|addr| is_private_addr(&addr))
}

/// Same as [`is_private_ip`] for an already parsed address. IPv4-mapped IPv6
/// addresses are classified by their IPv4 form.
pub fn is_private_addr(addr: &IpAddr) -> bool {
    match addr.to_canonical() {
        IpAddr::V4(ipv4) => {
            let [a, b, ..] = ipv4.octets();
            a == 10
                || (a == 172 && (16..=31).contains(&b))
                || (a == 192 && b == 168)
                || (a == 100 && (b & 0b1100_0000) == 64)
        }
        IpAddr::V6(ipv6) => {
            (ipv6.segments()[0] & 0xfe00) == 0xfc00 || // Unique local
            (ipv6.segments()[0] & 0xffc0) == 0xfe80 // Link local
        }
    }
}

/// Split `host:port` (or `[v6]:port`) and return the host.
///
/// A bare host without a port is an error, as is an unbracketed IPv6 address
/// or a stray bracket or colon outside the expected places.
pub fn split_host_port(addr: &str) -> Result<&str> {
    let invalid = || ReqError::InvalidHostPort(addr.to_string());

    let (host, port) = match addr.strip_prefix('[') {
        Some(rest) => {
            let (host, after) = rest.split_once(']').ok_or_else(invalid)?;
            let port = after.strip_prefix(':').ok_or_else(invalid)?;
            if host.contains(['[', ']']) || port.contains(':') {
                return Err(invalid());
            }
            (host, port)
        }
        None => {
            let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
            if host.contains([':', '[', ']']) {
                return Err(invalid());
            }
            (host, port)
        }
    };

    if port.contains(['[', ']']) {
        return Err(invalid());
    }
    Ok(host)
}

/// Host part of the peer address, or the raw peer address when it carries no
/// port.
pub(crate) fn remote_host(req: &Request) -> String {
    let remote_addr = req.remote_addr();
    match split_host_port(remote_addr) {
        Ok(host) => host.to_string(),
        Err(err) => {
            tracing::trace!(error = %err, "using peer address as-is");
            remote_addr.to_string()
        }
    }
}

/// Resolve the client address with the common-case policy.
///
/// `X-Real-IP` wins when set. Otherwise the first public entry of
/// `X-Forwarded-For` is used, or its last entry when all are private. Without
/// either header the peer address host is returned. No syntax validation and
/// no trusted proxy list are applied; use [`crate::get_ip_with_options`] for
/// that.
///
/// ```rust
/// use req::{Request, ip};
///
/// let req = Request::new("GET", "/")
///     .with_header("X-Forwarded-For", "203.0.113.5, 192.168.1.100")
///     .with_remote_addr("10.0.0.1:12345");
/// assert_eq!(ip(&req), "203.0.113.5");
/// ```
pub fn ip(req: &Request) -> String {
    if let Some(real_ip) = req.header(X_REAL_IP).map(str::trim) {
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    if let Some(forwarded) = req.header(X_FORWARDED_FOR) {
        let mut last = "";
        for candidate in forwarded.split(',').map(str::trim) {
            if candidate.is_empty() {
                continue;
            }
            last = candidate;
            if !is_private_ip(candidate) {
                return candidate.to_string();
            }
        }
        if !last.is_empty() {
            return last.to_string();
        }
    }

    remote_host(req)
}
