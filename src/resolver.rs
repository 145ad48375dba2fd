/* src/resolver.rs */

use std::env;
use std::net::IpAddr;

use crate::ip::{X_FORWARDED_FOR, X_REAL_IP, is_private_ip, remote_host};
use crate::network::TrustedNetworks;
use crate::request::Request;

/// Trust policy for client address resolution.
///
/// All flags default to `false` and all lists to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IpOptions {
    /// Consult `X-Forwarded-For` before `X-Real-IP`.
    pub prefer_forwarded_for: bool,
    /// Proxy addresses or CIDR ranges. When non-empty, the first
    /// `X-Forwarded-For` entry outside these networks is the client.
    pub trusted_proxies: Vec<String>,
    /// Extra headers tried, in order, after the two standard ones.
    pub additional_headers: Vec<String>,
    /// Discard header values that are not IP literals.
    pub validate: bool,
    /// Without trusted proxies, return the last `X-Forwarded-For` entry when
    /// every entry is private.
    pub return_private_if_all_private: bool,
}

impl IpOptions {
    /// Create options with the default (most permissive) policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from `REQ_*` environment variables, falling back to defaults.
    ///
    /// Lists are comma-separated; booleans accept `1`/`true`/`yes`/`on`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| {
            lookup(name)
                .map(|v| {
                    let v = v.trim().to_ascii_lowercase();
                    matches!(v.as_str(), "1" | "true" | "yes" | "on")
                })
                .unwrap_or(false)
        };
        let list = |name: &str| -> Vec<String> {
            lookup(name)
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            prefer_forwarded_for: flag("REQ_PREFER_FORWARDED_FOR"),
            trusted_proxies: list("REQ_TRUSTED_PROXIES"),
            additional_headers: list("REQ_ADDITIONAL_HEADERS"),
            validate: flag("REQ_VALIDATE"),
            return_private_if_all_private: flag("REQ_RETURN_PRIVATE_IF_ALL_PRIVATE"),
        }
    }

    /// Set whether `X-Forwarded-For` is consulted before `X-Real-IP`.
    pub fn prefer_forwarded_for(mut self, prefer: bool) -> Self {
        self.prefer_forwarded_for = prefer;
        self
    }

    /// Set the trusted proxy addresses and CIDR ranges.
    pub fn with_trusted_proxies<I, S>(mut self, proxies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trusted_proxies = proxies.into_iter().map(Into::into).collect();
        self
    }

    /// Set the extra headers consulted after the standard ones.
    pub fn with_additional_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether header values must be IP literals.
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set whether an all-private forwarded chain yields its last entry.
    pub fn return_private_if_all_private(mut self, allow: bool) -> Self {
        self.return_private_if_all_private = allow;
        self
    }

    /// Resolve the client address of `req` under this policy.
    ///
    /// Never fails: returns the peer address host, the raw peer address, or
    /// an empty string when nothing better is available.
    pub fn resolve(&self, req: &Request) -> String {
        self.resolve_with(&self.trusted_networks(), req)
    }

    /// Parse `trusted_proxies`, skipping malformed entries.
    pub fn trusted_networks(&self) -> TrustedNetworks {
        TrustedNetworks::parse(&self.trusted_proxies)
    }

    /// Resolve with networks already parsed from `trusted_proxies`.
    pub(crate) fn resolve_with(&self, trusted: &TrustedNetworks, req: &Request) -> String {
        Resolver {
            opts: self,
            trusted,
            req,
        }
        .resolve()
    }
}

struct Resolver<'a> {
    opts: &'a IpOptions,
    trusted: &'a TrustedNetworks,
    req: &'a Request,
}

impl Resolver<'_> {
    fn resolve(&self) -> String {
        let primary = if self.opts.prefer_forwarded_for {
            self.from_forwarded_for().or_else(|| self.from_real_ip())
        } else {
            self.from_real_ip().or_else(|| self.from_forwarded_for())
        };

        if let Some(ip) = primary.or_else(|| self.from_additional_headers()) {
            tracing::trace!(ip = %ip, "resolved client address from headers");
            return ip;
        }

        remote_host(self.req)
    }

    /// Accept a trimmed candidate unless it is blank or fails validation.
    fn accept<'v>(&self, value: &'v str) -> Option<&'v str> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if self.opts.validate && value.parse::<IpAddr>().is_err() {
            tracing::trace!(value, "discarding non-IP candidate");
            return None;
        }
        Some(value)
    }

    fn from_header(&self, name: &str) -> Option<String> {
        self.req
            .header(name)
            .and_then(|value| self.accept(value))
            .map(str::to_string)
    }

    fn from_real_ip(&self) -> Option<String> {
        self.from_header(X_REAL_IP)
    }

    fn from_additional_headers(&self) -> Option<String> {
        self.opts
            .additional_headers
            .iter()
            .filter(|name| !name.is_empty())
            .find_map(|name| self.from_header(name))
    }

    /// Scan `X-Forwarded-For` client-first for the first untrusted entry.
    fn from_forwarded_for(&self) -> Option<String> {
        let chain = self.req.header(X_FORWARDED_FOR)?;

        let mut last = None;
        for candidate in chain.split(',').filter_map(|part| self.accept(part)) {
            last = Some(candidate);
            let trusted = if self.trusted.is_empty() {
                is_private_ip(candidate)
            } else {
                self.trusted.contains(candidate)
            };
            if !trusted {
                return Some(candidate.to_string());
            }
        }

        if self.trusted.is_empty() && !self.opts.return_private_if_all_private {
            return None;
        }
        last.map(str::to_string)
    }
}

/// Resolve the client address of an optional request.
///
/// A missing request yields an empty string.
///
/// ```rust
/// use req::{IpOptions, Request, get_ip_with_options};
///
/// let opts = IpOptions::new()
///     .prefer_forwarded_for(true)
///     .with_trusted_proxies(["10.0.0.0/8"])
///     .validate(true);
///
/// let req = Request::new("GET", "/")
///     .with_header("X-Forwarded-For", "198.51.100.23, 10.0.0.2");
///
/// assert_eq!(get_ip_with_options(Some(&req), &opts), "198.51.100.23");
/// assert_eq!(get_ip_with_options(None, &opts), "");
/// ```
pub fn get_ip_with_options(req: Option<&Request>, opts: &IpOptions) -> String {
    match req {
        Some(req) => opts.resolve(req),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_forwarded_for(chain: &str) -> Request {
        Request::new("GET", "/").with_header("X-Forwarded-For", chain)
    }

    #[test]
    fn test_prefer_forwarded_for() {
        let req = with_forwarded_for("198.51.100.23, 10.0.0.2")
            .with_header("X-Real-IP", "203.0.113.10");
        let opts = IpOptions::new()
            .prefer_forwarded_for(true)
            .validate(true)
            .return_private_if_all_private(true);
        assert_eq!(opts.resolve(&req), "198.51.100.23");
    }

    #[test]
    fn test_prefer_real_ip() {
        let req = with_forwarded_for("198.51.100.23, 10.0.0.2")
            .with_header("X-Real-IP", "203.0.113.10");
        let opts = IpOptions::new().validate(true);
        assert_eq!(opts.resolve(&req), "203.0.113.10");
    }

    #[test]
    fn test_trusted_proxies_skip_trusted_hops() {
        let req = with_forwarded_for("198.51.100.50, 10.0.0.5, 127.0.0.1");
        let opts = IpOptions::new()
            .prefer_forwarded_for(true)
            .with_trusted_proxies(["10.0.0.0/8", "127.0.0.1/32"])
            .validate(true);
        assert_eq!(opts.resolve(&req), "198.51.100.50");
    }

    #[test]
    fn test_trusted_proxies_without_real_ip() {
        let req = with_forwarded_for("198.51.100.23, 10.0.0.2");
        let opts = IpOptions::new().with_trusted_proxies(["10.0.0.0/8"]);
        assert_eq!(opts.resolve(&req), "198.51.100.23");
    }

    #[test]
    fn test_trusted_proxies_allow_private_clients() {
        let req = with_forwarded_for("192.168.1.7, 10.0.0.2");
        let opts = IpOptions::new().with_trusted_proxies(["10.0.0.0/8"]);
        assert_eq!(opts.resolve(&req), "192.168.1.7");
    }

    #[test]
    fn test_all_trusted_returns_last() {
        let req = with_forwarded_for("127.0.0.1, 10.0.0.2");
        let opts = IpOptions::new()
            .prefer_forwarded_for(true)
            .with_trusted_proxies(["127.0.0.1/32", "10.0.0.0/8"])
            .validate(true);
        assert_eq!(opts.resolve(&req), "10.0.0.2");
    }

    #[test]
    fn test_all_private_returns_last_when_allowed() {
        let req = with_forwarded_for("10.0.0.1, 192.168.1.3, 172.16.0.9");
        let opts = IpOptions::new()
            .prefer_forwarded_for(true)
            .validate(true)
            .return_private_if_all_private(true);
        assert_eq!(opts.resolve(&req), "172.16.0.9");

        let opts = opts.return_private_if_all_private(false);
        assert_eq!(opts.resolve(&req), "");
    }

    #[test]
    fn test_all_private_falls_through_to_real_ip() {
        let req = with_forwarded_for("10.0.0.1").with_header("X-Real-IP", "203.0.113.3");
        let opts = IpOptions::new().prefer_forwarded_for(true);
        assert_eq!(opts.resolve(&req), "203.0.113.3");
    }

    #[test]
    fn test_first_public_in_chain() {
        let req = with_forwarded_for("10.0.0.1, 203.0.113.77, 192.168.1.4");
        let opts = IpOptions::new()
            .prefer_forwarded_for(true)
            .validate(true)
            .return_private_if_all_private(true);
        assert_eq!(opts.resolve(&req), "203.0.113.77");
    }

    #[test]
    fn test_additional_headers() {
        let req = Request::new("GET", "/").with_header("CF-Connecting-IP", "203.0.113.200");
        let opts = IpOptions::new()
            .with_additional_headers(["", "True-Client-IP", "CF-Connecting-IP"])
            .validate(true);
        assert_eq!(opts.resolve(&req), "203.0.113.200");
    }

    #[test]
    fn test_additional_headers_validated_in_order() {
        let req = Request::new("GET", "/")
            .with_header("True-Client-IP", "unknown")
            .with_header("CF-Connecting-IP", "203.0.113.200");
        let opts = IpOptions::new()
            .with_additional_headers(["True-Client-IP", "CF-Connecting-IP"])
            .validate(true);
        assert_eq!(opts.resolve(&req), "203.0.113.200");

        let opts = opts.validate(false);
        assert_eq!(opts.resolve(&req), "unknown");
    }

    #[test]
    fn test_trusted_ipv6_network() {
        let opts = IpOptions::new()
            .prefer_forwarded_for(true)
            .with_trusted_proxies(["2001:db8::/32"])
            .validate(true);

        let req = with_forwarded_for("2001:db9::1, 2001:db8::5");
        assert_eq!(opts.resolve(&req), "2001:db9::1");

        let req = with_forwarded_for("2001:db8::1, 2001:db8:ffff::5");
        assert_eq!(opts.resolve(&req), "2001:db8:ffff::5");
    }

    #[test]
    fn test_resolve_with_parsed_networks() {
        let opts = IpOptions::new()
            .prefer_forwarded_for(true)
            .with_trusted_proxies(["10.0.0.0/8", "bogus", "127.0.0.1"]);
        let trusted = opts.trusted_networks();
        assert_eq!(trusted.len(), 2);

        let req = with_forwarded_for("198.51.100.7, 127.0.0.1, 10.0.0.3");
        assert_eq!(opts.resolve_with(&trusted, &req), "198.51.100.7");
        assert_eq!(opts.resolve_with(&trusted, &req), opts.resolve(&req));
    }

    #[test]
    fn test_validate_skips_invalid() {
        let req = with_forwarded_for("not-an-ip, 203.0.113.9");
        let opts = IpOptions::new().prefer_forwarded_for(true).validate(true);
        assert_eq!(opts.resolve(&req), "203.0.113.9");

        let req = Request::new("GET", "/")
            .with_header("X-Real-IP", "unknown")
            .with_remote_addr("198.51.100.4:80");
        assert_eq!(IpOptions::new().validate(true).resolve(&req), "198.51.100.4");
        assert_eq!(IpOptions::new().resolve(&req), "unknown");
    }

    #[test]
    fn test_unvalidated_garbage_is_public() {
        let req = with_forwarded_for("garbage, 10.0.0.1");
        assert_eq!(IpOptions::new().resolve(&req), "garbage");
    }

    #[test]
    fn test_fallback_remote_addr() {
        let req = Request::new("GET", "/").with_remote_addr("203.0.113.5:12345");
        assert_eq!(IpOptions::new().validate(true).resolve(&req), "203.0.113.5");

        let req = Request::new("GET", "/").with_remote_addr("192.0.2.1");
        assert_eq!(IpOptions::new().resolve(&req), "192.0.2.1");
    }

    #[test]
    fn test_missing_request() {
        assert_eq!(get_ip_with_options(None, &IpOptions::default()), "");
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let req = with_forwarded_for("198.51.100.1, 10.0.0.1")
            .with_header("X-Real-IP", "203.0.113.1")
            .with_remote_addr("10.0.0.9:443");
        let opts = IpOptions::new()
            .prefer_forwarded_for(true)
            .with_trusted_proxies(["10.0.0.0/8"]);
        let first = get_ip_with_options(Some(&req), &opts);
        assert_eq!(first, get_ip_with_options(Some(&req), &opts));
        assert_eq!(first, "198.51.100.1");
    }

    #[test]
    fn test_options_from_lookup() {
        let vars = std::collections::HashMap::from([
            ("REQ_PREFER_FORWARDED_FOR", "true"),
            ("REQ_TRUSTED_PROXIES", "10.0.0.0/8, ,127.0.0.1"),
            ("REQ_VALIDATE", "0"),
            ("REQ_RETURN_PRIVATE_IF_ALL_PRIVATE", "Yes"),
        ]);
        let opts = IpOptions::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(
            opts,
            IpOptions::new()
                .prefer_forwarded_for(true)
                .with_trusted_proxies(["10.0.0.0/8", "127.0.0.1"])
                .return_private_if_all_private(true)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_with_defaults() {
        let opts: IpOptions = serde_json::from_str(
            r#"{"prefer_forwarded_for": true, "trusted_proxies": ["10.0.0.0/8"]}"#,
        )
        .unwrap();
        assert!(opts.prefer_forwarded_for);
        assert_eq!(opts.trusted_proxies, ["10.0.0.0/8"]);
        assert!(!opts.validate);
        assert!(opts.additional_headers.is_empty());
    }
}
