/* src/subdomain.rs */

use crate::request::Request;

/// Leftmost label of the request host, e.g. `"shop"` for `shop.example.com`.
///
/// Returns an empty string for an empty host, for `localhost` and for hosts
/// without a dot.
pub fn subdomain(req: &Request) -> String {
    let host = req.host();
    if host.is_empty() || host == "localhost" {
        return String::new();
    }

    host.split_once('.')
        .map(|(label, _)| label.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(host: &str) -> String {
        subdomain(&Request::new("GET", &format!("http://{host}")))
    }

    #[test]
    fn test_subdomain() {
        assert_eq!(host("localhost"), "");
        assert_eq!(host("example"), "");
        assert_eq!(host("sub.example.com"), "sub");
        assert_eq!(host("a.b.example.com:8080"), "a");
    }

    #[test]
    fn test_empty_host() {
        assert_eq!(subdomain(&Request::new("GET", "/path")), "");
    }

    #[test]
    fn test_host_override() {
        let req = Request::new("GET", "/").with_host("api.example.org");
        assert_eq!(subdomain(&req), "api");
    }
}
