/* src/request.rs */

use std::collections::HashMap;
use std::sync::OnceLock;

use url::Url;

use crate::error::Result;
use crate::form;
use crate::values::Values;

/// Type alias for header maps. Keys are stored lowercased.
pub type HeaderMap = HashMap<String, String>;

/// Read-only snapshot of an inbound HTTP request.
///
/// Holds everything the accessors need: method, host, query parameters,
/// headers, the peer address and the raw body. The body is decoded into form
/// values lazily, at most once.
///
/// # Examples
///
/// ```rust
/// use req::Request;
///
/// let req = Request::new("POST", "http://example.com/users?page=2")
///     .with_header("Content-Type", "application/x-www-form-urlencoded")
///     .with_body("name=Alice")
///     .with_remote_addr("203.0.113.5:4000");
///
/// assert_eq!(req.host(), "example.com");
/// assert_eq!(req.query().get("page"), Some("2"));
/// assert_eq!(req.form().get("name"), Some("Alice"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    host: String,
    query: Values,
    headers: HeaderMap,
    remote_addr: String,
    body: Vec<u8>,
    form: OnceLock<Values>,
}

impl Request {
    /// Create a snapshot from a method and a URI.
    ///
    /// The URI may be absolute (`http://host/path?q`) or origin-form
    /// (`/path?q`); the latter leaves the host empty.
    pub fn new(method: impl Into<String>, uri: &str) -> Self {
        let (host, query) = match Url::parse(uri) {
            Ok(url) => {
                let host = match (url.host_str(), url.port()) {
                    (Some(host), Some(port)) => format!("{host}:{port}"),
                    (Some(host), None) => host.to_string(),
                    (None, _) => String::new(),
                };
                (host, url.query().map(Values::parse).unwrap_or_default())
            }
            Err(_) => {
                let query = uri
                    .split_once('?')
                    .map(|(_, query)| Values::parse(query))
                    .unwrap_or_default();
                (String::new(), query)
            }
        };

        Self {
            method: method.into().to_ascii_uppercase(),
            host,
            query,
            ..Self::default()
        }
    }

    /// Set a header. Names are case-insensitive; the first value set wins.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.as_ref().to_ascii_lowercase())
            .or_insert_with(|| value.into());
        self
    }

    /// Replace the host (e.g. from a `Host` header).
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the connection's peer address (`host:port` or a bare host).
    pub fn with_remote_addr(mut self, remote_addr: impl Into<String>) -> Self {
        self.remote_addr = remote_addr.into();
        self
    }

    /// Set the raw request body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.form = OnceLock::new();
        self
    }

    /// Provide already-decoded form values. The body is then ignored.
    pub fn with_form(mut self, form: Values) -> Self {
        self.form = OnceLock::from(form);
        self
    }

    /// Request method, uppercased.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Host as received, including any `:port`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Connection peer address (`host:port` or a bare host).
    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    /// All headers, keyed by lowercased name.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Query string parameters.
    pub fn query(&self) -> &Values {
        &self.query
    }

    /// Form body parameters, decoded on first access.
    ///
    /// Only `POST`, `PUT` and `PATCH` bodies are decoded. Decoding failures
    /// yield an empty map.
    pub fn form(&self) -> &Values {
        self.form.get_or_init(|| {
            self.parse_form().unwrap_or_else(|err| {
                tracing::debug!(error = %err, "failed to parse form body");
                Values::new()
            })
        })
    }

    /// Decode the body into form values without caching the result.
    pub fn parse_form(&self) -> Result<Values> {
        if !matches!(self.method.as_str(), "POST" | "PUT" | "PATCH") {
            return Ok(Values::new());
        }
        form::parse_body(self.header("content-type"), &self.body)
    }

    /// Query parameters overlaid with form parameters. A key present in both
    /// takes the form's values.
    pub fn all(&self) -> Values {
        let mut all = self.query.clone();
        all.merge(self.form());
        all
    }
}
