/* src/lib.rs */
//! # Request Parameter Helpers
//!
//! Typed, defensive accessors for HTTP request parameters, covering the
//! query string and form body, plus client IP resolution and subdomain
//! extraction.
//!
//! ## Features
//!
//! - Scalar accessors with defaults (`get_string_or`, `get_int_or`, ...)
//! - Arrays in `key=a&key=b`, `key[]=a` and `key[0]=a` notation
//! - Nested `key[outer][inner]` parameters flattened into records
//! - Client IP resolution from `X-Real-IP`, `X-Forwarded-For` and custom
//!   headers, with trusted proxy networks and private range handling
//! - Optional Axum layer and extractors via the `axum` feature
//! - Optional `serde` support for [`IpOptions`] via the `serde` feature
//!
//! Accessors never fail: missing keys, malformed values and unusable
//! addresses degrade to a default or an empty string.
//!
//! ## Examples
//!
//! ### Parameters
//!
//! ```rust
//! use req::{Request, get_array, get_int_or, get_string};
//!
//! let req = Request::new("POST", "/items?page=3&tag=a&tag=b")
//!     .with_header("Content-Type", "application/x-www-form-urlencoded")
//!     .with_body("title=Hello");
//!
//! assert_eq!(get_string(&req, "title"), "Hello");
//! assert_eq!(get_int_or(&req, "page", 1), 3);
//! assert_eq!(get_int_or(&req, "limit", 20), 20);
//! assert_eq!(get_array(&req, "tag", vec![]), ["a", "b"]);
//! ```
//!
//! ### Client IP
//!
//! ```rust
//! use req::{IpOptions, Request, get_ip_with_options};
//!
//! let req = Request::new("GET", "/")
//!     .with_header("X-Forwarded-For", "10.0.0.1, 192.168.1.3, 172.16.0.9")
//!     .with_remote_addr("10.0.0.254:443");
//!
//! let opts = IpOptions::new()
//!     .prefer_forwarded_for(true)
//!     .return_private_if_all_private(true);
//! assert_eq!(get_ip_with_options(Some(&req), &opts), "172.16.0.9");
//!
//! let strict = opts.return_private_if_all_private(false);
//! assert_eq!(get_ip_with_options(Some(&req), &strict), "10.0.0.254");
//! ```

pub mod array;
pub mod error;
pub mod form;
pub mod ip;
pub mod maps;
pub mod network;
pub mod params;
pub mod request;
pub mod resolver;
pub mod subdomain;
pub mod values;

#[cfg(feature = "axum")]
pub mod middleware;

pub use array::get_array;
pub use error::{ReqError, Result};
pub use ip::{ip, is_private_addr, is_private_ip, split_host_port};
pub use maps::maps;
pub use network::TrustedNetworks;
pub use params::{
    FromParam, all_get, all_post, get_all, get_all_get, get_all_post, get_bool, get_bool_or,
    get_float64, get_float64_or, get_int, get_int_or, get_int64, get_int64_or, get_parsed,
    get_parsed_or, get_string, get_string_or, get_string_trimmed, get_string_trimmed_or, has,
    has_get, has_post, trimmed_value, trimmed_value_or, value, value_or,
};
pub use request::{HeaderMap, Request};
pub use resolver::{IpOptions, get_ip_with_options};
pub use subdomain::subdomain;
pub use values::Values;

#[cfg(feature = "axum")]
pub use middleware::{ClientIp, ClientIpLayer, ClientIpService};
