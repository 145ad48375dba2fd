/* src/params.rs */

//! Scalar parameter accessors.
//!
//! Every accessor reads the first value for a key, with form values taking
//! precedence over query values. Nothing here fails: a missing key or a value
//! that does not parse yields the type's zero value, or the caller's default
//! for the `_or` variants.

use crate::request::Request;
use crate::values::Values;

/// Types that can be read from a single parameter value.
pub trait FromParam: Sized {
    /// Parse `value`, or `None` when it is not a valid `Self`.
    fn from_param(value: &str) -> Option<Self>;
}

macro_rules! from_param_via_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromParam for $ty {
                fn from_param(value: &str) -> Option<Self> {
                    value.parse().ok()
                }
            }
        )*
    };
}

from_param_via_from_str!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl FromParam for bool {
    fn from_param(value: &str) -> Option<Self> {
        match value {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
            _ => None,
        }
    }
}

impl FromParam for String {
    fn from_param(value: &str) -> Option<Self> {
        Some(value.to_string())
    }
}

/// All parameters: query values overlaid by form values.
pub fn get_all(req: &Request) -> Values {
    req.all()
}

/// Query string parameters only.
pub fn get_all_get(req: &Request) -> Values {
    req.query().clone()
}

/// Form body parameters only.
pub fn get_all_post(req: &Request) -> Values {
    req.form().clone()
}

/// Alias of [`get_all_get`].
pub fn all_get(req: &Request) -> Values {
    get_all_get(req)
}

/// Alias of [`get_all_post`].
pub fn all_post(req: &Request) -> Values {
    get_all_post(req)
}

/// Whether `key` is present in the query string or the form body, even
/// with an empty value.
///
/// ```rust
/// use req::{Request, has, has_get, has_post};
///
/// let req = Request::new("GET", "/?flag&page=2");
/// assert!(has(&req, "flag"));
/// assert!(has_get(&req, "page"));
/// assert!(!has_post(&req, "page"));
/// ```
pub fn has(req: &Request, key: &str) -> bool {
    has_post(req, key) || has_get(req, key)
}

/// Whether `key` is present in the query string.
pub fn has_get(req: &Request, key: &str) -> bool {
    req.query().contains_key(key)
}

/// Whether `key` is present in the form body.
pub fn has_post(req: &Request, key: &str) -> bool {
    req.form().contains_key(key)
}

fn lookup<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.form().get(key).or_else(|| req.query().get(key))
}

/// First value for `key`, or an empty string.
///
/// ```rust
/// use req::{Request, get_string};
///
/// let req = Request::new("GET", "/search?q=rust&q=go");
/// assert_eq!(get_string(&req, "q"), "rust");
/// assert_eq!(get_string(&req, "missing"), "");
/// ```
pub fn get_string(req: &Request, key: &str) -> String {
    lookup(req, key).unwrap_or_default().to_string()
}

/// First value for `key`, or `default` when missing or empty.
pub fn get_string_or(req: &Request, key: &str, default: &str) -> String {
    match lookup(req, key) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

/// First value for `key` with surrounding whitespace removed.
pub fn get_string_trimmed(req: &Request, key: &str) -> String {
    get_string(req, key).trim().to_string()
}

/// Trimmed value for `key`, or the trimmed `default` when that is empty.
pub fn get_string_trimmed_or(req: &Request, key: &str, default: &str) -> String {
    let value = get_string_trimmed(req, key);
    if value.is_empty() {
        default.trim().to_string()
    } else {
        value
    }
}

/// Parse the value for `key`, or `None` when missing, empty or malformed.
pub fn get_parsed<T: FromParam>(req: &Request, key: &str) -> Option<T> {
    lookup(req, key)
        .filter(|value| !value.is_empty())
        .and_then(T::from_param)
}

/// Parse the value for `key`, falling back to `default`.
pub fn get_parsed_or<T: FromParam>(req: &Request, key: &str, default: T) -> T {
    get_parsed(req, key).unwrap_or(default)
}

/// Value for `key` as a platform-width integer, or 0.
pub fn get_int(req: &Request, key: &str) -> isize {
    get_parsed_or(req, key, 0)
}

/// Value for `key` as a platform-width integer, or `default`.
pub fn get_int_or(req: &Request, key: &str, default: isize) -> isize {
    get_parsed_or(req, key, default)
}

/// Value for `key` as an `i64`, or 0.
pub fn get_int64(req: &Request, key: &str) -> i64 {
    get_parsed_or(req, key, 0)
}

/// Value for `key` as an `i64`, or `default`.
pub fn get_int64_or(req: &Request, key: &str, default: i64) -> i64 {
    get_parsed_or(req, key, default)
}

/// Value for `key` as an `f64`, or 0.0.
pub fn get_float64(req: &Request, key: &str) -> f64 {
    get_parsed_or(req, key, 0.0)
}

/// Value for `key` as an `f64`, or `default`.
pub fn get_float64_or(req: &Request, key: &str, default: f64) -> f64 {
    get_parsed_or(req, key, default)
}

/// Value for `key` as a boolean, or `false`.
pub fn get_bool(req: &Request, key: &str) -> bool {
    get_parsed_or(req, key, false)
}

/// Value for `key` as a boolean, or `default`.
pub fn get_bool_or(req: &Request, key: &str, default: bool) -> bool {
    get_parsed_or(req, key, default)
}

/// Alias of [`get_string`].
pub fn value(req: &Request, key: &str) -> String {
    get_string(req, key)
}

/// Alias of [`get_string_or`].
pub fn value_or(req: &Request, key: &str, default: &str) -> String {
    get_string_or(req, key, default)
}

/// Alias of [`get_string_trimmed`].
pub fn trimmed_value(req: &Request, key: &str) -> String {
    get_string_trimmed(req, key)
}

/// Alias of [`get_string_trimmed_or`].
pub fn trimmed_value_or(req: &Request, key: &str, default: &str) -> String {
    get_string_trimmed_or(req, key, default)
}
