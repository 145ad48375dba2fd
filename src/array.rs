/* src/array.rs */

use crate::request::Request;
use crate::values::Values;

/// Collect the values for `key`, accepting three notations in order:
///
/// 1. Direct repetition: `key=a&key=b`
/// 2. Empty brackets: `key[]=a&key[]=b`
/// 3. Indexed brackets: `key[0]=a&key[1]=b`, ordered by index
///
/// Returns `default` when none of them match.
///
/// ```rust
/// use req::{Request, get_array};
///
/// let req = Request::new("GET", "/?a%5B1%5D=y&a%5B0%5D=x");
/// assert_eq!(get_array(&req, "a", vec![]), ["x", "y"]);
/// ```
pub fn get_array(req: &Request, key: &str, default: Vec<String>) -> Vec<String> {
    let all = req.all();

    if let Some(values) = all.get_all(key) {
        return values.to_vec();
    }

    if let Some(values) = all.get_all(&format!("{key}[]")) {
        return values.to_vec();
    }

    let indexed = indexed_values(&all, key);
    if indexed.is_empty() {
        return default;
    }
    indexed
}

/// Values of `key[<index>]` keys, sorted by index.
///
/// Index text that is not a decimal integer counts as 0, so malformed keys
/// all land at the front. Equal indexes keep key order.
fn indexed_values(all: &Values, key: &str) -> Vec<String> {
    let prefix = format!("{key}[");

    let mut entries: Vec<(i64, String)> = all
        .iter()
        .filter_map(|(k, values)| {
            let index = k.strip_prefix(&prefix)?.strip_suffix(']')?;
            let index = index.parse::<i64>().unwrap_or(0);
            Some((index, values.first().cloned().unwrap_or_default()))
        })
        .collect();

    entries.sort_by_key(|(index, _)| *index);
    entries.into_iter().map(|(_, value)| value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(query: &str) -> Request {
        Request::new("GET", &format!("/?{query}"))
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_direct_match() {
        let req = req("a=1&a=2&a%5B0%5D=ignored");
        assert_eq!(get_array(&req, "a", vec![]), strings(&["1", "2"]));
    }

    #[test]
    fn test_empty_bracket_notation() {
        let req = req("a%5B%5D=x&a%5B%5D=y");
        assert_eq!(get_array(&req, "a", vec![]), strings(&["x", "y"]));
    }

    #[test]
    fn test_indexed_notation_sorted() {
        let req = req("a%5B10%5D=c&a%5B2%5D=b&a%5B0%5D=a");
        assert_eq!(get_array(&req, "a", vec![]), strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_indexed_notation_with_gaps_is_compacted() {
        let req = req("a%5B0%5D=x&a%5B2%5D=y");
        assert_eq!(get_array(&req, "a", vec![]), strings(&["x", "y"]));
    }

    #[test]
    fn test_non_numeric_index_counts_as_zero() {
        let req = req("a%5B1%5D=one&a%5Bfoo%5D=foo");
        assert_eq!(get_array(&req, "a", vec![]), strings(&["foo", "one"]));
    }

    #[test]
    fn test_other_keys_do_not_match() {
        let req = req("ab%5B0%5D=x&b=1");
        assert_eq!(get_array(&req, "a", strings(&["d"])), strings(&["d"]));
    }

    #[test]
    fn test_form_values_are_included() {
        let req = Request::new("POST", "/?a%5B0%5D=query")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body("a%5B1%5D=form");
        assert_eq!(get_array(&req, "a", vec![]), strings(&["query", "form"]));
    }
}
