/* src/maps.rs */

use std::collections::{BTreeMap, HashMap};

use crate::request::Request;
use crate::values::Values;

/// Outer bracket key. Numeric keys sort numerically and before named ones.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum OuterKey {
    Index(i64),
    Name(String),
}

impl OuterKey {
    fn parse(text: &str) -> Self {
        match text.parse() {
            Ok(index) => OuterKey::Index(index),
            Err(_) => OuterKey::Name(text.to_string()),
        }
    }
}

/// Collect `key[outer][inner]` parameters into a list of records.
///
/// Values are grouped by `inner` in ascending `outer` order, then transposed:
/// record `i` holds the `i`-th value of every inner key, padded with `""`
/// where a group is shorter than the longest one. Returns `default` when no
/// well-formed key matches.
///
/// ```rust
/// use req::{Request, maps};
///
/// let req = Request::new("GET", "/?rows%5B0%5D%5Bname%5D=Alice&rows%5B1%5D%5Bname%5D=Bob");
/// let rows = maps(&req, "rows", vec![]);
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0]["name"], "Alice");
/// assert_eq!(rows[1]["name"], "Bob");
/// ```
pub fn maps(
    req: &Request,
    key: &str,
    default: Vec<HashMap<String, String>>,
) -> Vec<HashMap<String, String>> {
    let groups = group_entries(&req.all(), key);

    let rows = groups.values().map(Vec::len).max().unwrap_or(0);
    if rows == 0 {
        return default;
    }

    (0..rows)
        .map(|i| {
            groups
                .iter()
                .map(|(inner, values)| (inner.clone(), values.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}

fn group_entries(all: &Values, key: &str) -> BTreeMap<String, Vec<String>> {
    let prefix = format!("{key}[");

    let mut entries: Vec<(OuterKey, &str, &[String])> = all
        .iter()
        .filter_map(|(k, values)| {
            let (outer, inner) = split_groups(k.strip_prefix(&prefix)?.strip_suffix(']')?)?;
            Some((OuterKey::parse(outer), inner, values.as_slice()))
        })
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (_, inner, values) in entries {
        groups
            .entry(inner.to_string())
            .or_default()
            .extend(values.iter().cloned());
    }
    groups
}

/// Split `outer][inner` into its two parts. Anything other than exactly two
/// non-empty groups is rejected.
fn split_groups(suffix: &str) -> Option<(&str, &str)> {
    let mut parts = suffix.split("][");
    let outer = parts.next()?;
    let inner = parts.next()?;
    if parts.next().is_some() || outer.is_empty() || inner.is_empty() {
        return None;
    }
    Some((outer, inner))
}
