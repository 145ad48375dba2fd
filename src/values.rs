/* src/values.rs */

use std::collections::BTreeMap;
use std::collections::btree_map;

use url::form_urlencoded;

/// Multi-value parameter map, as decoded from a query string or form body.
///
/// Keys iterate in sorted order, which keeps every derived result stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values(BTreeMap<String, Vec<String>>);

impl Values {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `application/x-www-form-urlencoded` text (`a=1&b=2&a=3`).
    ///
    /// ```rust
    /// use req::Values;
    ///
    /// let values = Values::parse("a=1&b=hello+world&a=2");
    /// assert_eq!(values.get("a"), Some("1"));
    /// assert_eq!(values.get_all("a").unwrap(), ["1", "2"]);
    /// assert_eq!(values.get("b"), Some("hello world"));
    /// ```
    pub fn parse(input: &str) -> Self {
        Self::parse_bytes(input.as_bytes())
    }

    /// Decode urlencoded bytes. Invalid UTF-8 is replaced rather than rejected.
    pub fn parse_bytes(input: &[u8]) -> Self {
        form_urlencoded::parse(input)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// First value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for `key`, in the order they were received.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Whether `key` is present, even with an empty value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Append a value to `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Replace every value of `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), vec![value.into()]);
    }

    /// Overlay `other` onto this map. Keys present in `other` replace the
    /// whole value list held here.
    pub fn merge(&mut self, other: &Values) {
        for (key, values) in &other.0 {
            self.0.insert(key.clone(), values.clone());
        }
    }

    /// Iterate over keys in sorted order with all their values.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.0.iter()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Values
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Values::new();
        for (key, value) in iter {
            values.add(key, value);
        }
        values
    }
}

impl<'a> IntoIterator for &'a Values {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
