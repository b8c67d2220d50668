//! A dictionary that can hold multiple values per key.
//!
//! Submitted form data is a [`MultiValueDict`]: multi-valued fields
//! (select-multiple, checkbox groups, multiple hidden inputs) submit the same
//! key several times, every other field reads the last value.

use std::collections::hash_map;
use std::collections::HashMap;
use std::hash::Hash;

/// A dictionary that maps keys to lists of values.
///
/// [`get`](MultiValueDict::get) returns the **last** value for a key, while
/// [`get_list`](MultiValueDict::get_list) returns all values.
///
/// # Examples
///
/// ```
/// use plugform_core::utils::MultiValueDict;
///
/// let mut d = MultiValueDict::new();
/// d.append("color".to_string(), "red");
/// d.append("color".to_string(), "blue");
///
/// assert_eq!(d.get(&"color".to_string()), Some(&"blue"));
/// assert_eq!(d.get_list(&"color".to_string()), &["red", "blue"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiValueDict<K: Eq + Hash, V> {
    inner: HashMap<K, Vec<V>>,
}

impl<K: Eq + Hash, V> Default for MultiValueDict<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> MultiValueDict<K, V> {
    /// Creates an empty `MultiValueDict`.
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Returns a reference to the **last** value associated with the key,
    /// or `None` if the key is not present.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key).and_then(|v| v.last())
    }

    /// Returns all values associated with the key (empty if absent).
    pub fn get_list(&self, key: &K) -> &[V] {
        self.inner.get(key).map_or(&[], Vec::as_slice)
    }

    /// Sets the value for a key, replacing any existing values.
    pub fn set(&mut self, key: K, value: V) {
        self.inner.insert(key, vec![value]);
    }

    /// Sets all values for a key, replacing any existing values.
    pub fn set_list(&mut self, key: K, values: Vec<V>) {
        self.inner.insert(key, values);
    }

    /// Appends a value to the list for the given key.
    pub fn append(&mut self, key: K, value: V) {
        self.inner.entry(key).or_default().push(value);
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> hash_map::Keys<'_, K, Vec<V>> {
        self.inner.keys()
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the dictionary contains no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` if the dictionary contains the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Returns an iterator over (key, value-list) pairs.
    pub fn iter(&self) -> hash_map::Iter<'_, K, Vec<V>> {
        self.inner.iter()
    }
}

impl MultiValueDict<String, String> {
    /// Builds submitted form data from `(key, value)` pairs, appending
    /// repeated keys.
    ///
    /// ```
    /// use plugform_core::utils::MultiValueDict;
    ///
    /// let data = MultiValueDict::from_pairs([("tags", "a"), ("tags", "b"), ("name", "x")]);
    /// assert_eq!(data.get_list(&"tags".to_string()).len(), 2);
    /// ```
    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Returns the last value for a string key.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.inner.get(key).and_then(|v| v.last()).map(String::as_str)
    }

    /// Returns all values for a string key.
    pub fn values_of(&self, key: &str) -> &[String] {
        self.inner.get(key).map_or(&[], Vec::as_slice)
    }
}

impl<A: Into<String>, B: Into<String>> FromIterator<(A, B)> for MultiValueDict<String, String> {
    fn from_iter<I: IntoIterator<Item = (A, B)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (key, value) in iter {
            dict.append(key.into(), value.into());
        }
        dict
    }
}

impl<'a, K: Eq + Hash, V> IntoIterator for &'a MultiValueDict<K, V> {
    type Item = (&'a K, &'a Vec<V>);
    type IntoIter = hash_map::Iter<'a, K, Vec<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let d: MultiValueDict<String, String> = MultiValueDict::new();
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
    }

    #[test]
    fn test_append_and_get_returns_last() {
        let mut d = MultiValueDict::new();
        d.append("color", "red");
        d.append("color", "blue");
        d.append("color", "green");

        assert_eq!(d.get(&"color"), Some(&"green"));
        assert_eq!(d.get_list(&"color"), &["red", "blue", "green"]);
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_set_replaces_existing() {
        let mut d = MultiValueDict::new();
        d.append("k", "a");
        d.append("k", "b");
        d.set("k", "c");
        assert_eq!(d.get_list(&"k"), &["c"]);
    }

    #[test]
    fn test_get_missing_key() {
        let d: MultiValueDict<&str, &str> = MultiValueDict::new();
        assert_eq!(d.get(&"missing"), None);
        assert!(d.get_list(&"missing").is_empty());
    }

    #[test]
    fn test_from_pairs_and_string_accessors() {
        let d = MultiValueDict::from_pairs([("a", "1"), ("b", "2"), ("a", "3")]);
        assert_eq!(d.value("a"), Some("3"));
        assert_eq!(d.values_of("a"), &["1".to_string(), "3".to_string()]);
        assert_eq!(d.value("missing"), None);
        assert!(d.values_of("missing").is_empty());
    }

    #[test]
    fn test_set_list() {
        let mut d: MultiValueDict<String, String> = MultiValueDict::new();
        d.set_list("x".into(), vec!["1".into(), "2".into()]);
        assert_eq!(d.values_of("x").len(), 2);
    }
}
