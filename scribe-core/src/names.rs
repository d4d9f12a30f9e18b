//! Collision-free names for generated declarations.

use std::hash::Hash;

use indexmap::IndexMap;

/// Hands out a unique name per key.
///
/// The first key asking for a name gets it unchanged; later keys asking for
/// the same name get `{name}Dup{n}`. Asking again for a key that already has
/// a name returns the name it was given the first time.
///
/// # Example
///
/// ```
/// use scribe_core::NameStore;
///
/// let mut names = NameStore::new();
/// assert_eq!(names.insert(("User", "v1"), "User"), "User");
/// assert_eq!(names.insert(("User", "v2"), "User"), "UserDup1");
/// assert_eq!(names.insert(("User", "v1"), "Other"), "User");
/// ```
#[derive(Debug, Clone)]
pub struct NameStore<K> {
    /// Requested name -> times it has been handed out
    counts: IndexMap<String, usize>,
    names: IndexMap<K, String>,
}

impl<K: Hash + Eq> NameStore<K> {
    pub fn new() -> Self {
        Self {
            counts: IndexMap::new(),
            names: IndexMap::new(),
        }
    }

    /// Name `key`, returning the name it ends up with.
    pub fn insert(&mut self, key: K, name: &str) -> &str {
        let count = self.counts.entry(name.to_string()).or_insert(0);
        let entry = self.names.entry(key).or_insert_with(|| {
            let unique = Self::new_name(name, *count);
            *count += 1;
            unique
        });
        entry.as_str()
    }

    pub fn get(&self, key: &K) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.names.contains_key(key)
    }

    /// The `i`-th name handed out for `name`.
    pub fn new_name(name: &str, i: usize) -> String {
        if i == 0 {
            name.to_string()
        } else {
            format!("{}Dup{}", name, i)
        }
    }

    /// Assigned names in the order their keys were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &str)> {
        self.names.iter().map(|(key, name)| (key, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Hash + Eq> Default for NameStore<K> {
    fn default() -> Self {
        Self::new()
    }
}
