//! An insertion-ordered name → value map.
//!
//! Both decoded results and parameter maps use it. Iteration follows the order in
//! which names were first inserted; inserting an existing name replaces the value
//! in place (last write wins), which is how duplicate column names collapse.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct VarTable<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for VarTable<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> VarTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts `value` under `name` and returns the value it replaced, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        match self.index.get(&name) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Builder-style [`VarTable::insert`].
    pub fn with(mut self, name: impl Into<String>, value: V) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.index.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for VarTable<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut table = Self::with_capacity(iter.size_hint().0);
        for (name, value) in iter {
            table.insert(name, value);
        }
        table
    }
}

impl<V> IntoIterator for VarTable<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_names_keep_first_position_and_last_value() {
        let table: VarTable<i32> = [("x", 1), ("y", 2), ("x", 3)].into_iter().collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(table.get("x"), Some(&3));
        assert_eq!(table.get("y"), Some(&2));
    }

    #[test]
    fn test_insert_returns_replaced_value() {
        let mut table = VarTable::new();
        assert_eq!(table.insert("a", "first"), None);
        assert_eq!(table.insert("a", "second"), Some("first"));
        assert!(table.contains("a"));
        assert!(!table.contains("b"));
        assert_eq!(table.get("b"), None);
    }
}
