use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// String-keyed bag of arbitrary values shared between builder callbacks.
///
/// The bootstrap builder only allocates and exposes the bag; callers decide
/// what goes in it.
#[derive(Default)]
pub struct Properties {
    entries: HashMap<String, Box<dyn Any>>,
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Properties").field("keys", &keys).finish()
    }
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning the previous value if any.
    pub fn insert<T: Any>(&mut self, key: impl Into<String>, value: T) -> Option<Box<dyn Any>> {
        self.entries.insert(key.into(), Box::new(value))
    }

    /// Returns the value under `key` if it exists and has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref()
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)?.downcast_mut()
    }

    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Any>> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_access_requires_matching_type() {
        let mut properties = Properties::new();
        assert!(properties.insert("retries", 3u32).is_none());

        assert_eq!(properties.get::<u32>("retries"), Some(&3));
        assert_eq!(properties.get::<String>("retries"), None);

        *properties.get_mut::<u32>("retries").expect("present") += 1;
        assert_eq!(properties.get::<u32>("retries"), Some(&4));
    }

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut properties = Properties::new();
        properties.insert("name", "first".to_string());
        let previous = properties.insert("name", "second".to_string());

        let previous = previous.expect("previous value");
        assert_eq!(previous.downcast_ref::<String>().map(String::as_str), Some("first"));
        assert_eq!(properties.len(), 1);
        assert!(properties.remove("name").is_some());
        assert!(properties.is_empty());
    }
}
