use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{normalize_key, ConfigError, ProviderData, KEY_DELIMITER};

/// Immutable merged view produced by a recompute.
///
/// Cloning is cheap; every clone observes the same values until the owning
/// [`ConfigurationManager`](crate::ConfigurationManager) recomputes and hands
/// out a new view.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Configuration {
    data: Arc<ProviderData>,
}

impl Configuration {
    pub(crate) fn from_data(data: ProviderData) -> Self {
        Configuration {
            data: Arc::new(data),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(&normalize_key(key)).map(String::as_str)
    }

    /// Parses the value at `key`, returning `Ok(None)` when the key is absent.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|err: T::Err| ConfigError::InvalidValue {
                    key: normalize_key(key),
                    value: value.to_owned(),
                    message: err.to_string(),
                }),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(&normalize_key(key))
    }

    /// Returns the keys nested under `prefix`, with the prefix removed.
    pub fn section(&self, prefix: &str) -> Configuration {
        let prefix = format!("{}{KEY_DELIMITER}", normalize_key(prefix));
        let data = self
            .data
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .map(|child| (child.to_owned(), value.clone()))
            })
            .collect();
        Configuration::from_data(data)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.data.len()))?;
        for (key, value) in self.data.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
