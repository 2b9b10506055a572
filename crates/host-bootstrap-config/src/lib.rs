//! Layered configuration store used while bootstrapping a host.
//!
//! Providers are registered in precedence order (later wins on key collision)
//! and merged into a queryable [`Configuration`] view. The merged view is only
//! rebuilt when [`ConfigurationManager::recompute`] is called, so a batch of
//! providers can be registered without reloading files or the environment
//! after each addition.
//!
//! Keys are hierarchical, with segments joined by [`KEY_DELIMITER`], and are
//! compared case-insensitively.

mod configuration;
mod error;
mod manager;
mod providers;
mod source;

pub use configuration::Configuration;
pub use error::ConfigError;
pub use manager::ConfigurationManager;
pub use providers::{
    parse_command_line, CommandLineProvider, EnvironmentVariablesProvider, MemoryProvider,
    TomlFileProvider,
};
pub use source::{ConfigSource, ConfigSourceKind, ConfigurationProvider, ProviderData};

/// Separator between the segments of a hierarchical key.
pub const KEY_DELIMITER: &str = ":";

/// Normalises a key for storage and lookup.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

/// Joins `parent` and `child` with [`KEY_DELIMITER`], skipping an empty parent.
pub fn combine_key(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_owned()
    } else {
        format!("{parent}{KEY_DELIMITER}{child}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_normalise_to_lowercase() {
        assert_eq!(normalize_key(" Logging:Level "), "logging:level");
    }

    #[test]
    fn combine_skips_empty_parent() {
        assert_eq!(combine_key("", "a"), "a");
        assert_eq!(combine_key("a", "b"), "a:b");
    }
}
