//! Shared test harness utilities for host-bootstrap crates.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use host_bootstrap_config::{
    ConfigError, ConfigSource, ConfigSourceKind, ConfigurationProvider, ProviderData,
};

/// Ordered record of events shared between callbacks and providers.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|recorded| recorded.as_str() == entry)
            .count()
    }
}

/// In-memory provider that records `label` in a [`CallLog`] on every load.
pub struct CountingProvider {
    label: String,
    log: CallLog,
    data: ProviderData,
}

impl CountingProvider {
    pub fn new(label: impl Into<String>, log: &CallLog) -> Self {
        CountingProvider {
            label: label.into(),
            log: log.clone(),
            data: ProviderData::new(),
        }
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.data
            .insert(host_bootstrap_config::normalize_key(key), value.to_owned());
        self
    }
}

impl ConfigurationProvider for CountingProvider {
    fn source(&self) -> ConfigSource {
        ConfigSource::new(ConfigSourceKind::Memory)
    }

    fn load(&self) -> Result<ProviderData, ConfigError> {
        self.log.push(self.label.clone());
        Ok(self.data.clone())
    }
}

/// Writes `contents` to `path`, creating parent directories.
pub fn write_file(path: impl AsRef<Path>, contents: &str) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    let mut file = fs::File::create(path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
}
