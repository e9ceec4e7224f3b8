use std::path::PathBuf;

use crate::error::ConfigError;
use crate::process::{ProcfsSource, StatusDir, StatusSource};

/// Slots in the shared pool when nothing else is configured.
pub const DEFAULT_CAPACITY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One labelled text block per process.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// Run settings, usually filled from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on the slot pool size. The pool never gets more slots
    /// than there are workers.
    pub capacity: usize,
    /// Read `<root>/<pid>/status` text instead of going through procfs.
    pub proc_root: Option<PathBuf>,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            capacity: DEFAULT_CAPACITY,
            proc_root: None,
            format: OutputFormat::Human,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidCapacity(self.capacity));
        }
        if let Some(root) = &self.proc_root {
            if !root.is_dir() {
                return Err(ConfigError::ProcRootMissing(root.display().to_string()));
            }
        }
        Ok(())
    }

    /// Pool size for a run with `workers` workers.
    pub fn pool_capacity(&self, workers: usize) -> usize {
        self.capacity.min(workers).max(1)
    }

    pub fn status_source(&self) -> Box<dyn StatusSource> {
        match &self.proc_root {
            Some(root) => Box::new(StatusDir::new(root.clone())),
            None => Box::new(ProcfsSource),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.capacity, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let config = Config {
            capacity: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCapacity(0))));
    }

    #[test]
    fn missing_proc_root_is_invalid() {
        let config = Config {
            proc_root: Some(PathBuf::from("/definitely/not/here")),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ProcRootMissing(_))));
    }

    #[test]
    fn pool_never_exceeds_worker_count() {
        let config = Config::default();
        assert_eq!(config.pool_capacity(10), 3);
        assert_eq!(config.pool_capacity(2), 2);
    }
}
