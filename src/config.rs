use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::preview::DEFAULT_PREVIEW_ROWS;

/// HTTP service settings. Every field is optional in the YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub allowed_origins: Vec<String>,
    pub default_preview_rows: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: 1,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
            ],
            default_preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl ServiceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: ServiceConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let config: ServiceConfig = serde_yaml::from_str(input).context("Parsing config YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        workers: Option<usize>,
    ) -> Result<Self> {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(workers) = workers {
            self.workers = workers;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.host.trim().is_empty(), "host must not be empty");
        ensure!(self.workers > 0, "workers must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = ServiceConfig::from_yaml_str("port: 9000\n").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.workers, 1);
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.default_preview_rows, 100);
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "host: 127.0.0.1\nallowed_origins:\n  - https://example.test\n"
        )
        .unwrap();
        let config = ServiceConfig::load(file.path())
            .unwrap()
            .with_overrides(None, Some(8080), Some(4))
            .unwrap();
        assert_eq!(config.bind_address(), ("127.0.0.1".to_string(), 8080));
        assert_eq!(config.workers, 4);
        assert_eq!(config.allowed_origins, vec!["https://example.test"]);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = ServiceConfig::default()
            .with_overrides(None, None, Some(0))
            .unwrap_err();
        assert!(err.to_string().contains("workers"));
    }
}
