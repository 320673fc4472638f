use arch::{Addr, MAX_MEMORY_SIZE, MEMORY_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Machine configuration, read from YAML. Command line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Memory size in words.
    pub memory_size: usize,
    /// Fault after this many retired instructions.
    pub tmax: Option<u64>,
    pub log: PathBuf,
    pub truncate_log: bool,
    /// Dumps keyed by the PC of the instruction they follow.
    pub dump: HashMap<Addr, DumpRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DumpRequest {
    pub memory: Vec<Addr>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config `{0}`: {1}")]
    Read(String, #[source] std::io::Error),

    #[error("Malformed config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("memory_size {0} is out of range 1..=65536")]
    MemorySize(usize),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            memory_size: MEMORY_SIZE,
            tmax: None,
            log: PathBuf::from("cpu.log"),
            truncate_log: false,
            dump: HashMap::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
        Config::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_yaml::from_str(text)?;
        if config.memory_size == 0 || config.memory_size > MAX_MEMORY_SIZE {
            return Err(ConfigError::MemorySize(config.memory_size));
        }
        Ok(config)
    }
}
