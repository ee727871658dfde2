use crate::{Error, Result};
use log::warn;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_MAX_LIST_COUNT: usize = 10_000;

fn default_max_list_count() -> usize {
    DEFAULT_MAX_LIST_COUNT
}

/// Server side configuration, loaded from a json file such as
/// `{ "max_list_count": 1000 }`.
#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    /// upper bound of pairs returned by a single list request
    #[serde(default = "default_max_list_count")]
    pub(crate) max_list_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_list_count: DEFAULT_MAX_LIST_COUNT,
        }
    }
}

impl Config {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let buf = std::fs::read(path)?;
        Self::from_slice(&buf)
    }

    pub fn from_slice(buf: &[u8]) -> Result<Self> {
        let config: Config = serde_json::from_slice(buf)
            .map_err(|e| Error::Corrupt(format!("cannot deserialze Config: {e}")))?;
        if config.max_list_count == 0 {
            warn!("max_list_count is 0, fall back to {DEFAULT_MAX_LIST_COUNT}");
            return Ok(Self::default());
        }
        Ok(config)
    }

    #[inline]
    pub fn max_list_count(&self) -> usize {
        self.max_list_count
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_config() {
        let config = Config::from_slice(br#"{"max_list_count": 42}"#).unwrap();
        assert_eq!(config.max_list_count(), 42);

        let config = Config::from_slice(b"{}").unwrap();
        assert_eq!(config.max_list_count(), DEFAULT_MAX_LIST_COUNT);

        let config = Config::from_slice(br#"{"max_list_count": 0}"#).unwrap();
        assert_eq!(config.max_list_count(), DEFAULT_MAX_LIST_COUNT);

        assert!(matches!(
            Config::from_slice(b"not json"),
            Err(Error::Corrupt(_))
        ));
    }
}
