pub mod catalog;
pub mod ruleset;
pub mod validate;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("unable to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse yaml '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| DataError::Yaml {
        path: path.display().to_string(),
        source,
    })
}
