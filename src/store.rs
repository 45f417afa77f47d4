//! JSON documents holding a [`LifeConfig`]

use crate::LifeConfig;
use log::info;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn to_json(config: &LifeConfig) -> Result<String, StoreError> {
    Ok(serde_json::to_string(config)?)
}

pub fn from_json(document: &str) -> Result<LifeConfig, StoreError> {
    Ok(serde_json::from_str(document)?)
}

/// Writes `config` to `path`, replacing any existing file
pub fn save<P: AsRef<Path>>(path: P, config: &LifeConfig) -> Result<(), StoreError> {
    let path = path.as_ref();
    let document = to_json(config)?;
    fs::write(path, document).map_err(|source| StoreError::Io {
        path: path.to_owned(),
        source,
    })?;
    info!(
        "saved {}x{} grid to {}",
        config.columns,
        config.rows,
        path.display()
    );
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<LifeConfig, StoreError> {
    let path = path.as_ref();
    let document = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_owned(),
        source,
    })?;
    let config = from_json(&document)?;
    info!(
        "loaded {}x{} document from {}",
        config.columns,
        config.rows,
        path.display()
    );
    Ok(config)
}
