use std::path::PathBuf;

use thiserror::Error;

use crate::cluster::Cluster;
use crate::common::error::QcError::GenericError;
use crate::detect::Backend;

#[derive(Debug, Error)]
pub enum QcError {
    #[error("Invalid job configuration: {0}")]
    ConfigurationError(String),
    #[error("Code could not be resolved from input file {0:?}")]
    UnrecognizedInputError(PathBuf),
    #[error("Missing environment definition for {backend} on {cluster}{detail}")]
    MissingEnvironmentDefinition {
        cluster: Cluster,
        backend: Backend,
        detail: String,
    },
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Error: {0}")]
    GenericError(String),
}

impl QcError {
    pub fn missing_environment(cluster: Cluster, backend: Backend) -> Self {
        Self::MissingEnvironmentDefinition {
            cluster,
            backend,
            detail: String::new(),
        }
    }
}

impl From<serde_json::error::Error> for QcError {
    fn from(e: serde_json::error::Error) -> Self {
        Self::DeserializationError(e.to_string())
    }
}

impl From<anyhow::Error> for QcError {
    fn from(error: anyhow::Error) -> Self {
        Self::GenericError(error.to_string())
    }
}

pub fn error<T>(message: String) -> crate::Result<T> {
    Err(GenericError(message))
}

impl From<String> for QcError {
    fn from(e: String) -> Self {
        GenericError(e)
    }
}
