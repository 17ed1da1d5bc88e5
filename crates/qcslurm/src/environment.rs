use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cluster::Cluster;
use crate::common::error::QcError;
use crate::detect::Backend;

const BUILTIN_ENVIRONMENTS: &str = include_str!("../default_environments.json");

/// Software environment of a single code on a single cluster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentEntry {
    /// Modules to load, in order.
    pub modules: Vec<String>,
    /// Main executable (or installation directory for ORCA).
    pub exe: String,
    /// MPI installation used by ORCA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpi: Option<String>,
}

/// Maps every cluster to the environments of the codes installed on it.
///
/// It is loaded once and then passed around by reference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentRegistry {
    clusters: BTreeMap<Cluster, BTreeMap<Backend, EnvironmentEntry>>,
}

impl EnvironmentRegistry {
    /// Registry shipped together with the binary.
    pub fn builtin() -> crate::Result<Self> {
        log::debug!("Using built-in environments");
        Self::from_json(BUILTIN_ENVIRONMENTS)
    }

    pub fn from_json(data: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        log::debug!("Loading environments from {}", path.display());
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, cluster: Cluster, backend: Backend, entry: EnvironmentEntry) {
        self.clusters
            .entry(cluster)
            .or_default()
            .insert(backend, entry);
    }

    pub fn get(&self, cluster: Cluster, backend: Backend) -> crate::Result<&EnvironmentEntry> {
        self.clusters
            .get(&cluster)
            .and_then(|backends| backends.get(&backend))
            .ok_or_else(|| QcError::missing_environment(cluster, backend))
    }
}
