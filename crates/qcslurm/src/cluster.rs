use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::common::utils::network::get_hostname;

/// HPC clusters that we know how to generate job scripts for.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Saga,
    Fram,
    Betzy,
}

/// Cluster used when the host name does not belong to any known cluster.
pub const DEFAULT_CLUSTER: Cluster = Cluster::Saga;

/// Domain suffixes of the known clusters, in the order in which they are checked.
const CLUSTER_DOMAINS: [(&str, Cluster); 3] = [
    ("fram.sigma2.no", Cluster::Fram),
    ("saga.sigma2.no", Cluster::Saga),
    ("betzy.sigma2.no", Cluster::Betzy),
];

impl Cluster {
    pub fn name(&self) -> &'static str {
        match self {
            Cluster::Saga => "saga",
            Cluster::Fram => "fram",
            Cluster::Betzy => "betzy",
        }
    }

    /// Fram allocates whole nodes and rejects explicit memory requests.
    pub fn accepts_memory_directive(&self) -> bool {
        !matches!(self, Cluster::Fram)
    }
}

impl Display for Cluster {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a host name into one of the known clusters.
pub fn cluster_from_hostname(hostname: &str) -> Cluster {
    let hostname = hostname.trim_end_matches('.').to_lowercase();
    CLUSTER_DOMAINS
        .iter()
        .find(|(domain, _)| hostname == *domain || hostname.ends_with(&format!(".{domain}")))
        .map(|(_, cluster)| *cluster)
        .unwrap_or(DEFAULT_CLUSTER)
}

/// Determines which cluster we are currently running on.
pub fn resolve_cluster() -> Cluster {
    let hostname = get_hostname(None);
    let cluster = cluster_from_hostname(&hostname);
    log::debug!("Resolved host {hostname} to cluster {cluster}");
    cluster
}
