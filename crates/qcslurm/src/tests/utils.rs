use crate::cluster::Cluster;
use crate::config::{JobConfiguration, JobOptions};
use crate::environment::EnvironmentRegistry;

pub fn registry() -> EnvironmentRegistry {
    EnvironmentRegistry::builtin().unwrap()
}

pub fn config(identifier: &str, cluster: Cluster) -> JobConfiguration {
    JobConfiguration::with_cluster(
        JobOptions {
            account: Some("nn1234k".to_string()),
            identifier: Some(identifier.to_string()),
            ..Default::default()
        },
        cluster,
    )
    .unwrap()
}
