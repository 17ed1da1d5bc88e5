use serde::{Deserialize, Serialize};

use crate::cluster::{Cluster, resolve_cluster};
use crate::common::error::QcError;
use crate::directives::{DirectiveBlock, build_directives};

pub const DEFAULT_PARTITION: &str = "Normal";
pub const DEFAULT_QOS: &str = "Devel";
pub const DEFAULT_TIMELIMIT: &str = "30:00";
pub const DEFAULT_MEMORY: &str = "5GB";
pub const DEFAULT_IDENTIFIER: &str = "JobName";
pub const DEFAULT_MAIL: &str = "None";
pub const DEFAULT_NODES: u32 = 1;
pub const DEFAULT_TASKS: u32 = 16;
pub const DEFAULT_CPUS_PER_TASK: u32 = 8;

/// How the requested memory is accounted by Slurm.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum MemoryMode {
    /// Memory per node (`--mem`)
    #[default]
    #[value(name = "tot")]
    Total,
    /// Memory per allocated CPU (`--mem-per-cpu`)
    #[value(name = "cpu")]
    PerCpu,
}

/// The way in which the parallel resources of a job are requested.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParallelScheme {
    /// Explicit number of nodes with a number of tasks on each of them.
    Nodes { nodes: u32, tasks_per_node: u32 },
    /// MPI tasks, each with several OpenMP threads.
    Hybrid { tasks: u32, cpus_per_task: u32 },
    /// Only a total number of MPI tasks.
    Tasks { tasks: u32 },
}

/// Options as supplied by the user. Everything that is missing is filled with defaults.
#[derive(Clone, Debug, Default)]
pub struct JobOptions {
    pub account: Option<String>,
    pub timelimit: Option<String>,
    pub memory: Option<String>,
    pub memory_mode: Option<MemoryMode>,
    pub nodes: Option<u32>,
    pub ntasks: Option<u32>,
    pub cpus_per_task: Option<u32>,
    pub ext_input: Option<String>,
    pub ext_output: Option<String>,
    pub ext_log: Option<String>,
    pub ext_error: Option<String>,
    pub mail: Option<String>,
    pub identifier: Option<String>,
    pub partition: Option<String>,
    pub qos: Option<String>,
    pub cluster: Option<Cluster>,
    pub explicit_nodes: bool,
    pub hybrid: bool,
    pub devel: bool,
    pub exclusive: bool,
}

/// Validated resource request of a single job.
///
/// The directives are never stored, they are always derived from the current field values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobConfiguration {
    pub account: String,
    pub timelimit: String,
    pub memory: String,
    pub memory_mode: MemoryMode,
    pub nodes: u32,
    pub ntasks: u32,
    pub cpus_per_task: u32,
    pub identifier: String,
    pub ext_input: String,
    pub ext_output: String,
    pub ext_log: String,
    pub ext_error: String,
    pub mail: String,
    pub cluster: Cluster,
    pub partition: String,
    pub qos: String,
    pub explicit_nodes: bool,
    pub hybrid: bool,
    pub devel: bool,
    pub exclusive: bool,
}

fn validate_memory(memory: &str) -> crate::Result<()> {
    if memory.to_lowercase().ends_with('b') {
        Ok(())
    } else {
        Err(QcError::ConfigurationError(format!(
            "Invalid memory units in `{memory}`, the amount has to end with `B`"
        )))
    }
}

/// Removes the input extension from the end of the identifier, once.
fn normalize_identifier(identifier: String, ext_input: &str) -> String {
    if let Some(stripped) = identifier
        .strip_suffix(ext_input)
        .filter(|stripped| !ext_input.is_empty() && !stripped.is_empty())
    {
        log::debug!("Removing input extension from job identifier {identifier}");
        return stripped.to_string();
    }
    identifier
}

impl JobConfiguration {
    /// Builds the configuration, resolving the cluster from the host name if it was not given.
    pub fn new(opts: JobOptions) -> crate::Result<Self> {
        let cluster = opts.cluster.unwrap_or_else(resolve_cluster);
        Self::with_cluster(opts, cluster)
    }

    /// Builds the configuration for an explicitly selected cluster.
    pub fn with_cluster(opts: JobOptions, cluster: Cluster) -> crate::Result<Self> {
        let memory = opts.memory.unwrap_or_else(|| DEFAULT_MEMORY.to_string());
        validate_memory(&memory)?;

        let ext_input = opts.ext_input.unwrap_or_else(|| ".inp".to_string());
        let identifier = normalize_identifier(
            opts.identifier
                .unwrap_or_else(|| DEFAULT_IDENTIFIER.to_string()),
            &ext_input,
        );

        if opts.explicit_nodes && opts.hybrid {
            log::warn!("Both explicit node count and hybrid scheme requested, using node count");
        }

        Ok(Self {
            account: opts.account.unwrap_or_default(),
            timelimit: opts
                .timelimit
                .unwrap_or_else(|| DEFAULT_TIMELIMIT.to_string()),
            memory,
            memory_mode: opts.memory_mode.unwrap_or_default(),
            nodes: opts.nodes.unwrap_or(DEFAULT_NODES),
            ntasks: opts.ntasks.unwrap_or(DEFAULT_TASKS),
            cpus_per_task: opts.cpus_per_task.unwrap_or(DEFAULT_CPUS_PER_TASK),
            identifier,
            ext_input,
            ext_output: opts.ext_output.unwrap_or_else(|| ".out".to_string()),
            ext_log: opts.ext_log.unwrap_or_else(|| ".log".to_string()),
            ext_error: opts.ext_error.unwrap_or_else(|| ".err".to_string()),
            mail: opts.mail.unwrap_or_else(|| DEFAULT_MAIL.to_string()),
            cluster,
            partition: opts
                .partition
                .unwrap_or_else(|| DEFAULT_PARTITION.to_string()),
            qos: opts.qos.unwrap_or_else(|| DEFAULT_QOS.to_string()),
            explicit_nodes: opts.explicit_nodes,
            hybrid: opts.hybrid,
            devel: opts.devel,
            exclusive: opts.exclusive,
        })
    }

    /// Explicit node count takes precedence over the hybrid scheme.
    pub fn parallel_scheme(&self) -> ParallelScheme {
        if self.explicit_nodes {
            ParallelScheme::Nodes {
                nodes: self.nodes,
                tasks_per_node: self.ntasks,
            }
        } else if self.hybrid {
            ParallelScheme::Hybrid {
                tasks: self.ntasks,
                cpus_per_task: self.cpus_per_task,
            }
        } else {
            ParallelScheme::Tasks { tasks: self.ntasks }
        }
    }

    pub fn directives(&self) -> DirectiveBlock {
        build_directives(self)
    }

    pub fn input_file(&self) -> String {
        format!("{}{}", self.identifier, self.ext_input)
    }

    pub fn output_file(&self) -> String {
        format!("{}{}", self.identifier, self.ext_output)
    }

    pub fn log_file(&self) -> String {
        format!("{}{}", self.identifier, self.ext_log)
    }

    pub fn error_file(&self) -> String {
        format!("{}{}", self.identifier, self.ext_error)
    }

    pub fn job_file(&self) -> String {
        format!("{}{}", self.identifier, crate::JOB_SCRIPT_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::{JobConfiguration, JobOptions, MemoryMode, ParallelScheme};
    use crate::cluster::Cluster;
    use crate::common::error::QcError;

    fn build(opts: JobOptions) -> crate::Result<JobConfiguration> {
        JobConfiguration::with_cluster(opts, Cluster::Saga)
    }

    fn with_memory(memory: &str) -> crate::Result<JobConfiguration> {
        build(JobOptions {
            memory: Some(memory.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_defaults() {
        let config = build(JobOptions::default()).unwrap();
        assert_eq!(config.account, "");
        assert_eq!(config.timelimit, "30:00");
        assert_eq!(config.memory, "5GB");
        assert_eq!(config.memory_mode, MemoryMode::Total);
        assert_eq!(config.identifier, "JobName");
        assert_eq!(config.partition, "Normal");
        assert_eq!(config.mail, "None");
        assert_eq!(config.cluster, Cluster::Saga);
        assert_eq!(config.parallel_scheme(), ParallelScheme::Tasks { tasks: 16 });
    }

    #[test]
    fn test_explicit_cluster_is_kept() {
        for cluster in [Cluster::Saga, Cluster::Fram, Cluster::Betzy] {
            let config = JobConfiguration::new(JobOptions {
                cluster: Some(cluster),
                ..Default::default()
            })
            .unwrap();
            assert_eq!(config.cluster, cluster);
        }
    }

    #[test]
    fn test_valid_memory_units() {
        for memory in ["5GB", "500MB", "2gb", "100b", "3Tb", "1B"] {
            assert!(with_memory(memory).is_ok(), "{memory}");
        }
    }

    #[test]
    fn test_invalid_memory_units() {
        for memory in ["5G", "500", "", "2GiB ", "4GBs"] {
            assert!(
                matches!(with_memory(memory), Err(QcError::ConfigurationError(_))),
                "{memory}"
            );
        }
    }

    #[test]
    fn test_identifier_strips_input_extension() {
        let config = build(JobOptions {
            identifier: Some("water.inp".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.identifier, "water");
        assert_eq!(config.input_file(), "water.inp");
        assert_eq!(config.output_file(), "water.out");
        assert_eq!(config.job_file(), "water.job");
    }

    #[test]
    fn test_identifier_strips_extension_once() {
        let config = build(JobOptions {
            identifier: Some("water.inp.inp".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.identifier, "water.inp");
    }

    #[test]
    fn test_identifier_keeps_extension_in_the_middle() {
        let config = build(JobOptions {
            identifier: Some("a.inp_scan".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.identifier, "a.inp_scan");
    }

    #[test]
    fn test_identifier_custom_extension() {
        let config = build(JobOptions {
            identifier: Some("benzene.com".to_string()),
            ext_input: Some(".com".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.identifier, "benzene");
        assert_eq!(config.input_file(), "benzene.com");
    }

    #[test]
    fn test_parallel_scheme_precedence() {
        let config = build(JobOptions {
            explicit_nodes: true,
            hybrid: true,
            nodes: Some(2),
            ntasks: Some(4),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            config.parallel_scheme(),
            ParallelScheme::Nodes {
                nodes: 2,
                tasks_per_node: 4
            }
        );

        let config = build(JobOptions {
            hybrid: true,
            ntasks: Some(4),
            cpus_per_task: Some(6),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            config.parallel_scheme(),
            ParallelScheme::Hybrid {
                tasks: 4,
                cpus_per_task: 6
            }
        );
    }
}
