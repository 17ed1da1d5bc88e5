use std::fmt::{Display, Formatter};

use crate::config::{DEFAULT_PARTITION, JobConfiguration, MemoryMode, ParallelScheme};

pub const SHEBANG: &str = "#!/bin/bash";

/// A single `#SBATCH` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directive {
    pub key: &'static str,
    pub value: Option<String>,
}

impl Directive {
    fn new(key: &'static str, value: impl ToString) -> Self {
        Self {
            key,
            value: Some(value.to_string()),
        }
    }

    fn flag(key: &'static str) -> Self {
        Self { key, value: None }
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "#SBATCH --{}={}", self.key, value),
            None => write!(f, "#SBATCH --{}", self.key),
        }
    }
}

/// Header of a job script: the shebang, an empty line and the directives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveBlock {
    directives: Vec<Directive>,
}

impl DirectiveBlock {
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn get(&self, key: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.directives.len() + 2);
        lines.push(SHEBANG.to_string());
        lines.push(String::new());
        lines.extend(self.directives.iter().map(|d| d.to_string()));
        lines
    }
}

impl Display for DirectiveBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Derives the scheduler directives from the configuration.
pub fn build_directives(config: &JobConfiguration) -> DirectiveBlock {
    let mut directives = vec![
        Directive::new("account", &config.account),
        Directive::new("mail-type", &config.mail),
        Directive::new("job-name", &config.identifier),
        Directive::new("output", config.log_file()),
        Directive::new("error", config.error_file()),
        Directive::new("time", &config.timelimit),
    ];

    if config.partition != DEFAULT_PARTITION {
        directives.push(Directive::new("partition", &config.partition));
    }

    if config.devel {
        directives.push(Directive::new("qos", &config.qos));
    }

    if config.cluster.accepts_memory_directive() {
        let key = match config.memory_mode {
            MemoryMode::Total => "mem",
            MemoryMode::PerCpu => "mem-per-cpu",
        };
        directives.push(Directive::new(key, &config.memory));
    }

    if config.exclusive {
        directives.push(Directive::flag("exclusive"));
    }

    match config.parallel_scheme() {
        ParallelScheme::Nodes {
            nodes,
            tasks_per_node,
        } => {
            directives.push(Directive::new("nodes", nodes));
            directives.push(Directive::new("ntasks-per-node", tasks_per_node));
        }
        ParallelScheme::Hybrid {
            tasks,
            cpus_per_task,
        } => {
            directives.push(Directive::new("ntasks", tasks));
            directives.push(Directive::new("cpus-per-task", cpus_per_task));
        }
        ParallelScheme::Tasks { tasks } => {
            directives.push(Directive::new("ntasks", tasks));
        }
    }

    DirectiveBlock { directives }
}

#[cfg(test)]
mod tests {
    use super::build_directives;
    use crate::cluster::Cluster;
    use crate::config::{JobConfiguration, JobOptions, MemoryMode};

    fn config(opts: JobOptions) -> JobConfiguration {
        JobConfiguration::with_cluster(opts, Cluster::Saga).unwrap()
    }

    fn keys(config: &JobConfiguration) -> Vec<&'static str> {
        build_directives(config)
            .directives()
            .iter()
            .map(|d| d.key)
            .collect()
    }

    #[test]
    fn test_default_directives() {
        let config = config(JobOptions {
            account: Some("nn1234k".to_string()),
            identifier: Some("water".to_string()),
            ..Default::default()
        });
        insta::assert_snapshot!(build_directives(&config).to_string(), @r###"
        #!/bin/bash

        #SBATCH --account=nn1234k
        #SBATCH --mail-type=None
        #SBATCH --job-name=water
        #SBATCH --output=water.log
        #SBATCH --error=water.err
        #SBATCH --time=30:00
        #SBATCH --mem=5GB
        #SBATCH --ntasks=16
        "###);
    }

    #[test]
    fn test_all_optional_directives() {
        let config = config(JobOptions {
            identifier: Some("big".to_string()),
            partition: Some("bigmem".to_string()),
            devel: true,
            exclusive: true,
            memory: Some("100GB".to_string()),
            memory_mode: Some(MemoryMode::PerCpu),
            explicit_nodes: true,
            nodes: Some(2),
            ntasks: Some(40),
            ..Default::default()
        });
        assert_eq!(
            keys(&config),
            vec![
                "account",
                "mail-type",
                "job-name",
                "output",
                "error",
                "time",
                "partition",
                "qos",
                "mem-per-cpu",
                "exclusive",
                "nodes",
                "ntasks-per-node",
            ]
        );
        let block = build_directives(&config);
        assert_eq!(block.get("qos").unwrap().value.as_deref(), Some("Devel"));
        assert_eq!(block.get("exclusive").unwrap().to_string(), "#SBATCH --exclusive");
        assert_eq!(
            block.get("ntasks-per-node").unwrap().to_string(),
            "#SBATCH --ntasks-per-node=40"
        );
    }

    #[test]
    fn test_whole_node_memory() {
        let block = build_directives(&config(JobOptions {
            memory: Some("5GB".to_string()),
            memory_mode: Some(MemoryMode::Total),
            ..Default::default()
        }));
        assert_eq!(block.get("mem").unwrap().value.as_deref(), Some("5GB"));
        assert!(!block.contains("mem-per-cpu"));
    }

    #[test]
    fn test_no_memory_on_fram() {
        for mode in [MemoryMode::Total, MemoryMode::PerCpu] {
            let config = JobConfiguration::with_cluster(
                JobOptions {
                    memory: Some("10GB".to_string()),
                    memory_mode: Some(mode),
                    ..Default::default()
                },
                Cluster::Fram,
            )
            .unwrap();
            let text = build_directives(&config).to_string();
            assert!(!text.contains("--mem"));
            assert!(!text.contains("10GB"));
        }
    }

    #[test]
    fn test_partition_only_when_not_default() {
        let block = build_directives(&config(JobOptions {
            partition: Some("Normal".to_string()),
            ..Default::default()
        }));
        assert!(!block.contains("partition"));

        let block = build_directives(&config(JobOptions {
            partition: Some("accel".to_string()),
            ..Default::default()
        }));
        assert_eq!(block.get("partition").unwrap().value.as_deref(), Some("accel"));
    }

    #[test]
    fn test_qos_requires_devel() {
        let block = build_directives(&config(JobOptions {
            qos: Some("Devel".to_string()),
            devel: false,
            ..Default::default()
        }));
        assert!(!block.contains("qos"));

        let block = build_directives(&config(JobOptions {
            qos: Some("short".to_string()),
            devel: true,
            ..Default::default()
        }));
        assert_eq!(block.get("qos").unwrap().value.as_deref(), Some("short"));
    }

    #[test]
    fn test_exactly_one_parallel_scheme() {
        for (explicit_nodes, hybrid) in [(false, false), (true, false), (false, true), (true, true)]
        {
            let block = build_directives(&config(JobOptions {
                explicit_nodes,
                hybrid,
                ..Default::default()
            }));
            let node_pair = block.contains("nodes") && block.contains("ntasks-per-node");
            let hybrid_pair = block.contains("ntasks") && block.contains("cpus-per-task");
            assert!(!(node_pair && hybrid_pair));
            assert_eq!(node_pair, explicit_nodes);
            assert_eq!(hybrid_pair, hybrid && !explicit_nodes);
            if !explicit_nodes && !hybrid {
                assert!(block.contains("ntasks"));
                assert!(!block.contains("cpus-per-task"));
            }
        }
    }

    #[test]
    fn test_hybrid_directives() {
        let block = build_directives(&config(JobOptions {
            hybrid: true,
            ntasks: Some(4),
            cpus_per_task: Some(32),
            ..Default::default()
        }));
        let lines = block.lines();
        let tail: Vec<&str> = lines.iter().rev().take(2).map(|s| s.as_str()).collect();
        assert_eq!(tail, vec!["#SBATCH --cpus-per-task=32", "#SBATCH --ntasks=4"]);
    }

    #[test]
    fn test_directives_are_idempotent() {
        let config = config(JobOptions {
            hybrid: true,
            devel: true,
            ..Default::default()
        });
        assert_eq!(build_directives(&config), build_directives(&config));
        assert_eq!(config.directives(), build_directives(&config));
    }

    #[test]
    fn test_directives_follow_changes() {
        let config = config(JobOptions::default());
        let changed = JobConfiguration {
            timelimit: "10:00".to_string(),
            devel: true,
            ..config.clone()
        };
        assert_eq!(
            build_directives(&config).get("time").unwrap().value.as_deref(),
            Some("30:00")
        );
        let block = build_directives(&changed);
        assert_eq!(block.get("time").unwrap().value.as_deref(), Some("10:00"));
        assert!(block.contains("qos"));
    }
}
