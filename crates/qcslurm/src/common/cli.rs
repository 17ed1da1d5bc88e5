use std::path::PathBuf;

use clap::Parser;

use crate::cluster::Cluster;
use crate::common::utils::time::{TimeLimitArg, compose_slurm_walltime, parse_slurm_duration};
use crate::config::{JobOptions, MemoryMode};
use crate::detect::Backend;
use crate::job::{JobKind, MrChemOptions};

#[derive(Parser)]
#[command(
    name = "qcslurm",
    about = "Generates Slurm job scripts for Gaussian, ORCA and MRChem calculations",
    disable_version_flag = true
)]
pub struct RootOptions {
    #[command(flatten)]
    pub common: CommonOpts,

    #[command(flatten)]
    pub job: JobOpts,

    #[command(flatten)]
    pub slurm: SlurmOpts,

    #[command(flatten)]
    pub mrchem: MrChemOpts,

    #[command(flatten)]
    pub misc: MiscOpts,

    #[command(flatten)]
    pub fixtures: FixtureOpts,
}

#[derive(Parser)]
pub struct CommonOpts {
    /// Print extra information
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not ask when overwriting files
    #[arg(short, long)]
    pub force: bool,

    /// JSON file with the software environments of the clusters
    #[arg(long, env = "QCSLURM_ENVIRONMENTS", value_hint = clap::ValueHint::FilePath)]
    pub environments: Option<PathBuf>,
}

#[derive(Parser)]
#[command(next_help_heading = "Job related arguments")]
pub struct JobOpts {
    /// Name of the input file
    #[arg(short, long)]
    pub input: Option<String>,

    /// Path to the job directory
    #[arg(short, long, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub dest: PathBuf,

    /// Cluster to submit to [default: detected from the host name]
    #[arg(short, long, env = "QCSLURM_CLUSTER", value_enum)]
    pub cluster: Option<Cluster>,

    /// Submit the job to the queue
    #[arg(short = 'X', long)]
    pub execute: bool,

    /// Code the input was made for [default: detected from the input]
    #[arg(long, value_enum)]
    pub code: Option<Backend>,
}

#[derive(Parser)]
#[command(next_help_heading = "SLURM related arguments")]
pub struct SlurmOpts {
    /// Number of nodes
    #[arg(short, long)]
    pub nodes: Option<u32>,

    /// Number of tasks (tasks per node with --loc)
    #[arg(long)]
    pub ntasks: Option<u32>,

    /// Number of CPUs per task
    #[arg(long)]
    pub cpus: Option<u32>,

    /// Account to be billed
    #[arg(short, long, env = "QCSLURM_ACCOUNT")]
    pub account: Option<String>,

    /// How much memory to request, including units
    #[arg(short, long)]
    pub memory: Option<String>,

    /// Type of the memory requirement
    #[arg(long, value_enum)]
    pub memtype: Option<MemoryMode>,

    /// Walltime in Slurm format (e.g. `2-12:00:00`) or in humantime format (e.g. `2h 30m`)
    #[arg(long)]
    pub stime: Option<TimeLimitArg>,

    /// Walltime in days
    #[arg(long, default_value_t = 0)]
    pub days: u32,

    /// Walltime in hours
    #[arg(long, default_value_t = 0)]
    pub hours: u32,

    /// Walltime in minutes
    #[arg(long, default_value_t = 0)]
    pub minutes: u32,

    /// Walltime in seconds
    #[arg(long, default_value_t = 0)]
    pub seconds: u32,

    /// Email notifications
    #[arg(long)]
    pub mail: Option<String>,

    /// Cluster partition to use
    #[arg(short, long)]
    pub partition: Option<String>,

    /// Quality of Service of development jobs
    #[arg(short, long)]
    pub qos: Option<String>,

    /// Request a development job
    #[arg(short = 'D', long)]
    pub devel: bool,

    /// Hybrid OMP+MPI parallel scheme
    #[arg(short = 'H', long)]
    pub hybrid: bool,

    /// Explicitly request the number of nodes
    #[arg(short = 'L', long)]
    pub loc: bool,

    /// Request full nodes (discouraged)
    #[arg(short = 'E', long)]
    pub exclusive: bool,
}

#[derive(Parser)]
#[command(next_help_heading = "MRChem related arguments")]
pub struct MrChemOpts {
    /// Path to the installed MRChem input parser (main executable)
    #[arg(short = 'V', long = "version")]
    pub executable: Option<String>,

    /// Pass the JSON option to the MRChem launcher for a JSON input file
    #[arg(long)]
    pub json: bool,

    /// Directory holding initial guess orbitals, copied to $SCRATCH/initial_guess
    #[arg(long, value_name = "PATH")]
    pub guess_orb: Option<String>,

    /// Directory holding checkpoint orbitals, copied to $SCRATCH/checkpoint
    #[arg(long, value_name = "PATH")]
    pub guess_check: Option<String>,

    /// Do not copy optimized orbitals to storage
    #[arg(long)]
    pub rm_orb: bool,

    /// Do not copy checkpoint orbitals to storage
    #[arg(long)]
    pub rm_check: bool,
}

#[derive(Parser)]
#[command(next_help_heading = "Misc. arguments")]
pub struct MiscOpts {
    /// Copy file(s) to $SCRATCH
    #[arg(long, num_args = 1.., value_name = "PATH")]
    pub copy_to: Vec<String>,

    /// Copy file(s) back to $SLURM_SUBMIT_DIR
    #[arg(long, num_args = 1.., value_name = "PATH")]
    pub copy_back: Vec<String>,
}

#[derive(Parser)]
#[command(next_help_heading = "Test related arguments")]
pub struct FixtureOpts {
    /// Generate test inputs for Gaussian
    #[arg(long)]
    pub test_gaussian: bool,

    /// Generate test inputs for ORCA
    #[arg(long)]
    pub test_orca: bool,

    /// Generate test inputs for MRChem
    #[arg(long)]
    pub test_mrchem: bool,
}

impl FixtureOpts {
    pub fn requested(&self) -> Vec<Backend> {
        [
            (self.test_gaussian, Backend::Gaussian),
            (self.test_orca, Backend::Orca),
            (self.test_mrchem, Backend::MrChem),
        ]
        .into_iter()
        .filter_map(|(requested, backend)| requested.then_some(backend))
        .collect()
    }
}

impl SlurmOpts {
    /// `--stime` wins over the individual components.
    pub fn timelimit(&self, warn_on_zero: bool) -> anyhow::Result<String> {
        let timelimit = match &self.stime {
            Some(stime) => stime.get().clone(),
            None => compose_slurm_walltime(self.days, self.hours, self.minutes, self.seconds),
        };
        let duration = parse_slurm_duration(&timelimit)?;
        if warn_on_zero && duration.is_zero() {
            log::warn!("Walltime set to zero");
        }
        Ok(timelimit)
    }
}

impl MrChemOpts {
    pub fn options(&self) -> MrChemOptions {
        MrChemOptions {
            store_orbitals: !self.rm_orb,
            store_checkpoints: !self.rm_check,
            initial_orbitals: self.guess_orb.clone(),
            initial_checkpoint: self.guess_check.clone(),
            executable: self.executable.clone(),
            json_input: self.json,
        }
    }
}

impl RootOptions {
    pub fn job_options(&self) -> anyhow::Result<JobOptions> {
        let slurm = &self.slurm;
        let testing = !self.fixtures.requested().is_empty();
        Ok(JobOptions {
            account: slurm.account.clone(),
            timelimit: Some(slurm.timelimit(!testing)?),
            memory: slurm.memory.clone(),
            memory_mode: slurm.memtype,
            nodes: slurm.nodes,
            ntasks: slurm.ntasks,
            cpus_per_task: slurm.cpus,
            identifier: self.job.input.clone(),
            mail: slurm.mail.clone(),
            partition: slurm.partition.clone(),
            qos: slurm.qos.clone(),
            cluster: self.job.cluster,
            explicit_nodes: slurm.loc,
            hybrid: slurm.hybrid,
            devel: slurm.devel,
            exclusive: slurm.exclusive,
            ..Default::default()
        })
    }

    pub fn job_kind(&self, backend: Option<Backend>) -> JobKind {
        match backend {
            Some(Backend::MrChem) => JobKind::MrChem(self.mrchem.options()),
            Some(backend) => JobKind::from_backend(backend),
            None => JobKind::Unresolved,
        }
    }
}
