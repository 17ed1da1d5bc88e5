/// Variables referenced by the generated job scripts. They are expanded by the job shell.
pub const SCRATCH: &str = "$SCRATCH";
pub const SLURM_SUBMIT_DIR: &str = "${SLURM_SUBMIT_DIR}";
pub const SLURM_JOBID: &str = "${SLURM_JOBID}";

/// Variables exported by the generated job scripts.
pub const OMP_NUM_THREADS: &str = "OMP_NUM_THREADS";
pub const RSH_COMMAND: &str = "RSH_COMMAND";
