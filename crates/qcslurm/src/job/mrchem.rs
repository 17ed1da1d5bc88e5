use crate::common::env::{OMP_NUM_THREADS, SLURM_JOBID, SLURM_SUBMIT_DIR};
use crate::config::JobConfiguration;
use crate::job::script::Script;
use crate::job::{JobVariant, SynthesisContext};

/// Directory inside the scratch from which MRChem reads the initial guess.
const INITIAL_GUESS_DIR: &str = "initial_guess";
/// Directory inside the scratch where MRChem reads and writes checkpoints.
const CHECKPOINT_DIR: &str = "checkpoint";
/// Directory inside the scratch where MRChem writes the final orbitals.
const ORBITALS_DIR: &str = "orbitals";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MrChemOptions {
    /// Copy the final orbitals to the project storage.
    pub store_orbitals: bool,
    /// Copy the checkpoint orbitals to the project storage.
    pub store_checkpoints: bool,
    /// Directory with orbitals used as the initial guess.
    pub initial_orbitals: Option<String>,
    /// Directory with checkpoint orbitals to restart from.
    pub initial_checkpoint: Option<String>,
    /// Overrides the executable from the environment.
    pub executable: Option<String>,
    /// The input file is already in the JSON format of the MRChem program.
    pub json_input: bool,
}

/// Archives the content of `source` into the project storage and writes the location of the
/// archive into a side-car file in the submission directory.
fn archive_directory(
    script: &mut Script,
    config: &JobConfiguration,
    storage: &str,
    source: &str,
    extension: &str,
) {
    script.blank();
    script.line(format!(
        "DIR=/cluster/projects/{}/$(whoami)/{storage}/{SLURM_JOBID}",
        config.account
    ));
    script.line("mkdir -p $DIR");
    script.line(format!("cp {source}/* $DIR/"));
    script.line(format!(
        "echo $DIR > {SLURM_SUBMIT_DIR}/{}.{extension}",
        config.identifier
    ));
}

impl JobVariant for MrChemOptions {
    fn execute(&self, script: &mut Script, ctx: &SynthesisContext) -> Vec<String> {
        let config = ctx.config;
        if let Some(dir) = &self.initial_orbitals {
            script.line(format!("cp -r {dir} {INITIAL_GUESS_DIR}"));
        }
        if let Some(dir) = &self.initial_checkpoint {
            script.line(format!("cp -r {dir} {CHECKPOINT_DIR}"));
        }
        if config.hybrid {
            script.export(OMP_NUM_THREADS, config.cpus_per_task.to_string());
        }

        let exe = self.executable.as_deref().unwrap_or(&ctx.environment.exe);
        let json = if self.json_input { " --json" } else { "" };
        script.line(format!(
            "{exe}{json} --launcher 'srun -n {}' {} > {}",
            config.ntasks,
            config.identifier,
            config.output_file()
        ));
        vec![
            config.output_file(),
            format!("{}.json", config.identifier),
        ]
    }

    fn finalize(&self, script: &mut Script, ctx: &SynthesisContext) {
        if self.store_orbitals {
            archive_directory(script, ctx.config, "MWOrbitals", ORBITALS_DIR, "orbitals");
        }
        if self.store_checkpoints {
            archive_directory(
                script,
                ctx.config,
                "MWCheckpoints",
                CHECKPOINT_DIR,
                "checkpoint",
            );
        }
    }
}
