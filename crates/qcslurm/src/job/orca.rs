use crate::common::env::RSH_COMMAND;
use crate::common::error::QcError;
use crate::detect::Backend;
use crate::job::script::Script;
use crate::job::{JobVariant, SynthesisContext};

/// Result files of ORCA that are always preserved.
const ORCA_ARTIFACTS: [&str; 3] = ["*.hess", "*.gbw", "*.xyz"];

/// ORCA spawns its MPI processes itself, so its installation and the matching MPI
/// must be reachable through `PATH` and `LD_LIBRARY_PATH`.
pub struct Orca;

impl JobVariant for Orca {
    fn prepare(&self, script: &mut Script, ctx: &SynthesisContext) -> crate::Result<()> {
        let mpi = ctx.environment.mpi.as_deref().ok_or_else(|| {
            QcError::MissingEnvironmentDefinition {
                cluster: ctx.config.cluster,
                backend: Backend::Orca,
                detail: ": missing `mpi` path".to_string(),
            }
        })?;

        script.line(format!("ORCA={}", ctx.environment.exe));
        script.line(format!("MPI={mpi}"));
        script.blank();
        for var in ["PATH", "LD_LIBRARY_PATH"] {
            for dir in ["$ORCA", "$MPI"] {
                script.export(var, format!("${var}:{dir}"));
            }
        }
        script.export(RSH_COMMAND, "\"/usr/bin/ssh -x\"");
        script.blank();
        Ok(())
    }

    fn execute(&self, script: &mut Script, ctx: &SynthesisContext) -> Vec<String> {
        let config = ctx.config;
        script.line(format!(
            "$ORCA/orca {} > {}",
            config.input_file(),
            config.output_file()
        ));
        let mut artifacts = vec![config.output_file()];
        artifacts.extend(ORCA_ARTIFACTS.iter().map(|s| s.to_string()));
        artifacts
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::Cluster;
    use crate::common::error::QcError;
    use crate::detect::Backend;
    use crate::environment::{EnvironmentEntry, EnvironmentRegistry};
    use crate::job::{Job, JobKind};
    use crate::tests::utils::{config, registry};

    #[test]
    fn test_orca_job() {
        let registry = registry();
        let job = Job::new(
            config("benzene", Cluster::Saga),
            JobKind::Orca,
            vec!["benzene.gbw".to_string()],
            vec![],
            &registry,
        )
        .unwrap();
        insta::assert_snapshot!(job.body().join("\n").trim_start(), @r###"
        module purge
        module load ORCA/5.0.4-gompi-2022a

        ORCA=/cluster/software/ORCA/5.0.4-gompi-2022a/bin
        MPI=/cluster/software/OpenMPI/4.1.4-GCC-11.3.0/bin

        export PATH=$PATH:$ORCA
        export PATH=$PATH:$MPI
        export LD_LIBRARY_PATH=$LD_LIBRARY_PATH:$ORCA
        export LD_LIBRARY_PATH=$LD_LIBRARY_PATH:$MPI
        export RSH_COMMAND="/usr/bin/ssh -x"

        cp benzene.inp $SCRATCH
        cp benzene.gbw $SCRATCH
        cd $SCRATCH
        $ORCA/orca benzene.inp > benzene.out

        savefile benzene.out
        savefile *.hess
        savefile *.gbw
        savefile *.xyz

        exit 0
        "###);
    }

    #[test]
    fn test_orca_requires_mpi() {
        let mut registry = EnvironmentRegistry::default();
        registry.insert(
            Cluster::Saga,
            Backend::Orca,
            EnvironmentEntry {
                modules: vec![],
                exe: "/opt/orca".to_string(),
                mpi: None,
            },
        );
        let result = Job::new(
            config("benzene", Cluster::Saga),
            JobKind::Orca,
            vec![],
            vec![],
            &registry,
        );
        assert!(matches!(
            result,
            Err(QcError::MissingEnvironmentDefinition {
                backend: Backend::Orca,
                ..
            })
        ));
    }
}
