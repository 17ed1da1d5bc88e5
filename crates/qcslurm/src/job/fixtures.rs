//! Minimal inputs and job scripts used to check that a code runs on a cluster.
use std::path::{Path, PathBuf};

use crate::common::error::error;
use crate::common::utils::fs::would_overwrite;
use crate::config::JobConfiguration;
use crate::detect::Backend;
use crate::job::{Job, JobKind, MrChemOptions};

const FIXTURE_TIMELIMIT: &str = "10:00";

pub fn fixture_name(backend: Backend) -> &'static str {
    match backend {
        Backend::Gaussian => "gaussian_test",
        Backend::Orca => "orca_test",
        Backend::MrChem => "mrchem_test",
    }
}

/// Short development job sized for the given code.
pub fn fixture_configuration(config: &JobConfiguration, backend: Backend) -> JobConfiguration {
    let config = JobConfiguration {
        identifier: fixture_name(backend).to_string(),
        timelimit: FIXTURE_TIMELIMIT.to_string(),
        devel: true,
        qos: crate::config::DEFAULT_QOS.to_string(),
        ..config.clone()
    };
    match backend {
        Backend::Gaussian => JobConfiguration {
            explicit_nodes: true,
            hybrid: false,
            nodes: 1,
            ntasks: 8,
            ..config
        },
        Backend::Orca => JobConfiguration {
            explicit_nodes: false,
            hybrid: false,
            ntasks: 8,
            ..config
        },
        Backend::MrChem => JobConfiguration {
            explicit_nodes: false,
            hybrid: true,
            ntasks: 2,
            cpus_per_task: 4,
            ..config
        },
    }
}

/// Helium atom input for the given code.
pub fn fixture_input(config: &JobConfiguration, backend: Backend) -> String {
    match backend {
        Backend::Gaussian => [
            "#p pbepbe/6-31G",
            "",
            "Test input",
            "",
            "0 1",
            "He 0.0 0.0 0.0",
            "",
            "",
        ]
        .join("\n"),
        Backend::Orca => [
            "! pbe 6-31G".to_string(),
            format!("%pal nprocs {} end", config.ntasks),
            "* xyz 0 1".to_string(),
            "  He 0.0 0.0 0.0".to_string(),
            "*".to_string(),
            String::new(),
        ]
        .join("\n"),
        Backend::MrChem => [
            "world_prec = 1.0e-3",
            "Molecule{",
            "  multiplicity = 1",
            "  charge = 0",
            "  $coords",
            "    He 0.0 0.0 0.0",
            "  $end",
            "}",
            "WaveFunction {",
            "  method = pbe",
            "}",
            "",
        ]
        .join("\n"),
    }
}

fn fixture_kind(kind: &JobKind) -> JobKind {
    match kind {
        JobKind::MrChem(options) => JobKind::MrChem(MrChemOptions {
            executable: options.executable.clone(),
            ..Default::default()
        }),
        kind => kind.clone(),
    }
}

pub(super) fn existing_fixture(job: &Job, directory: &Path) -> Option<PathBuf> {
    let config = fixture_configuration(job.config(), job.kind().backend()?);
    [config.input_file(), config.job_file()]
        .into_iter()
        .map(|file| directory.join(file))
        .find(|path| would_overwrite(path))
}

pub(super) fn write_fixtures(job: &Job, directory: &Path) -> crate::Result<(PathBuf, PathBuf)> {
    let Some(backend) = job.kind().backend() else {
        return error("Cannot generate test files without a known code".to_string());
    };
    let config = fixture_configuration(job.config(), backend);
    let input = fixture_input(&config, backend);
    let fixture = Job::with_environment(
        config,
        fixture_kind(job.kind()),
        vec![],
        vec![],
        job.environment(),
    )?;

    let input_path = directory.join(fixture.input_file());
    std::fs::write(&input_path, input)?;
    let job_path = fixture.write(directory)?;
    log::debug!(
        "{backend} test files written to {} and {}",
        input_path.display(),
        job_path.display()
    );
    Ok((input_path, job_path))
}
