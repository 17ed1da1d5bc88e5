use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::Context;
use clap::Parser;

use qcslurm::QCSLURM_VERSION;
use qcslurm::common::cli::{CommonOpts, RootOptions};
use qcslurm::common::setup::setup_logging;
use qcslurm::common::utils::fs::absolute_path;
use qcslurm::config::JobConfiguration;
use qcslurm::detect::detect_backend;
use qcslurm::environment::EnvironmentRegistry;
use qcslurm::job::{Job, JobKind};

const AFFIRMATIVE: [&str; 3] = ["", "y", "yes"];

fn load_registry(opts: &CommonOpts) -> anyhow::Result<EnvironmentRegistry> {
    let registry = match &opts.environments {
        Some(path) => EnvironmentRegistry::load(path)
            .with_context(|| format!("Cannot load environments from {}", path.display()))?,
        None => EnvironmentRegistry::builtin()?,
    };
    Ok(registry)
}

fn confirm_overwrite(path: &Path) -> anyhow::Result<bool> {
    print!("File <{}> exists. Overwrite? ([y]/n) ", path.display());
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(AFFIRMATIVE.contains(&answer.trim().to_lowercase().as_str()))
}

fn submit_job(script: &Path, directory: &Path) -> anyhow::Result<()> {
    let sbatch = which::which("sbatch")
        .context("Cannot find `sbatch` binary. Make sure that Slurm is available.")?;
    log::debug!("Running command `{} {}`", sbatch.display(), script.display());
    let status = Command::new(sbatch)
        .arg(script)
        .current_dir(directory)
        .status()
        .context("sbatch start failed")?;
    if !status.success() {
        anyhow::bail!("sbatch exited with {status}");
    }
    Ok(())
}

fn command_fixtures(
    opts: &RootOptions,
    config: JobConfiguration,
    registry: &EnvironmentRegistry,
    directory: &Path,
) -> anyhow::Result<()> {
    for backend in opts.fixtures.requested() {
        let job = Job::new(
            config.clone(),
            opts.job_kind(Some(backend)),
            vec![],
            vec![],
            registry,
        )?;
        let skip = match job.existing_fixture(directory) {
            Some(path) => !opts.common.force && !confirm_overwrite(&path)?,
            None => false,
        };
        if skip {
            log::warn!("Skipping {backend} test files");
            continue;
        }
        let (input, script) = job.write_fixtures(directory)?;
        log::debug!(
            "{backend} test files generated: {}, {}",
            input.display(),
            script.display()
        );
    }
    Ok(())
}

fn command_generate(
    opts: &RootOptions,
    config: JobConfiguration,
    registry: &EnvironmentRegistry,
    directory: &Path,
) -> anyhow::Result<()> {
    let backend = match opts.job.code {
        Some(backend) => Some(backend),
        None => detect_backend(&directory.join(config.input_file()))?.backend(),
    };
    match backend {
        Some(backend) => log::debug!("{backend} input detected"),
        None => log::warn!("Code not determined, writing only the Slurm directives"),
    }

    let job = Job::new(
        config,
        opts.job_kind(backend),
        opts.misc.copy_to.clone(),
        opts.misc.copy_back.clone(),
        registry,
    )?;
    if matches!(job.kind(), JobKind::Unresolved) && opts.job.execute {
        anyhow::bail!("Refusing to submit a job without a known code");
    }

    let path = job.job_path(directory);
    if job.would_overwrite(directory) && !opts.common.force && !confirm_overwrite(&path)? {
        anyhow::bail!("Aborted");
    }
    job.write(directory)?;
    log::info!("File written to {}", path.display());

    if opts.job.execute {
        submit_job(&path, directory)?;
    }
    Ok(())
}

fn run(opts: RootOptions) -> anyhow::Result<()> {
    log::debug!("qcslurm {QCSLURM_VERSION}");
    let registry = load_registry(&opts.common)?;
    let config = JobConfiguration::new(opts.job_options()?)?;
    log::debug!("Job configuration: {}", serde_json::to_string(&config)?);

    let directory = absolute_path(opts.job.dest.clone());
    if opts.fixtures.requested().is_empty() {
        command_generate(&opts, config, &registry, &directory)
    } else {
        command_fixtures(&opts, config, &registry, &directory)
    }
}

fn main() {
    let opts = RootOptions::parse();
    setup_logging(opts.common.verbose);

    if let Err(e) = run(opts) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
