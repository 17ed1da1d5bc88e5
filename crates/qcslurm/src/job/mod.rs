pub mod fixtures;
mod gaussian;
mod mrchem;
mod orca;
mod script;

use std::path::{Path, PathBuf};

use crate::common::error::error;
use crate::common::utils::fs::would_overwrite;
use crate::config::JobConfiguration;
use crate::detect::Backend;
use crate::environment::{EnvironmentEntry, EnvironmentRegistry};
use script::Script;

pub use gaussian::Gaussian;
pub use mrchem::MrChemOptions;
pub use orca::Orca;

/// Code that the job runs, together with code specific settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobKind {
    Gaussian,
    Orca,
    MrChem(MrChemOptions),
    /// The code could not be determined, only the directives are written.
    Unresolved,
}

impl JobKind {
    pub fn from_backend(backend: Backend) -> Self {
        match backend {
            Backend::Gaussian => JobKind::Gaussian,
            Backend::Orca => JobKind::Orca,
            Backend::MrChem => JobKind::MrChem(MrChemOptions::default()),
        }
    }

    pub fn backend(&self) -> Option<Backend> {
        match self {
            JobKind::Gaussian => Some(Backend::Gaussian),
            JobKind::Orca => Some(Backend::Orca),
            JobKind::MrChem(_) => Some(Backend::MrChem),
            JobKind::Unresolved => None,
        }
    }

    fn variant(&self) -> Option<&dyn JobVariant> {
        match self {
            JobKind::Gaussian => Some(&Gaussian),
            JobKind::Orca => Some(&Orca),
            JobKind::MrChem(options) => Some(options),
            JobKind::Unresolved => None,
        }
    }
}

/// Everything a code variant needs to emit its part of the script.
pub(crate) struct SynthesisContext<'a> {
    pub config: &'a JobConfiguration,
    pub environment: &'a EnvironmentEntry,
}

/// Code specific steps of the common job skeleton.
trait JobVariant {
    /// Emitted after the modules are loaded and before the input is staged.
    fn prepare(&self, _script: &mut Script, _ctx: &SynthesisContext) -> crate::Result<()> {
        Ok(())
    }

    /// Emitted inside the scratch directory.
    /// Returns the files produced by the code that have to be preserved.
    fn execute(&self, script: &mut Script, ctx: &SynthesisContext) -> Vec<String>;

    /// Emitted after all files were marked for preservation.
    fn finalize(&self, _script: &mut Script, _ctx: &SynthesisContext) {}
}

fn synthesize(
    variant: &dyn JobVariant,
    ctx: &SynthesisContext,
    stage_files: &[String],
    preserve_files: &[String],
) -> crate::Result<Vec<String>> {
    let mut script = Script::default();
    script.blank();
    script.load_modules(&ctx.environment.modules);

    variant.prepare(&mut script, ctx)?;

    script.copy_to_scratch(&ctx.config.input_file());
    for file in stage_files {
        script.copy_to_scratch(file);
    }
    script.enter_scratch();

    let artifacts = variant.execute(&mut script, ctx);

    script.blank();
    for file in artifacts.iter().chain(preserve_files) {
        script.save_file(file);
    }

    variant.finalize(&mut script, ctx);

    script.blank();
    script.line("exit 0");
    Ok(script.into_lines())
}

/// A job script of a single calculation.
#[derive(Debug)]
pub struct Job<'env> {
    config: JobConfiguration,
    kind: JobKind,
    environment: Option<&'env EnvironmentEntry>,
    body: Vec<String>,
}

impl<'env> Job<'env> {
    /// Synthesizes the job script body using the environment of the configured cluster.
    pub fn new(
        config: JobConfiguration,
        kind: JobKind,
        stage_files: Vec<String>,
        preserve_files: Vec<String>,
        registry: &'env EnvironmentRegistry,
    ) -> crate::Result<Self> {
        let environment = match kind.backend() {
            Some(backend) => Some(registry.get(config.cluster, backend)?),
            None => None,
        };
        Self::with_environment(config, kind, stage_files, preserve_files, environment)
    }

    fn with_environment(
        config: JobConfiguration,
        kind: JobKind,
        stage_files: Vec<String>,
        preserve_files: Vec<String>,
        environment: Option<&'env EnvironmentEntry>,
    ) -> crate::Result<Self> {
        let body = match (kind.variant(), environment) {
            (Some(variant), Some(environment)) => {
                let ctx = SynthesisContext {
                    config: &config,
                    environment,
                };
                synthesize(variant, &ctx, &stage_files, &preserve_files)?
            }
            _ => vec![],
        };
        Ok(Self {
            config,
            kind,
            environment,
            body,
        })
    }

    pub fn config(&self) -> &JobConfiguration {
        &self.config
    }

    pub fn kind(&self) -> &JobKind {
        &self.kind
    }

    /// Statements of the script, without the directives.
    pub fn body(&self) -> &[String] {
        &self.body
    }

    pub fn input_file(&self) -> String {
        self.config.input_file()
    }

    pub fn output_file(&self) -> String {
        self.config.output_file()
    }

    pub fn job_file(&self) -> String {
        self.config.job_file()
    }

    pub fn job_path(&self, directory: &Path) -> PathBuf {
        directory.join(self.job_file())
    }

    /// Full text of the job script: the directive block followed by the body.
    pub fn render(&self) -> String {
        let mut lines = self.config.directives().lines();
        lines.extend(self.body.iter().cloned());
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    pub fn would_overwrite(&self, directory: &Path) -> bool {
        would_overwrite(&self.job_path(directory))
    }

    /// Writes the job script into `directory` and returns its path.
    pub fn write(&self, directory: &Path) -> crate::Result<PathBuf> {
        if !directory.is_dir() {
            return error(format!("{directory:?} is not a directory"));
        }
        let path = self.job_path(directory);
        std::fs::write(&path, self.render())?;
        log::debug!("Job script written to {}", path.display());
        Ok(path)
    }

    /// Writes a minimal input and a job script for the code of this job.
    /// Returns the paths of the input and of the job script.
    pub fn write_fixtures(&self, directory: &Path) -> crate::Result<(PathBuf, PathBuf)> {
        fixtures::write_fixtures(self, directory)
    }

    /// The first fixture file of this job that already exists in `directory`.
    pub fn existing_fixture(&self, directory: &Path) -> Option<PathBuf> {
        fixtures::existing_fixture(self, directory)
    }

    pub(crate) fn environment(&self) -> Option<&'env EnvironmentEntry> {
        self.environment
    }
}
