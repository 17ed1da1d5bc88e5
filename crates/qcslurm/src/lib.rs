pub mod cluster;
pub mod common;
pub mod config;
pub mod detect;
pub mod directives;
pub mod environment;
pub mod job;

#[cfg(test)]
pub(crate) mod tests;

pub type Error = crate::common::error::QcError;
pub type Result<T> = std::result::Result<T, Error>;

/// Suffix of generated job scripts. Not configurable.
pub const JOB_SCRIPT_SUFFIX: &str = ".job";

pub const QCSLURM_VERSION: &str = {
    match option_env!("QCSLURM_BUILD_VERSION") {
        Some(version) => version,
        None => env!("CARGO_PKG_VERSION"),
    }
};
