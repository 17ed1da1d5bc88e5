use std::fmt::{Display, Formatter};
use std::path::Path;

use bstr::ByteSlice;
use serde::{Deserialize, Serialize};

use crate::common::error::QcError;
use crate::common::utils::fs::read_if_exists;

/// Quantum chemistry codes for which we can synthesize job scripts.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Gaussian,
    Orca,
    #[value(name = "mrchem")]
    MrChem,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Gaussian => "gaussian",
            Backend::Orca => "orca",
            Backend::MrChem => "mrchem",
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of content sniffing. At most one of the flags is set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BackendTags {
    pub is_gaussian: bool,
    pub is_orca: bool,
    pub is_mrchem: bool,
}

impl BackendTags {
    fn from_backend(backend: Backend) -> Self {
        Self {
            is_gaussian: backend == Backend::Gaussian,
            is_orca: backend == Backend::Orca,
            is_mrchem: backend == Backend::MrChem,
        }
    }

    /// Returns the detected backend or [`None`] when the detection was indeterminate.
    pub fn backend(&self) -> Option<Backend> {
        match (self.is_gaussian, self.is_orca, self.is_mrchem) {
            (true, _, _) => Some(Backend::Gaussian),
            (_, true, _) => Some(Backend::Orca),
            (_, _, true) => Some(Backend::MrChem),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> (bool, bool, bool) {
        (self.is_gaussian, self.is_orca, self.is_mrchem)
    }
}

/// Markers that identify an input file, in priority order.
/// The first matching marker wins, so several codes can never be detected at once.
const MARKERS: &[(Backend, &[&str])] = &[
    (Backend::MrChem, &["world_prec"]),
    (Backend::Orca, &["*xyz", "* xyz"]),
    (Backend::Gaussian, &["#p", "# p"]),
];

/// Classifies input file content.
pub fn detect_backend_from_content(content: &[u8]) -> Option<Backend> {
    MARKERS
        .iter()
        .find(|(_, markers)| markers.iter().any(|marker| content.contains_str(marker)))
        .map(|(backend, _)| *backend)
}

/// Reads the input file at `path` and determines which code it was written for.
///
/// A missing file is not an error, it yields empty tags so that the caller can decide
/// whether to use an explicit backend or give up.
pub fn detect_backend(path: &Path) -> crate::Result<BackendTags> {
    let Some(content) = read_if_exists(path)? else {
        log::debug!("Input file {} does not exist", path.display());
        return Ok(BackendTags::default());
    };
    match detect_backend_from_content(&content) {
        Some(backend) => {
            log::debug!("Detected {backend} input in {}", path.display());
            Ok(BackendTags::from_backend(backend))
        }
        None => Err(QcError::UnrecognizedInputError(path.to_path_buf())),
    }
}
