use crate::materialize::MaterializeStage;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a run. None of them is fatal to the install; the
/// caller logs them and exits successfully.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to resolve realpath for {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

/// A materialization step failed.
///
/// `stage` is the state the copy/remove/rename sequence had reached when the
/// failing step was attempted, which fixes what is left on disk.
#[derive(Error, Debug)]
#[error("Materializing {destination} stopped at `{stage}` (staging copy at {staging}): {source}")]
pub struct MaterializeError {
    pub stage: MaterializeStage,
    pub destination: PathBuf,
    pub staging: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl MaterializeError {
    /// The original link was never removed.
    #[must_use]
    pub fn original_intact(&self) -> bool {
        matches!(self.stage, MaterializeStage::Copying | MaterializeStage::Copied)
    }

    /// A staging directory with a complete copy was left behind.
    #[must_use]
    pub fn staging_complete(&self) -> bool {
        matches!(self.stage, MaterializeStage::Copied | MaterializeStage::Removed)
    }
}
