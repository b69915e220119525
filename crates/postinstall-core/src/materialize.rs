//! Replacing a link with a real copy of what it points at.
//!
//! The replacement runs as `Copying → Copied → Removed → Renamed`:
//!
//! 1. copy the real tree into a uniquely named sibling staging directory;
//! 2. remove the link (never its target);
//! 3. rename the staging directory into the link's place.
//!
//! A failure stops the sequence where it is. Nothing is rolled back: a failed
//! copy leaves the link untouched and the partial staging copy behind, a
//! failed removal leaves both, and a failed rename leaves the complete copy in
//! the staging directory.

use crate::error::MaterializeError;
use postinstall_util::naming;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// States of the copy/remove/rename sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializeStage {
    /// Copying into the staging directory; the link is untouched.
    Copying,
    /// Staging holds a full copy; the link is untouched.
    Copied,
    /// The link is gone; the copy is still in staging.
    Removed,
    /// The copy sits at the original path.
    Renamed,
}

impl MaterializeStage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copying => "copying",
            Self::Copied => "copied",
            Self::Removed => "removed",
            Self::Renamed => "renamed",
        }
    }
}

impl fmt::Display for MaterializeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filesystem operations used by [`materialize`].
pub trait MaterializeFs {
    /// Recursively copy `src` into the new directory `dst`.
    fn copy_tree(&self, src: &Path, dst: &Path) -> io::Result<()>;

    /// Remove the link at `path` without following it.
    fn remove_link(&self, path: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl MaterializeFs for RealFs {
    fn copy_tree(&self, src: &Path, dst: &Path) -> io::Result<()> {
        postinstall_util::fs::copy_tree(src, dst)
    }

    fn remove_link(&self, path: &Path) -> io::Result<()> {
        postinstall_util::fs::remove_link(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

/// What to copy where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializationPlan {
    /// Resolved real path of the link.
    pub source: PathBuf,
    /// The link itself; becomes the real directory.
    pub destination: PathBuf,
    /// Sibling of `destination` holding the copy until the rename.
    pub staging: PathBuf,
}

impl MaterializationPlan {
    /// Plan with a fresh, unique staging path next to `destination`.
    #[must_use]
    pub fn new(source: PathBuf, destination: PathBuf) -> Self {
        let staging = naming::staging_path(&destination, SystemTime::now());
        Self {
            source,
            destination,
            staging,
        }
    }

    /// Override the staging path.
    #[must_use]
    pub fn with_staging(mut self, staging: PathBuf) -> Self {
        self.staging = staging;
        self
    }

    /// Run the step that leaves `stage` and return the state reached.
    fn advance<F>(&self, stage: MaterializeStage, fs: &F) -> io::Result<MaterializeStage>
    where
        F: MaterializeFs + ?Sized,
    {
        match stage {
            MaterializeStage::Copying => {
                debug!(
                    "Copying package from {} to {}",
                    self.source.display(),
                    self.staging.display()
                );
                fs.copy_tree(&self.source, &self.staging)?;
                Ok(MaterializeStage::Copied)
            }
            MaterializeStage::Copied => {
                debug!(
                    "Replacing symlink {} with physical directory",
                    self.destination.display()
                );
                fs.remove_link(&self.destination)?;
                Ok(MaterializeStage::Removed)
            }
            MaterializeStage::Removed => {
                fs.rename(&self.staging, &self.destination)?;
                Ok(MaterializeStage::Renamed)
            }
            MaterializeStage::Renamed => Ok(MaterializeStage::Renamed),
        }
    }
}

/// Execute `plan` against `fs`, stopping at the first failing step.
///
/// # Errors
/// A [`MaterializeError`] whose `stage` names the state reached before the
/// failing step.
pub fn materialize<F>(plan: &MaterializationPlan, fs: &F) -> Result<(), MaterializeError>
where
    F: MaterializeFs + ?Sized,
{
    let mut stage = MaterializeStage::Copying;

    while stage != MaterializeStage::Renamed {
        stage = plan
            .advance(stage, fs)
            .map_err(|source| MaterializeError {
                stage,
                destination: plan.destination.clone(),
                staging: plan.staging.clone(),
                source,
            })?;
    }

    Ok(())
}
