//! Telling a fragile cache link apart from every other kind of install.
//!
//! npm installs from a git URL can leave the package directory as a link into
//! `~/.npm/_cacache/tmp/git-clone*`, which npm's cache GC deletes later. Only
//! links whose real path contains that fragment are fragile; everything else,
//! including `npm link` style links into a developer checkout, is left alone.
//!
//! The fragment follows npm's current cache layout. A future layout change
//! makes detection quietly stop matching.

use crate::config::Platform;
use crate::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of inspecting the package directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkClass {
    /// A real directory (or file): a normal install.
    NotSymlink,
    /// A link whose real path is outside npm's git-clone staging area.
    Foreign { resolved: PathBuf },
    /// A link into npm's git-clone staging area.
    CacheClone { resolved: PathBuf },
    /// A link into npm's git-clone staging area whose real path is not a
    /// directory, so there is no package tree to copy.
    NotDirectory { resolved: PathBuf },
}

/// `<sep>.npm<sep>_cacache<sep>tmp<sep>git-clone` for `platform`.
#[must_use]
pub fn cache_clone_fragment(platform: Platform) -> String {
    let sep = platform.separator();
    format!("{sep}.npm{sep}_cacache{sep}tmp{sep}git-clone")
}

/// Whether `resolved` lies in npm's git-clone staging area.
#[must_use]
pub fn is_cache_clone(resolved: &Path, platform: Platform) -> bool {
    resolved
        .to_string_lossy()
        .contains(&cache_clone_fragment(platform))
}

/// Classify the existing path `package_dir`.
///
/// Uses `symlink_metadata` so the link itself is inspected, then resolves
/// links to their real path. Only a cache link to a directory is
/// [`LinkClass::CacheClone`].
///
/// # Errors
/// [`Error::Stat`] if the path or the real path cannot be inspected,
/// [`Error::Resolve`] if a link cannot be resolved.
pub fn classify(package_dir: &Path, platform: Platform) -> Result<LinkClass, Error> {
    let metadata = fs::symlink_metadata(package_dir).map_err(|source| Error::Stat {
        path: package_dir.to_path_buf(),
        source,
    })?;

    if !metadata.file_type().is_symlink() {
        return Ok(LinkClass::NotSymlink);
    }

    let resolved = dunce::canonicalize(package_dir).map_err(|source| Error::Resolve {
        path: package_dir.to_path_buf(),
        source,
    })?;

    if !is_cache_clone(&resolved, platform) {
        return Ok(LinkClass::Foreign { resolved });
    }

    let target = fs::metadata(&resolved).map_err(|source| Error::Stat {
        path: resolved.clone(),
        source,
    })?;
    if target.is_dir() {
        Ok(LinkClass::CacheClone { resolved })
    } else {
        Ok(LinkClass::NotDirectory { resolved })
    }
}
