//! Locating the global `node_modules` directory under the prefix candidates.

use crate::config::Platform;
use std::path::{Path, PathBuf};

/// First candidate satisfying `predicate`, probing in order and stopping at the
/// first hit.
pub fn find_first<T, I, P>(candidates: I, predicate: P) -> Option<T>
where
    I: IntoIterator<Item = T>,
    P: FnMut(&T) -> bool,
{
    candidates.into_iter().find(predicate)
}

/// A `node_modules` directory that was found, with the prefix it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeModulesDir {
    pub prefix: PathBuf,
    pub path: PathBuf,
}

/// Where npm keeps global packages under `prefix`, in probe order.
#[must_use]
pub fn node_modules_candidates(prefix: &Path, platform: Platform) -> Vec<PathBuf> {
    match platform {
        Platform::Windows => vec![prefix.join("node_modules")],
        Platform::Unix => vec![
            prefix.join("lib").join("node_modules"),
            prefix.join("node_modules"),
        ],
    }
}

/// Probe every prefix's candidates in order and return the first that `exists`.
pub fn locate_node_modules<P>(
    prefixes: &[PathBuf],
    platform: Platform,
    mut exists: P,
) -> Option<NodeModulesDir>
where
    P: FnMut(&Path) -> bool,
{
    let candidates = prefixes.iter().flat_map(|prefix| {
        node_modules_candidates(prefix, platform)
            .into_iter()
            .map(move |path| NodeModulesDir {
                prefix: prefix.clone(),
                path,
            })
    });

    find_first(candidates, |candidate: &NodeModulesDir| exists(&candidate.path))
}
