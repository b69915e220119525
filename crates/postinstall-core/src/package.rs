use std::path::{Path, PathBuf};

/// The package this fix is shipped with.
pub const PACKAGE_NAME: &str = "@sfc-gh-dflippo/skills-mcp-server";

/// Install location of `pkg_name` inside `node_modules`.
///
/// Scoped names (`@scope/name`) map to two nested directories.
#[must_use]
pub fn package_dir(node_modules: &Path, pkg_name: &str) -> PathBuf {
    pkg_name
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(node_modules.to_path_buf(), |dir, segment| dir.join(segment))
}
