//! Candidate npm prefixes, most trusted first.

use crate::config::{InstallContext, Platform};
use std::path::{Path, PathBuf};

/// Ordered prefix candidates for `ctx`.
///
/// Explicit overrides come first in their fixed priority order, followed by
/// the platform default. Absent and empty entries are dropped; duplicates are
/// kept. Nothing is checked against the filesystem here.
#[must_use]
pub fn collect_prefix_candidates(ctx: &InstallContext) -> Vec<PathBuf> {
    [
        ctx.prefix_override.clone(),
        ctx.global_prefix_override.clone(),
        ctx.manager_prefix.clone(),
        ctx.legacy_prefix.clone(),
        ctx.local_prefix_override.clone(),
        default_prefix(ctx),
    ]
    .into_iter()
    .flatten()
    .filter(|p| !p.as_os_str().is_empty())
    .collect()
}

/// Where npm puts global packages when nothing overrides it.
///
/// - Windows: `%APPDATA%\npm`, or the executable's directory without `APPDATA`.
/// - Elsewhere: two levels above the executable (`<prefix>/bin/node` → `<prefix>`).
#[must_use]
pub fn default_prefix(ctx: &InstallContext) -> Option<PathBuf> {
    let exe_dir = ctx.executable_path.as_deref().map(dirname);

    match ctx.platform {
        Platform::Windows => ctx
            .app_data
            .as_ref()
            .map(|dir| dir.join("npm"))
            .or_else(|| exe_dir.map(Path::to_path_buf)),
        Platform::Unix => exe_dir.map(|dir| dirname(dir).to_path_buf()),
    }
}

/// Parent directory, stopping at the root like `dirname(1)`.
fn dirname(path: &Path) -> &Path {
    path.parent().unwrap_or(path)
}
