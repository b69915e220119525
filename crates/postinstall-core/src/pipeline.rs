//! The single-pass run: prefixes → `node_modules` → package dir → classify →
//! materialize.

use crate::classify::{classify, LinkClass};
use crate::config::InstallContext;
use crate::error::Error;
use crate::locate::locate_node_modules;
use crate::materialize::{materialize, MaterializationPlan, MaterializeFs, RealFs};
use crate::package::package_dir;
use crate::prefix::collect_prefix_candidates;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options for a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after classification and report the plan instead of executing it.
    pub dry_run: bool,
}

/// Why a run had nothing to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// No prefix candidate has a `node_modules` directory.
    NoNodeModules,
    /// The package is not installed (yet).
    PackageMissing { path: PathBuf },
    /// The package is an ordinary directory.
    NotSymlink { path: PathBuf },
    /// The package is a link outside npm's git-clone staging area.
    ForeignLink { path: PathBuf, resolved: PathBuf },
    /// The package is a cache link to something other than a directory.
    NotDirectory { path: PathBuf, resolved: PathBuf },
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoNodeModules => f.write_str(
                "Could not locate node_modules directory from any prefix candidate; skipping.",
            ),
            Self::PackageMissing { path } => write!(
                f,
                "Package directory {} does not exist yet; skipping.",
                path.display()
            ),
            Self::NotSymlink { path } => write!(
                f,
                "Package directory {} is not a symlink; nothing to do.",
                path.display()
            ),
            Self::ForeignLink { resolved, .. } => write!(
                f,
                "Resolved path {} is not a temporary git clone; skipping.",
                resolved.display()
            ),
            Self::NotDirectory { resolved, .. } => write!(
                f,
                "Resolved path {} is not a directory; skipping.",
                resolved.display()
            ),
        }
    }
}

/// How a run ended. Every variant counts as success for the installer.
#[derive(Debug)]
pub enum Outcome {
    /// The link was replaced by a real copy of `source`.
    Applied { package_dir: PathBuf, source: PathBuf },
    /// Dry run: the link is fragile and this plan would fix it.
    Planned(MaterializationPlan),
    NotApplicable(Skip),
    Failed(Error),
}

impl Outcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The skip reason, if the run had nothing to do.
    #[must_use]
    pub fn skip(&self) -> Option<&Skip> {
        match self {
            Self::NotApplicable(skip) => Some(skip),
            _ => None,
        }
    }
}

/// Run the fix against the real filesystem.
#[must_use]
pub fn run(ctx: &InstallContext, options: RunOptions) -> Outcome {
    run_with(ctx, options, &RealFs)
}

/// Run the fix, performing the materialization through `fs`.
pub fn run_with<F>(ctx: &InstallContext, options: RunOptions, fs: &F) -> Outcome
where
    F: MaterializeFs + ?Sized,
{
    let prefixes = collect_prefix_candidates(ctx);
    debug!("Prefix candidates: {}", join_paths(&prefixes));

    let Some(node_modules) = locate_node_modules(&prefixes, ctx.platform, Path::exists) else {
        return skip(Skip::NoNodeModules);
    };
    debug!(
        "Using prefix {}, node_modules at {}",
        node_modules.prefix.display(),
        node_modules.path.display()
    );

    let package_dir = package_dir(&node_modules.path, &ctx.package_name);
    if !package_dir.exists() {
        return skip(Skip::PackageMissing { path: package_dir });
    }

    let resolved = match classify(&package_dir, ctx.platform) {
        Ok(LinkClass::CacheClone { resolved }) => resolved,
        Ok(LinkClass::NotSymlink) => return skip(Skip::NotSymlink { path: package_dir }),
        Ok(LinkClass::Foreign { resolved }) => {
            return skip(Skip::ForeignLink {
                path: package_dir,
                resolved,
            })
        }
        Ok(LinkClass::NotDirectory { resolved }) => {
            return skip(Skip::NotDirectory {
                path: package_dir,
                resolved,
            })
        }
        Err(err) => {
            debug!("{err}");
            return Outcome::Failed(err);
        }
    };

    let plan = MaterializationPlan::new(resolved, package_dir);
    if options.dry_run {
        debug!(
            "Dry run: would copy {} to {} and replace {}",
            plan.source.display(),
            plan.staging.display(),
            plan.destination.display()
        );
        return Outcome::Planned(plan);
    }

    match materialize(&plan, fs) {
        Ok(()) => {
            debug!("Postinstall copy completed successfully");
            Outcome::Applied {
                package_dir: plan.destination,
                source: plan.source,
            }
        }
        Err(err) => {
            debug!("Postinstall fix failed: {err}");
            Outcome::Failed(err.into())
        }
    }
}

fn skip(reason: Skip) -> Outcome {
    debug!("{reason}");
    Outcome::NotApplicable(reason)
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
