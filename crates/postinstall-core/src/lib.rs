#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! Repairs a globally installed package that npm left as a symlink into its
//! temporary git-clone cache.
//!
//! The run is a linear pipeline: collect prefix candidates, locate the global
//! `node_modules`, resolve the package directory, classify it, and, when it is
//! a link into `.npm/_cacache/tmp/git-clone*`, replace the link with a real
//! copy of its content. Every stage can end the run early; see [`Outcome`].

pub mod classify;
pub mod config;
pub mod error;
pub mod locate;
pub mod materialize;
pub mod package;
pub mod pipeline;
pub mod prefix;
pub mod version;

pub use classify::{cache_clone_fragment, classify, is_cache_clone, LinkClass};
pub use config::{InstallContext, Platform};
pub use error::{Error, MaterializeError};
pub use locate::{find_first, locate_node_modules, node_modules_candidates, NodeModulesDir};
pub use materialize::{materialize, MaterializationPlan, MaterializeFs, MaterializeStage, RealFs};
pub use package::{package_dir, PACKAGE_NAME};
pub use pipeline::{run, run_with, Outcome, RunOptions, Skip};
pub use prefix::{collect_prefix_candidates, default_prefix};
pub use version::VERSION;
