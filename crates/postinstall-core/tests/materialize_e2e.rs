//! End-to-end runs of the fix against scratch install trees.
//!
//! Each test builds a fake npm prefix with `lib/node_modules/@scope/pkg`
//! linked somewhere, runs the pipeline, and inspects the result on disk.

#![cfg(unix)]

use postinstall_core::{
    run, run_with, InstallContext, MaterializeFs, MaterializeStage, Outcome, Platform, RealFs,
    RunOptions, Skip,
};
use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Install {
    _root: TempDir,
    prefix: PathBuf,
    package_dir: PathBuf,
    source: PathBuf,
}

impl Install {
    fn context(&self) -> InstallContext {
        InstallContext::new(Platform::Unix)
            .with_prefix_override(&self.prefix)
            .with_package_name("@scope/pkg")
    }
}

/// Fake prefix whose package dir links to `source_rel` (relative to the scratch root).
fn install_linked_to(source_rel: &str) -> Install {
    let root = TempDir::new().unwrap();
    let prefix = root.path().join("fakeprefix");
    let node_modules = prefix.join("lib").join("node_modules");
    fs::create_dir_all(node_modules.join("@scope")).unwrap();

    let source = root.path().join(source_rel);
    fs::create_dir_all(source.join("sub")).unwrap();
    fs::write(source.join("a.txt"), b"alpha\n").unwrap();
    fs::write(source.join("sub").join("b.txt"), [0u8, 159, 146, 150]).unwrap();

    let package_dir = node_modules.join("@scope").join("pkg");
    symlink(&source, &package_dir).unwrap();

    Install {
        _root: root,
        prefix,
        package_dir,
        source,
    }
}

fn is_link(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

fn sibling_names(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_cache_clone_link_is_materialized() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");

    let outcome = run(&install.context(), RunOptions::default());

    assert!(outcome.is_applied(), "unexpected outcome: {outcome:?}");
    assert!(!is_link(&install.package_dir));
    assert!(install.package_dir.is_dir());
    assert_eq!(
        fs::read(install.package_dir.join("a.txt")).unwrap(),
        fs::read(install.source.join("a.txt")).unwrap()
    );
    assert_eq!(
        fs::read(install.package_dir.join("sub").join("b.txt")).unwrap(),
        fs::read(install.source.join("sub").join("b.txt")).unwrap()
    );
    // No staging directory left next to the package
    assert_eq!(sibling_names(&install.package_dir), vec!["pkg".to_string()]);
}

#[test]
fn test_materialized_copy_survives_cache_prune() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");

    assert!(run(&install.context(), RunOptions::default()).is_applied());
    fs::remove_dir_all(&install.source).unwrap();

    assert_eq!(
        fs::read(install.package_dir.join("a.txt")).unwrap(),
        b"alpha\n"
    );
}

#[test]
fn test_second_run_is_noop() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");
    let ctx = install.context();

    assert!(run(&ctx, RunOptions::default()).is_applied());
    let second = run(&ctx, RunOptions::default());

    assert_eq!(
        second.skip(),
        Some(&Skip::NotSymlink {
            path: install.package_dir.clone()
        })
    );
    assert_eq!(sibling_names(&install.package_dir), vec!["pkg".to_string()]);
    assert_eq!(
        fs::read(install.package_dir.join("a.txt")).unwrap(),
        b"alpha\n"
    );
}

#[test]
fn test_developer_link_untouched() {
    let install = install_linked_to("home/user/src/pkg");

    let outcome = run(&install.context(), RunOptions::default());

    match outcome {
        Outcome::NotApplicable(Skip::ForeignLink { path, resolved }) => {
            assert_eq!(path, install.package_dir);
            assert_eq!(resolved, fs::canonicalize(&install.source).unwrap());
        }
        other => panic!("expected foreign link, got {other:?}"),
    }
    assert!(is_link(&install.package_dir));
    assert_eq!(fs::read_link(&install.package_dir).unwrap(), install.source);
}

#[test]
fn test_dry_run_does_not_mutate() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");

    let outcome = run(&install.context(), RunOptions { dry_run: true });

    match outcome {
        Outcome::Planned(plan) => {
            assert_eq!(plan.destination, install.package_dir);
            assert_eq!(plan.source, fs::canonicalize(&install.source).unwrap());
            assert!(!plan.staging.exists());
        }
        other => panic!("expected a plan, got {other:?}"),
    }
    assert!(is_link(&install.package_dir));
    assert_eq!(sibling_names(&install.package_dir), vec!["pkg".to_string()]);
}

struct CopyFails;

impl MaterializeFs for CopyFails {
    fn copy_tree(&self, src: &Path, dst: &Path) -> io::Result<()> {
        // Copy something, then fail as if the source vanished mid-copy
        fs::create_dir_all(dst)?;
        fs::copy(src.join("a.txt"), dst.join("a.txt"))?;
        Err(io::Error::new(io::ErrorKind::NotFound, "source vanished"))
    }

    fn remove_link(&self, path: &Path) -> io::Result<()> {
        RealFs.remove_link(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        RealFs.rename(from, to)
    }
}

#[test]
fn test_copy_failure_keeps_working_link() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");

    let outcome = run_with(&install.context(), RunOptions::default(), &CopyFails);

    match outcome {
        Outcome::Failed(postinstall_core::Error::Materialize(err)) => {
            assert_eq!(err.stage, MaterializeStage::Copying);
            assert!(err.original_intact());
            // The partial copy is abandoned in place
            assert!(err.staging.join("a.txt").exists());
        }
        other => panic!("expected a materialize failure, got {other:?}"),
    }
    assert!(is_link(&install.package_dir));
    assert_eq!(
        fs::read(install.package_dir.join("sub").join("b.txt")).unwrap(),
        [0u8, 159, 146, 150]
    );
}

#[test]
fn test_failed_run_can_be_retried() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");
    let ctx = install.context();

    assert!(run_with(&ctx, RunOptions::default(), &CopyFails).is_failed());
    assert!(run(&ctx, RunOptions::default()).is_applied());
    assert!(!is_link(&install.package_dir));
}

#[test]
fn test_dangling_link_is_treated_as_missing() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");
    fs::remove_dir_all(&install.source).unwrap();

    let outcome = run(&install.context(), RunOptions::default());

    assert_eq!(
        outcome.skip(),
        Some(&Skip::PackageMissing {
            path: install.package_dir.clone()
        })
    );
    assert!(is_link(&install.package_dir));
}

#[test]
fn test_first_prefix_with_node_modules_wins() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");
    let other = TempDir::new().unwrap();
    fs::create_dir_all(other.path().join("node_modules")).unwrap();

    // The higher-priority prefix has node_modules but no package
    let ctx = install
        .context()
        .with_prefix_override(other.path())
        .with_global_prefix_override(&install.prefix);
    let outcome = run(&ctx, RunOptions::default());

    assert!(matches!(
        outcome,
        Outcome::NotApplicable(Skip::PackageMissing { .. })
    ));
    assert!(is_link(&install.package_dir));
}

#[test]
fn test_default_prefix_from_executable() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");
    let ctx = InstallContext::new(Platform::Unix)
        .with_executable_path(install.prefix.join("bin").join("node"))
        .with_package_name("@scope/pkg");

    assert!(run(&ctx, RunOptions::default()).is_applied());
    assert!(!is_link(&install.package_dir));
}

#[test]
fn test_cache_link_to_file_untouched() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");
    let tarball = install.source.join("pkg.tgz");
    fs::write(&tarball, b"tgz").unwrap();
    fs::remove_file(&install.package_dir).unwrap();
    symlink(&tarball, &install.package_dir).unwrap();

    let outcome = run(&install.context(), RunOptions::default());

    match outcome {
        Outcome::NotApplicable(Skip::NotDirectory { path, resolved }) => {
            assert_eq!(path, install.package_dir);
            assert_eq!(resolved, fs::canonicalize(&tarball).unwrap());
        }
        other => panic!("expected a non-directory skip, got {other:?}"),
    }
    assert!(is_link(&install.package_dir));
    assert_eq!(fs::read(&install.package_dir).unwrap(), b"tgz");
    assert_eq!(sibling_names(&install.package_dir), vec!["pkg".to_string()]);
}

#[test]
fn test_special_file_in_clone_keeps_link() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");
    let status = std::process::Command::new("mkfifo")
        .arg(install.source.join("pipe"))
        .status()
        .unwrap();
    assert!(status.success());

    let outcome = run(&install.context(), RunOptions::default());

    match outcome {
        Outcome::Failed(postinstall_core::Error::Materialize(err)) => {
            assert_eq!(err.stage, MaterializeStage::Copying);
            assert_eq!(err.source.kind(), io::ErrorKind::Unsupported);
        }
        other => panic!("expected a copy failure, got {other:?}"),
    }
    assert!(is_link(&install.package_dir));
    assert_eq!(
        fs::read(install.package_dir.join("a.txt")).unwrap(),
        b"alpha\n"
    );
}

#[test]
fn test_absolute_inner_link_survives_cache_prune() {
    let install = install_linked_to("home/user/.npm/_cacache/tmp/git-clone-XYZ");
    let real_source = fs::canonicalize(&install.source).unwrap();
    fs::create_dir_all(install.source.join("node_modules").join(".bin")).unwrap();
    symlink(
        real_source.join("a.txt"),
        install.source.join("node_modules").join(".bin").join("a"),
    )
    .unwrap();

    assert!(run(&install.context(), RunOptions::default()).is_applied());
    fs::remove_dir_all(&install.source).unwrap();

    let link = install.package_dir.join("node_modules").join(".bin").join("a");
    assert!(is_link(&link));
    assert_eq!(fs::read(&link).unwrap(), b"alpha\n");
}
