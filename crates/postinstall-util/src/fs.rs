use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Recursively copy the directory tree at `src` into `dst`.
///
/// `dst` is created if missing. Directories are recreated, regular files are
/// copied with their permissions, and nested symbolic links are recreated as
/// links (they are not followed). A nested link with an absolute target
/// inside `src` is rewritten to the equivalent relative target, so the copy
/// does not keep pointing back into `src`.
///
/// # Errors
/// Returns `InvalidInput` if `src` is not a directory, `Unsupported` for an
/// entry that is neither a directory, a regular file nor a link (FIFOs,
/// sockets, devices), or the first I/O error hit while walking or copying.
/// Whatever was already copied into `dst` is left in place.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    if !fs::metadata(src)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a directory", src.display()),
        ));
    }

    fs::create_dir_all(dst)?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(relative);
        let ty = entry.file_type();

        if ty.is_dir() {
            fs::create_dir_all(&target)?;
        } else if ty.is_symlink() {
            let link_target = fs::read_link(entry.path())?;
            let link_target = rebase_link_target(src, relative, link_target);
            copy_symlink(entry.path(), &link_target, &target)?;
        } else if ty.is_file() {
            fs::copy(entry.path(), &target)?;
        } else {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{} is not a regular file", entry.path().display()),
            ));
        }
    }

    Ok(())
}

/// Turn an absolute `link_target` under `root` into a target relative to the
/// link at `root/link_relative`. Other targets are returned unchanged.
fn rebase_link_target(root: &Path, link_relative: &Path, link_target: PathBuf) -> PathBuf {
    if !link_target.is_absolute() || !link_target.starts_with(root) {
        return link_target;
    }
    let inside = link_target.strip_prefix(root).unwrap_or(&link_target);

    let depth = link_relative.parent().map_or(0, |parent| {
        parent
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count()
    });

    let mut rebased = PathBuf::new();
    for _ in 0..depth {
        rebased.push("..");
    }
    rebased.push(inside);
    if rebased.as_os_str().is_empty() {
        rebased.push(".");
    }
    rebased
}

/// Remove a symbolic link (or Windows junction) without following it.
///
/// Refuses to touch anything that is not a link, so a real directory can
/// never be deleted through this call.
///
/// # Errors
/// Returns `InvalidInput` if `path` is not a link, or the underlying error if
/// the removal fails.
pub fn remove_link(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if !metadata.file_type().is_symlink() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a symbolic link", path.display()),
        ));
    }

    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;

        // FILE_ATTRIBUTE_DIRECTORY = 0x10: directory links need remove_dir
        if metadata.file_attributes() & 0x10 != 0 {
            return fs::remove_dir(path);
        }
    }

    fs::remove_file(path)
}

#[cfg(unix)]
fn copy_symlink(_src: &Path, target: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(windows)]
fn copy_symlink(src: &Path, target: &Path, dst: &Path) -> io::Result<()> {
    if fs::metadata(src).map(|m| m.is_dir()).unwrap_or(false) {
        std::os::windows::fs::symlink_dir(target, dst)
    } else {
        std::os::windows::fs::symlink_file(target, dst)
    }
}

#[cfg(not(any(unix, windows)))]
fn copy_symlink(src: &Path, _target: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst).map(|_| ())
}
