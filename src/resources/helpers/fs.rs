//! File-system resource helpers: atomic replacement, recursive mirroring,
//! and content digests.
//!
//! Every write into a game directory goes through a temporary sibling that
//! is renamed into place, so an interrupted run never leaves a half-written
//! mod archive, mod list, or config file behind.
use anyhow::{Context as _, Result};
use sha2::{Digest as _, Sha256};
use std::io::Write as _;
use std::path::Path;

/// SHA-256 digest bytes.
pub type Digest = [u8; 32];

/// Prefix of every temporary file or directory created next to a target.
const TEMP_PREFIX: &str = ".fa-release-";

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove whatever exists at `path`: a file, a symlink (including a broken
/// one), or a directory tree.  Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
    .with_context(|| format!("remove existing: {}", path.display()))
}

/// Write `contents` to `path` atomically: stage into a temp file in the same
/// directory, flush it to disk, then rename it over `path`.
///
/// # Errors
///
/// Returns an error if the parent directory is not writable or the rename
/// fails.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("write temp file for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("flush temp file for {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("rename temp file to {}", path.display()))?;
    Ok(())
}

/// Copy `source` to `target` atomically (temp sibling, then rename).
///
/// # Errors
///
/// Returns an error if the source cannot be read or the target cannot be
/// written.
pub fn copy_atomic(source: &Path, target: &Path) -> Result<()> {
    ensure_parent_dir(target)?;
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    let mut input = std::fs::File::open(source)
        .with_context(|| format!("open {}", source.display()))?;
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    std::io::copy(&mut input, tmp.as_file_mut())
        .with_context(|| format!("copy {} to {}", source.display(), target.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("flush temp file for {}", target.display()))?;
    tmp.persist(target)
        .map_err(|e| e.error)
        .with_context(|| format!("rename temp file to {}", target.display()))?;
    Ok(())
}

/// Recursively copy a directory tree.
///
/// When `skip_git` is `true`, `.git` directories are skipped; mod sources
/// are often git checkouts and Factorio has no use for their metadata.
///
/// Symlinks within the source tree are *followed*: directory symlinks are
/// recursed into and their contents materialised.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path, skip_git: bool) -> Result<()> {
    std::fs::create_dir_all(dst)
        .with_context(|| format!("creating directory {}", dst.display()))?;
    for entry in
        std::fs::read_dir(src).with_context(|| format!("reading directory {}", src.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            if skip_git && entry.file_name() == ".git" {
                continue;
            }
            copy_dir_recursive(&src_path, &dst_path, skip_git)?;
        } else {
            std::fs::copy(&src_path, &dst_path).with_context(|| {
                format!("copying {} to {}", src_path.display(), dst_path.display())
            })?;
        }
    }
    Ok(())
}

/// Replace the directory at `target` with a copy of `source`.
///
/// The copy is staged in a temp directory beside `target`; only once it is
/// complete is the old directory removed and the staged one renamed into
/// place.  A failed copy leaves `target` untouched.
///
/// # Errors
///
/// Returns an error if staging, removal of the old tree, or the final
/// rename fails.
pub fn mirror_dir_atomic(source: &Path, target: &Path, skip_git: bool) -> Result<()> {
    ensure_parent_dir(target)?;
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    let staging = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempdir_in(parent)
        .with_context(|| format!("create staging directory in {}", parent.display()))?;
    copy_dir_recursive(source, staging.path(), skip_git)?;
    remove_existing(target)?;
    // After the rename the TempDir guard points at nothing; its drop is a no-op.
    std::fs::rename(staging.path(), target).with_context(|| {
        format!(
            "rename {} to {}",
            staging.path().display(),
            target.display()
        )
    })?;
    Ok(())
}

/// SHA-256 of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_digest(path: &Path) -> Result<Digest> {
    let mut file =
        std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).with_context(|| format!("read {}", path.display()))?;
    Ok(hasher.finalize().into())
}

/// SHA-256 over a directory tree: relative paths and file contents, visited
/// in sorted order so the digest is independent of directory listing order.
///
/// # Errors
///
/// Returns an error if any entry cannot be read.
pub fn tree_digest(dir: &Path, skip_git: bool) -> Result<Digest> {
    let mut hasher = Sha256::new();
    hash_tree(dir, Path::new(""), skip_git, &mut hasher)?;
    Ok(hasher.finalize().into())
}

fn hash_tree(base: &Path, rel: &Path, skip_git: bool, hasher: &mut Sha256) -> Result<()> {
    let dir = base.join(rel);
    let mut entries: Vec<_> = std::fs::read_dir(&dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("reading entry in {}", dir.display()))?;
    entries.sort_by_key(std::fs::DirEntry::file_name);
    for entry in entries {
        let name = entry.file_name();
        let rel_path = rel.join(&name);
        let path = entry.path();
        if path.is_dir() {
            if skip_git && name == ".git" {
                continue;
            }
            hasher.update(b"d:");
            hasher.update(rel_path.to_string_lossy().as_bytes());
            hasher.update([0]);
            hash_tree(base, &rel_path, skip_git, hasher)?;
        } else {
            hasher.update(b"f:");
            hasher.update(rel_path.to_string_lossy().as_bytes());
            hasher.update([0]);
            hasher.update(file_digest(&path)?);
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn copies_files_and_subdirectories() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        std::fs::write(src.path().join("a.txt"), b"aaa").unwrap();
        std::fs::create_dir(src.path().join("sub")).unwrap();
        std::fs::write(src.path().join("sub/b.txt"), b"bbb").unwrap();

        let target = dst.path().join("out");
        copy_dir_recursive(src.path(), &target, false).unwrap();

        assert_eq!(std::fs::read(target.join("a.txt")).unwrap(), b"aaa");
        assert_eq!(std::fs::read(target.join("sub/b.txt")).unwrap(), b"bbb");
    }

    #[test]
    fn skips_git_directory_when_flag_set() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        std::fs::write(src.path().join("file.txt"), b"content").unwrap();
        std::fs::create_dir(src.path().join(".git")).unwrap();
        std::fs::write(src.path().join(".git/HEAD"), b"ref: refs/heads/main").unwrap();

        let target = dst.path().join("out");
        copy_dir_recursive(src.path(), &target, true).unwrap();

        assert!(target.join("file.txt").exists());
        assert!(
            !target.join(".git").exists(),
            ".git directory should be skipped"
        );
    }

    // -----------------------------------------------------------------------
    // ensure_parent_dir / remove_existing
    // -----------------------------------------------------------------------

    #[test]
    fn ensure_parent_dir_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("file.txt");
        ensure_parent_dir(&nested).unwrap();
        assert!(dir.path().join("a").join("b").exists());
    }

    #[test]
    fn remove_existing_handles_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("target");
        std::fs::write(&file, "content").unwrap();
        remove_existing(&file).unwrap();
        assert!(!file.exists());

        let tree = dir.path().join("tree");
        std::fs::create_dir_all(tree.join("nested")).unwrap();
        std::fs::write(tree.join("nested/x"), "x").unwrap();
        remove_existing(&tree).unwrap();
        assert!(!tree.exists());

        remove_existing(&dir.path().join("nonexistent")).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn remove_existing_removes_broken_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("/nonexistent/target", &link).unwrap();
        remove_existing(&link).unwrap();
        assert!(link.symlink_metadata().is_err());
    }

    // -----------------------------------------------------------------------
    // atomic writes
    // -----------------------------------------------------------------------

    #[test]
    fn write_atomic_replaces_content_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mods/mod-list.json");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("mods"))
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(TEMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty(), "temp files should be renamed away");
    }

    #[test]
    fn copy_atomic_failure_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("A_1.0.0.zip");
        std::fs::write(&target, b"old").unwrap();
        assert!(copy_atomic(&dir.path().join("missing.zip"), &target).is_err());
        assert_eq!(std::fs::read(&target).unwrap(), b"old");
    }

    #[test]
    fn mirror_dir_atomic_replaces_whole_tree() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("info.json"), b"{}").unwrap();
        let dst = tempfile::tempdir().unwrap();
        let target = dst.path().join("B");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("stale.lua"), b"old").unwrap();

        mirror_dir_atomic(src.path(), &target, true).unwrap();

        assert!(target.join("info.json").is_file());
        assert!(!target.join("stale.lua").exists(), "old files are replaced");
    }

    // -----------------------------------------------------------------------
    // digests
    // -----------------------------------------------------------------------

    #[test]
    fn tree_digest_tracks_content_and_ignores_git() {
        let a = tempfile::tempdir().unwrap();
        std::fs::write(a.path().join("x.lua"), b"1").unwrap();
        let b = tempfile::tempdir().unwrap();
        std::fs::write(b.path().join("x.lua"), b"1").unwrap();
        std::fs::create_dir(b.path().join(".git")).unwrap();
        std::fs::write(b.path().join(".git/HEAD"), b"ref").unwrap();

        assert_eq!(
            tree_digest(a.path(), true).unwrap(),
            tree_digest(b.path(), true).unwrap()
        );
        assert_ne!(
            tree_digest(a.path(), false).unwrap(),
            tree_digest(b.path(), false).unwrap()
        );

        std::fs::write(b.path().join("x.lua"), b"2").unwrap();
        assert_ne!(
            tree_digest(a.path(), true).unwrap(),
            tree_digest(b.path(), true).unwrap()
        );
    }

    #[test]
    fn file_digest_matches_equal_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a"), b"same").unwrap();
        std::fs::write(dir.path().join("b"), b"same").unwrap();
        assert_eq!(
            file_digest(&dir.path().join("a")).unwrap(),
            file_digest(&dir.path().join("b")).unwrap()
        );
    }
}
