use path_clean::PathClean;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a tilde, and paths where the home directory cannot be
/// determined, are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(path_str) = path.to_str() else {
        return path.to_path_buf();
    };
    if path_str != "~" && !path_str.starts_with("~/") {
        return path.to_path_buf();
    }
    match dirs::home_dir() {
        Some(home) if path_str == "~" => home,
        Some(home) => home.join(&path_str[2..]),
        None => path.to_path_buf(),
    }
}

/// Joins `relative` onto `base` and returns the cleaned result only if it
/// lies strictly below `base`.
///
/// Absolute or empty components, and `..` sequences climbing out of `base`,
/// yield `None`. The check is purely lexical; symlinks inside `base` are not
/// resolved.
#[must_use]
pub fn join_under(base: &Path, relative: impl AsRef<Path>) -> Option<PathBuf> {
    let relative = relative.as_ref();
    if relative.as_os_str().is_empty()
        || relative
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return None;
    }

    let base = base.clean();
    let joined = base.join(relative).clean();

    let contained = if base == Path::new(".") {
        // `clean` drops the leading `.`, so containment means "no climb out"
        !matches!(
            joined.components().next(),
            None | Some(Component::ParentDir | Component::CurDir)
        )
    } else {
        joined != base && joined.starts_with(&base)
    };

    contained.then_some(joined)
}

/// Computes the path of `target` relative to the directory `link_dir`.
///
/// Both inputs are cleaned first. Returns `None` when no relative path
/// exists, e.g. when one side is absolute and the other is not, or when
/// `link_dir` climbs through `..` past the common prefix.
#[must_use]
pub fn relative_link_target(link_dir: &Path, target: &Path) -> Option<PathBuf> {
    let from = link_dir.clean();
    let to = target.clean();
    if from.is_absolute() != to.is_absolute() {
        return None;
    }
    pathdiff::diff_paths(&to, &from).filter(|rel| !rel.as_os_str().is_empty() && rel.is_relative())
}

/// Creates `path` and all missing ancestors, owner-writable and
/// world-readable (0755 on unix).
///
/// # Errors
///
/// Returns the underlying I/O error, including when a non-directory already
/// occupies one of the path components.
pub fn create_dir_tree(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path)
}

/// Creates a symlink at `link` whose recorded target is `target`, verbatim.
///
/// # Errors
///
/// Returns the underlying I/O error (e.g. `link` already exists).
#[cfg(unix)]
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

/// Creates a symlink at `link` whose recorded target is `target`, verbatim.
///
/// # Errors
///
/// Returns the underlying I/O error (e.g. `link` already exists, or the
/// process lacks the symlink privilege).
#[cfg(windows)]
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

/// Symlinks are unavailable on this platform.
///
/// # Errors
///
/// Always returns [`io::ErrorKind::Unsupported`].
#[cfg(not(any(unix, windows)))]
pub fn create_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_join_under_accepts_nested_names() {
        let base = Path::new("/dst/photos");
        assert_eq!(
            join_under(base, "2021/beach.jpg"),
            Some(PathBuf::from("/dst/photos/2021/beach.jpg"))
        );
        assert_eq!(
            join_under(base, "a/../b.jpg"),
            Some(PathBuf::from("/dst/photos/b.jpg"))
        );
    }

    #[test]
    fn test_join_under_rejects_escapes() {
        let base = Path::new("/dst");
        assert_eq!(join_under(base, ""), None);
        assert_eq!(join_under(base, "/etc"), None);
        assert_eq!(join_under(base, ".."), None);
        assert_eq!(join_under(base, "../other/x"), None);
        assert_eq!(join_under(base, "."), None);
        assert_eq!(join_under(base, "x/.."), None);
    }

    #[test]
    fn test_join_under_relative_base() {
        assert_eq!(
            join_under(Path::new("."), "a.txt"),
            Some(PathBuf::from("a.txt"))
        );
        assert_eq!(join_under(Path::new("."), "../a.txt"), None);
        assert_eq!(
            join_under(Path::new("../src"), "a.txt"),
            Some(PathBuf::from("../src/a.txt"))
        );
    }

    #[test]
    fn test_relative_link_target_absolute() {
        let rel = relative_link_target(Path::new("/dst/x"), Path::new("/src/a.txt"));
        assert_eq!(rel, Some(PathBuf::from("../../src/a.txt")));

        let rel = relative_link_target(Path::new("/dst/x/"), Path::new("/dst/x/../../src/a.txt"));
        assert_eq!(rel, Some(PathBuf::from("../../src/a.txt")));
    }

    #[test]
    fn test_relative_link_target_relative() {
        let rel = relative_link_target(Path::new("dst/x/sub"), Path::new("src/sub/a.txt"));
        assert_eq!(rel, Some(PathBuf::from("../../../src/sub/a.txt")));
    }

    #[test]
    fn test_relative_link_target_mixed_roots() {
        assert_eq!(
            relative_link_target(Path::new("dst/x"), Path::new("/src/a.txt")),
            None
        );
        assert_eq!(
            relative_link_target(Path::new("/dst/x"), Path::new("src/a.txt")),
            None
        );
    }

    #[test]
    fn test_create_dir_tree_nested() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b/c");

        create_dir_tree(&nested).unwrap();
        assert!(nested.is_dir());

        // Existing directories are fine
        create_dir_tree(&nested).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_create_dir_tree_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("tagged");
        create_dir_tree(&dir).unwrap();

        let mode = fs::metadata(&dir).unwrap().permissions().mode();
        // umask may clear group/other bits but never owner bits
        assert_eq!(mode & 0o700, 0o700);
    }

    #[test]
    fn test_create_dir_tree_blocked_by_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("occupied");
        fs::write(&file, b"x").unwrap();

        assert!(create_dir_tree(&file.join("child")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_create_symlink_records_target_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let link = temp_dir.path().join("link");

        create_symlink(Path::new("../missing/target"), &link).unwrap();
        assert_eq!(
            fs::read_link(&link).unwrap(),
            PathBuf::from("../missing/target")
        );
        assert!(create_symlink(Path::new("other"), &link).is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let no_tilde = PathBuf::from("/absolute/path");
        assert_eq!(expand_tilde(&no_tilde), no_tilde);

        let not_home = PathBuf::from("~user/x");
        assert_eq!(expand_tilde(&not_home), not_home);

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(Path::new("~")), home);
            assert_eq!(expand_tilde(Path::new("~/pics")), home.join("pics"));
        }
    }
}
