//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`.
/// Returns the path to the config file if found.
///
/// # Example
/// ```text
/// /srv/site/public/media/   ← cwd
/// /srv/site/urlindex.toml   ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }
    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd, config_name)
}

/// Walk up from `start` looking for `name`.
fn find_upward(start: &Path, name: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.exists())
}

/// Resolve `path` against `root` unless it is already absolute.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_upward() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("urlindex.toml"), "").unwrap();

        let found = find_upward(&nested, Path::new("urlindex.toml")).unwrap();
        assert_eq!(found, dir.path().join("urlindex.toml"));
        assert!(find_upward(&nested, Path::new("missing.toml")).is_none());
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/srv/site");
        assert_eq!(
            resolve_path(root, Path::new("urlindex.json")),
            PathBuf::from("/srv/site/urlindex.json")
        );
        assert_eq!(
            resolve_path(root, Path::new("/var/db.json")),
            PathBuf::from("/var/db.json")
        );
    }
}
