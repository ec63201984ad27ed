// pulp-image/src/processors/planner.rs
use crate::core::formats::is_supported_input;
use crate::core::{PulpError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the supported image files directly inside `directory`.
///
/// Subdirectories are not entered. Entries that cannot be inspected are
/// skipped; only a failure to list the directory itself is an error.
/// Results are sorted by file name so `{index}` numbering is stable.
pub fn plan_tasks(directory: &Path) -> Result<Vec<PathBuf>> {
    let root = crate::utils::resolve_path(directory)?;

    let metadata = std::fs::metadata(&root).map_err(|source| PulpError::DirectoryRead {
        path: root.clone(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(PulpError::DirectoryRead {
            path: root.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        });
    }

    let walker = WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut tasks = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk failed"));
                return Err(PulpError::DirectoryRead { path: root, source });
            }
            Err(err) => {
                log::debug!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        if entry.file_type().is_file() && is_supported_input(entry.path()) {
            tasks.push(entry.into_path());
        }
    }

    log::debug!("Planned {} task(s) in {}", tasks.len(), root.display());
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_filters_and_orders_entries() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("c.JPG"), b"x").unwrap();
        fs::write(temp.path().join("a.png"), b"x").unwrap();
        fs::write(temp.path().join("b.txt"), b"x").unwrap();
        fs::create_dir(temp.path().join("d")).unwrap();
        fs::write(temp.path().join("d").join("nested.png"), b"x").unwrap();

        let tasks = plan_tasks(temp.path()).unwrap();
        let names: Vec<_> = tasks
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "c.JPG"]);
        assert!(tasks.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_directory_named_like_image_is_excluded() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("folder.png")).unwrap();
        assert!(plan_tasks(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_fails() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(
            plan_tasks(&missing),
            Err(PulpError::DirectoryRead { .. })
        ));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a.png");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            plan_tasks(&file),
            Err(PulpError::DirectoryRead { .. })
        ));
    }
}
