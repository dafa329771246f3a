//! Discovery of post and page files on disk.
//!
//! Posts live one directory below the posts root (`{root}/{date-folder}/{slug}.md`),
//! pages sit directly in the pages root (`{root}/{slug}.md`). Results come back
//! in lexical path order; nothing here sorts by date.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("content directory does not exist: {0}")]
    NotFound(PathBuf),

    #[error("content path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: walkdir::Error,
    },
}

// =============================================================================
// Scanning
// =============================================================================

/// List `{root}/*/*.md`.
pub fn scan_posts(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    scan_markdown(root, 2)
}

/// List `{root}/*.md`.
pub fn scan_pages(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    scan_markdown(root, 1)
}

/// Collect markdown files at exactly `depth` levels below `root`.
fn scan_markdown(root: &Path, depth: usize) -> Result<Vec<PathBuf>, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|e| ScanError::ReadDir {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e,
        })?;

        if entry.depth() == depth && entry.file_type().is_file() && is_markdown(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_scan_posts_one_level_deep() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("2024-09-12/hello.md"));
        touch(&root.join("2023-01-01/older.md"));
        touch(&root.join("2023-01-01/notes.txt"));
        touch(&root.join("top-level.md"));
        touch(&root.join("2024-09-12/nested/too-deep.md"));
        touch(&root.join(".drafts/hidden.md"));

        let posts = scan_posts(root).unwrap();
        assert_eq!(
            posts,
            vec![
                root.join("2023-01-01/older.md"),
                root.join("2024-09-12/hello.md"),
            ]
        );
    }

    #[test]
    fn test_scan_pages_is_flat() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("contact.md"));
        touch(&root.join("about.md"));
        touch(&root.join("sub/ignored.md"));
        touch(&root.join("image.png"));

        let pages = scan_pages(root).unwrap();
        assert_eq!(pages, vec![root.join("about.md"), root.join("contact.md")]);
    }

    #[test]
    fn test_scan_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_posts(dir.path()).unwrap().is_empty());
        assert!(scan_pages(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            scan_posts(&dir.path().join("nope")),
            Err(ScanError::NotFound(_))
        ));
    }

    #[test]
    fn test_scan_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.md");
        touch(&file);
        assert!(matches!(
            scan_pages(&file),
            Err(ScanError::NotADirectory(_))
        ));
    }
}
