use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::SUPPORTED_EXTENSIONS;
use crate::utils::has_valid_extension;

/// One step of a directory walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    /// A directory whose listing is about to be visited
    Directory(PathBuf),
    /// A file with a supported extension
    Candidate(PathBuf),
    /// A file passed over for its extension
    Ignored(PathBuf),
}

/// Lazily walk `root`, classifying what it finds.
///
/// Each directory is listed in one go when the walk enters it (sorting forces
/// this), so PNGs written next to their sources are never picked up as new
/// candidates. Without `recursive` the walk stops at the root's own files.
pub fn walk(root: &Path, recursive: bool) -> impl Iterator<Item = Result<WalkEntry>> {
    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    walker.into_iter().filter_map(|entry| {
        let entry = match entry.context("Failed to read directory entry") {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };

        if entry.file_type().is_dir() {
            Some(Ok(WalkEntry::Directory(entry.into_path())))
        } else if entry.path().is_file() {
            if has_valid_extension(entry.path(), SUPPORTED_EXTENSIONS) {
                Some(Ok(WalkEntry::Candidate(entry.into_path())))
            } else {
                Some(Ok(WalkEntry::Ignored(entry.into_path())))
            }
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    fn names(root: &Path, recursive: bool) -> Vec<String> {
        walk(root, recursive)
            .filter_map(|entry| match entry.unwrap() {
                WalkEntry::Candidate(path) => Some(path),
                _ => None,
            })
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_discover_filters_extensions() {
        let dir = tempdir().unwrap();
        for name in ["a.jpg", "b.PNG", "c.Tif", "d.ico", "notes.txt", "noext"] {
            touch(&dir.path().join(name));
        }

        assert_eq!(names(dir.path(), true), vec!["a.jpg", "b.PNG", "c.Tif", "d.ico"]);
    }

    #[test]
    fn test_discover_recursive() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("top.gif"));
        touch(&dir.path().join("nested/deeper/inner.webp"));
        touch(&dir.path().join("nested/photo.jpeg"));

        assert_eq!(
            names(dir.path(), true),
            vec!["nested/deeper/inner.webp", "nested/photo.jpeg", "top.gif"]
        );
    }

    #[test]
    fn test_discover_non_recursive_stays_at_root() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("top.bmp"));
        touch(&dir.path().join("nested/photo.jpg"));

        assert_eq!(names(dir.path(), false), vec!["top.bmp"]);
    }

    #[test]
    fn test_walk_reports_directories_and_ignored_files() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("sub/b.gif"));

        let entries: Vec<WalkEntry> = walk(dir.path(), true).map(|e| e.unwrap()).collect();

        assert_eq!(
            entries,
            vec![
                WalkEntry::Directory(dir.path().to_path_buf()),
                WalkEntry::Candidate(dir.path().join("a.jpg")),
                WalkEntry::Ignored(dir.path().join("notes.txt")),
                WalkEntry::Directory(dir.path().join("sub")),
                WalkEntry::Candidate(dir.path().join("sub/b.gif")),
            ]
        );
    }

    #[test]
    fn test_directory_named_like_image_is_ignored() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("album.jpg")).unwrap();
        touch(&dir.path().join("album.jpg/cover.png"));

        assert_eq!(names(dir.path(), true), vec!["album.jpg/cover.png"]);
    }
}
