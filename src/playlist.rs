//! Folder scanning and lesson ordering.
//!
//! A folder is listed through a [`DirectoryLister`], filtered down to `.mp4`
//! files and ordered by the numeric prefix of each file name.

use crate::types::{by_sort_key, VideoEntry};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The only extension the tracker plays.
pub const VIDEO_EXTENSION: &str = ".mp4";

/// Source of file names for a folder.
pub trait DirectoryLister {
    /// List the file names directly inside `path`, in enumeration order.
    fn list_directory(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Lists folders on the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list_directory(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

/// Outcome of scanning a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    /// The folder was listed; it may still contain no lessons.
    Loaded,
    /// The folder could not be listed; the playlist is empty.
    Unreadable(String),
}

/// An ordered set of lessons from one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    /// Folder the lessons were read from.
    pub folder: PathBuf,
    /// Lessons in playback order.
    pub entries: Vec<VideoEntry>,
    /// Whether the scan succeeded.
    pub status: ScanStatus,
}

impl Playlist {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VideoEntry> {
        self.entries.get(index)
    }

    /// Whether the folder could not be read, as opposed to holding no videos.
    pub fn load_failed(&self) -> bool {
        matches!(self.status, ScanStatus::Unreadable(_))
    }
}

/// Check whether a file name carries the playable extension.
///
/// # Examples
///
/// ```
/// use lesson_tracker::playlist::is_video_file;
///
/// assert!(is_video_file("01.mp4"));
/// assert!(is_video_file("Intro.MP4"));
/// assert!(!is_video_file("notes.txt"));
/// ```
pub fn is_video_file(name: &str) -> bool {
    name.to_lowercase().ends_with(VIDEO_EXTENSION)
}

/// Scan `folder` and build its playlist.
///
/// Unreadable folders produce an empty playlist flagged
/// [`ScanStatus::Unreadable`] rather than an error.
pub fn build_playlist(lister: &dyn DirectoryLister, folder: &Path) -> Playlist {
    let names = match lister.list_directory(folder) {
        Ok(names) => names,
        Err(e) => {
            warn!("Failed to read folder {}: {}", folder.display(), e);
            return Playlist {
                folder: folder.to_path_buf(),
                entries: Vec::new(),
                status: ScanStatus::Unreadable(e.to_string()),
            };
        }
    };

    let mut entries: Vec<VideoEntry> = names
        .iter()
        .filter(|name| is_video_file(name))
        .map(|name| VideoEntry::new(folder, name))
        .collect();

    // sort_by is stable, so equal keys keep enumeration order
    entries.sort_by(by_sort_key);

    debug!(
        "Scanned {}: {} of {} files are lessons",
        folder.display(),
        entries.len(),
        names.len()
    );

    Playlist {
        folder: folder.to_path_buf(),
        entries,
        status: ScanStatus::Loaded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeLister(Vec<&'static str>);

    impl DirectoryLister for FakeLister {
        fn list_directory(&self, _path: &Path) -> io::Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct FailingLister;

    impl DirectoryLister for FailingLister {
        fn list_directory(&self, _path: &Path) -> io::Result<Vec<String>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    fn names(playlist: &Playlist) -> Vec<&str> {
        playlist
            .entries
            .iter()
            .map(|e| e.display_name.as_str())
            .collect()
    }

    #[test]
    fn test_numeric_order_with_unnumbered_last() {
        let lister = FakeLister(vec!["2.mp4", "10.mp4", "1.mp4", "intro.mp4"]);
        let playlist = build_playlist(&lister, Path::new("/course"));
        assert_eq!(names(&playlist), vec!["1.mp4", "2.mp4", "10.mp4", "intro.mp4"]);
        assert_eq!(playlist.status, ScanStatus::Loaded);
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let lister = FakeLister(vec!["outro.mp4", "3.mp4", "01.mp4", "bonus.mp4", "1.mp4"]);
        let playlist = build_playlist(&lister, Path::new("/course"));
        assert_eq!(
            names(&playlist),
            vec!["01.mp4", "1.mp4", "3.mp4", "outro.mp4", "bonus.mp4"]
        );
    }

    #[test]
    fn test_filters_non_video_files() {
        let lister = FakeLister(vec!["1.mp4", "notes.txt", "2.MP4", "3.mkv", "4.mp4.part"]);
        let playlist = build_playlist(&lister, Path::new("/course"));
        assert_eq!(names(&playlist), vec!["1.mp4", "2.MP4"]);
    }

    #[test]
    fn test_paths_are_joined_to_folder() {
        let lister = FakeLister(vec!["1.mp4"]);
        let playlist = build_playlist(&lister, Path::new("/course"));
        assert_eq!(
            playlist.entries[0].path,
            Path::new("/course").join("1.mp4").to_string_lossy()
        );
    }

    #[test]
    fn test_unreadable_folder_is_empty_and_flagged() {
        let playlist = build_playlist(&FailingLister, Path::new("/nope"));
        assert!(playlist.is_empty());
        assert!(playlist.load_failed());
    }

    #[test]
    fn test_empty_folder_is_not_a_failure() {
        let playlist = build_playlist(&FakeLister(vec!["readme.md"]), Path::new("/course"));
        assert!(playlist.is_empty());
        assert!(!playlist.load_failed());
    }

    #[test]
    fn test_fs_lister_reads_files_and_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2.mp4"), b"").unwrap();
        fs::write(dir.path().join("1.mp4"), b"").unwrap();
        fs::create_dir(dir.path().join("3.mp4")).unwrap();

        let playlist = build_playlist(&FsLister, dir.path());
        assert_eq!(names(&playlist), vec!["1.mp4", "2.mp4"]);
    }

    #[test]
    fn test_fs_lister_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let playlist = build_playlist(&FsLister, &missing);
        assert!(playlist.load_failed());
        assert_eq!(playlist.folder, missing);
    }
}
