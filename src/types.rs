//! Type definitions for the lesson-tracker application.
//!
//! This module contains the plain data structures handed from the core to the
//! front end: playlist entries and the derived progress summary.

use std::cmp::Ordering;
use std::path::Path;

/// Ordering key derived from a lesson's file name.
///
/// Numeric names sort by value; everything else sorts after every numeric
/// name. Variant order matters for the derived `Ord`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    /// Integer value of the digits before the first `.`.
    Numeric(u128),
    /// No purely numeric prefix.
    Unnumbered,
}

impl SortKey {
    /// Derive the key from a file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use lesson_tracker::types::SortKey;
    ///
    /// assert_eq!(SortKey::from_file_name("07.mp4"), SortKey::Numeric(7));
    /// assert_eq!(SortKey::from_file_name("1.intro.mp4"), SortKey::Numeric(1));
    /// assert_eq!(SortKey::from_file_name("intro.mp4"), SortKey::Unnumbered);
    /// assert_eq!(SortKey::from_file_name("3a.mp4"), SortKey::Unnumbered);
    /// ```
    pub fn from_file_name(name: &str) -> Self {
        let stem = name.split('.').next().unwrap_or("");
        if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return SortKey::Unnumbered;
        }
        // Digit runs too long for u128 still belong before the unnumbered names.
        stem.parse::<u128>()
            .map(SortKey::Numeric)
            .unwrap_or(SortKey::Numeric(u128::MAX))
    }
}

/// A playable lesson discovered in the active folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoEntry {
    /// Absolute location of the file; the identity used by the watch state.
    pub path: String,

    /// Final path component, shown in the lesson list.
    pub display_name: String,

    /// Position key within the playlist.
    pub sort_key: SortKey,
}

impl VideoEntry {
    /// Build an entry for `file_name` inside `folder`.
    pub fn new(folder: &Path, file_name: &str) -> Self {
        Self {
            path: folder.join(file_name).to_string_lossy().into_owned(),
            display_name: file_name.to_string(),
            sort_key: SortKey::from_file_name(file_name),
        }
    }

    /// Format the entry for the lesson list.
    ///
    /// # Examples
    ///
    /// ```
    /// use lesson_tracker::types::VideoEntry;
    /// use std::path::Path;
    ///
    /// let entry = VideoEntry::new(Path::new("/course"), "3.mp4");
    /// assert_eq!(entry.to_display(true), "[x] 3.mp4");
    /// assert_eq!(entry.to_display(false), "[ ] 3.mp4");
    /// ```
    pub fn to_display(&self, watched: bool) -> String {
        let mark = if watched { "x" } else { " " };
        format!("[{}] {}", mark, self.display_name)
    }
}

/// Compare two entries by sort key only, so ties keep their scan order.
pub fn by_sort_key(a: &VideoEntry, b: &VideoEntry) -> Ordering {
    a.sort_key.cmp(&b.sort_key)
}

/// Completion figures for the active playlist. Derived, never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    /// floor(100 * watched / total), 0 for an empty playlist.
    pub percent_complete: u8,

    /// Lessons not yet watched.
    pub remaining: usize,
}

impl ProgressSummary {
    /// Format the summary for the header.
    ///
    /// # Examples
    ///
    /// ```
    /// use lesson_tracker::types::ProgressSummary;
    ///
    /// let summary = ProgressSummary { percent_complete: 33, remaining: 2 };
    /// assert_eq!(summary.to_display(), "33% complete, 2 left");
    /// ```
    pub fn to_display(&self) -> String {
        format!("{}% complete, {} left", self.percent_complete, self.remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_numeric() {
        assert_eq!(SortKey::from_file_name("10.mp4"), SortKey::Numeric(10));
        assert_eq!(SortKey::from_file_name("007.MP4"), SortKey::Numeric(7));
    }

    #[test]
    fn test_sort_key_unnumbered() {
        assert_eq!(SortKey::from_file_name("intro.mp4"), SortKey::Unnumbered);
        assert_eq!(SortKey::from_file_name(".mp4"), SortKey::Unnumbered);
        assert_eq!(SortKey::from_file_name("-1.mp4"), SortKey::Unnumbered);
        assert_eq!(SortKey::from_file_name("1 intro.mp4"), SortKey::Unnumbered);
    }

    #[test]
    fn test_sort_key_huge_number_still_numeric() {
        let name = format!("{}.mp4", "9".repeat(60));
        assert_eq!(SortKey::from_file_name(&name), SortKey::Numeric(u128::MAX));
        assert!(SortKey::from_file_name(&name) < SortKey::Unnumbered);
    }

    #[test]
    fn test_sort_key_ordering() {
        assert!(SortKey::Numeric(2) < SortKey::Numeric(10));
        assert!(SortKey::Numeric(u128::MAX) < SortKey::Unnumbered);
    }

    #[test]
    fn test_video_entry_new() {
        let entry = VideoEntry::new(Path::new("/course"), "2.mp4");
        assert_eq!(entry.path, Path::new("/course").join("2.mp4").to_string_lossy());
        assert_eq!(entry.display_name, "2.mp4");
        assert_eq!(entry.sort_key, SortKey::Numeric(2));
    }

    #[test]
    fn test_progress_summary_display() {
        let summary = ProgressSummary {
            percent_complete: 100,
            remaining: 0,
        };
        assert_eq!(summary.to_display(), "100% complete, 0 left");
        assert_eq!(ProgressSummary::default().to_display(), "0% complete, 0 left");
    }
}
