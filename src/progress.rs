//! Completion summary for the active playlist.

use crate::types::{ProgressSummary, VideoEntry};
use crate::watch_state::WatchStateStore;

/// Summarize how far through `entries` the user is.
pub fn summarize(entries: &[VideoEntry], store: &WatchStateStore) -> ProgressSummary {
    let total = entries.len();
    if total == 0 {
        return ProgressSummary::default();
    }

    let watched = entries.iter().filter(|e| store.is_watched(&e.path)).count();

    ProgressSummary {
        percent_complete: (watched * 100 / total) as u8,
        remaining: total - watched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch_state::StateStorage;
    use std::io;
    use std::path::Path;

    struct NoStorage;

    impl StateStorage for NoStorage {
        fn read_record(&self) -> io::Result<Option<Vec<u8>>> {
            Ok(None)
        }

        fn write_record(&self, _bytes: &[u8]) -> io::Result<()> {
            Ok(())
        }
    }

    fn entries(names: &[&str]) -> Vec<VideoEntry> {
        names
            .iter()
            .map(|n| VideoEntry::new(Path::new("/course"), n))
            .collect()
    }

    #[test]
    fn test_empty_playlist() {
        let store = WatchStateStore::load(Box::new(NoStorage));
        let summary = summarize(&[], &store);
        assert_eq!(summary.percent_complete, 0);
        assert_eq!(summary.remaining, 0);
    }

    #[test]
    fn test_one_of_three_rounds_down() {
        let list = entries(&["1.mp4", "2.mp4", "3.mp4"]);
        let mut store = WatchStateStore::load(Box::new(NoStorage));
        store.set_watched(&list[1].path, true);

        let summary = summarize(&list, &store);
        assert_eq!(summary.percent_complete, 33);
        assert_eq!(summary.remaining, 2);
    }

    #[test]
    fn test_two_of_three() {
        let list = entries(&["1.mp4", "2.mp4", "3.mp4"]);
        let mut store = WatchStateStore::load(Box::new(NoStorage));
        store.set_watched(&list[0].path, true);
        store.set_watched(&list[2].path, true);

        assert_eq!(summarize(&list, &store).percent_complete, 66);
    }

    #[test]
    fn test_all_watched() {
        let list = entries(&["1.mp4", "2.mp4"]);
        let mut store = WatchStateStore::load(Box::new(NoStorage));
        for entry in &list {
            store.set_watched(&entry.path, true);
        }

        let summary = summarize(&list, &store);
        assert_eq!(summary.percent_complete, 100);
        assert_eq!(summary.remaining, 0);
    }

    #[test]
    fn test_ignores_flags_outside_playlist_and_false_flags() {
        let list = entries(&["1.mp4", "2.mp4"]);
        let mut store = WatchStateStore::load(Box::new(NoStorage));
        store.set_watched("/elsewhere/1.mp4", true);
        store.set_watched(&list[0].path, false);

        let summary = summarize(&list, &store);
        assert_eq!(summary.percent_complete, 0);
        assert_eq!(summary.remaining, 2);
    }
}
