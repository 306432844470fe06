//! Tag filter pushed by the central service
//!
//! The central service decides which tags a producer is expected to emit and
//! keeps the set current through set/add/remove pushes. The application only
//! reads it, through `is_loggable`.

use crate::remote::ProducerCallback;
use std::collections::HashSet;
use std::sync::RwLock;
use tracing::debug;

/// Tag that enables every tag
pub const WILDCARD_TAG: &str = "*";

/// One push from the central service
#[derive(Debug, Clone)]
enum FilterUpdate {
    Set(Vec<String>),
    Add(Vec<String>),
    Remove(Vec<String>),
}

#[derive(Debug, Default)]
struct FilterState {
    tags: HashSet<String>,
    /// Pushes received while a registration is in flight
    journal: Option<Vec<FilterUpdate>>,
}

impl FilterState {
    fn apply(&mut self, update: &FilterUpdate) {
        match update {
            FilterUpdate::Set(tags) => self.tags = tags.iter().cloned().collect(),
            FilterUpdate::Add(tags) => self.tags.extend(tags.iter().cloned()),
            FilterUpdate::Remove(tags) => {
                for tag in tags {
                    self.tags.remove(tag);
                }
            }
        }
    }
}

/// Set of currently active tags
///
/// The registration answer carries a snapshot of the filter, but the service
/// may push updates before that answer is processed. Between
/// `begin_registration` and `finish_registration` pushes are journaled and
/// replayed on top of the snapshot, so the latest push always wins.
#[derive(Debug, Default)]
pub struct TagFilter {
    state: RwLock<FilterState>,
}

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter holding the given tags
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: RwLock::new(FilterState {
                tags: tags.into_iter().map(Into::into).collect(),
                journal: None,
            }),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, FilterState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, FilterState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, update: FilterUpdate) -> usize {
        let mut state = self.write();
        state.apply(&update);
        if let Some(journal) = state.journal.as_mut() {
            journal.push(update);
        }
        state.tags.len()
    }

    /// Check whether `tag` is currently enabled
    pub fn is_loggable(&self, tag: &str) -> bool {
        let state = self.read();
        state.tags.contains(tag) || state.tags.contains(WILDCARD_TAG)
    }

    /// Replace the whole set
    pub fn set_all(&self, tags: Vec<String>) {
        let len = self.push(FilterUpdate::Set(tags));
        debug!(tags = len, "Tag filter replaced");
    }

    /// Add tags to the set
    pub fn add_some(&self, tags: Vec<String>) {
        let len = self.push(FilterUpdate::Add(tags));
        debug!(tags = len, "Tags added to filter");
    }

    /// Remove tags from the set
    pub fn remove_some(&self, tags: Vec<String>) {
        let len = self.push(FilterUpdate::Remove(tags));
        debug!(tags = len, "Tags removed from filter");
    }

    /// Start journaling pushes until the registration answer is installed
    pub fn begin_registration(&self) {
        self.write().journal = Some(Vec::new());
    }

    /// Install the registration snapshot, then replay the pushes that
    /// arrived meanwhile
    pub fn finish_registration(&self, snapshot: Vec<String>) {
        let mut state = self.write();
        let journal = state.journal.take().unwrap_or_default();
        state.tags = snapshot.into_iter().collect();
        for update in &journal {
            state.apply(update);
        }
        debug!(
            tags = state.tags.len(),
            replayed = journal.len(),
            "Tag filter installed from registration"
        );
    }

    /// Stop journaling after a failed registration
    pub fn cancel_registration(&self) {
        self.write().journal = None;
    }

    /// Sorted copy of the active tags
    pub fn snapshot(&self) -> Vec<String> {
        let mut out: Vec<String> = self.read().tags.iter().cloned().collect();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.read().tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProducerCallback for TagFilter {
    fn set_tag_filter(&self, tags: Vec<String>) {
        self.set_all(tags);
    }

    fn add_tag_filter(&self, tags: Vec<String>) {
        self.add_some(tags);
    }

    fn remove_tag_filter(&self, tags: Vec<String>) {
        self.remove_some(tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_logs_nothing() {
        let filter = TagFilter::new();
        assert!(filter.is_empty());
        assert!(!filter.is_loggable("ERROR"));
    }

    #[test]
    fn test_set_add_remove() {
        let filter = TagFilter::new();

        filter.set_all(tags(&["ERROR", "WARN"]));
        assert!(filter.is_loggable("ERROR"));
        assert!(filter.is_loggable("WARN"));
        assert!(!filter.is_loggable("DEBUG"));

        filter.add_some(tags(&["DEBUG", "ERROR"]));
        assert_eq!(filter.len(), 3);
        assert!(filter.is_loggable("DEBUG"));

        filter.remove_some(tags(&["ERROR", "TRACE"]));
        assert!(!filter.is_loggable("ERROR"));
        assert_eq!(filter.snapshot(), tags(&["DEBUG", "WARN"]));

        filter.set_all(tags(&["TRACE"]));
        assert_eq!(filter.snapshot(), tags(&["TRACE"]));
        assert!(!filter.is_loggable("WARN"));
    }

    #[test]
    fn test_wildcard_enables_every_tag() {
        let filter = TagFilter::with_tags(["*"]);
        assert!(filter.is_loggable("ANYTHING"));

        filter.remove_some(tags(&["*"]));
        assert!(!filter.is_loggable("ANYTHING"));
    }

    #[test]
    fn test_callback_pushes_apply() {
        let filter = Arc::new(TagFilter::new());
        let callback: Arc<dyn ProducerCallback> = filter.clone();

        callback.set_tag_filter(tags(&["A", "B"]));
        callback.add_tag_filter(tags(&["C"]));
        callback.remove_tag_filter(tags(&["A"]));

        assert_eq!(filter.snapshot(), tags(&["B", "C"]));
    }

    #[test]
    fn test_pushes_during_registration_win_over_snapshot() {
        let filter = TagFilter::with_tags(["OLD"]);
        filter.begin_registration();
        filter.add_some(tags(&["DEBUG"]));
        filter.remove_some(tags(&["WARN"]));
        assert!(filter.is_loggable("DEBUG"));

        filter.finish_registration(tags(&["ERROR", "WARN"]));
        assert_eq!(filter.snapshot(), tags(&["DEBUG", "ERROR"]));

        // Journaling is over, later pushes apply directly
        filter.add_some(tags(&["TRACE"]));
        filter.finish_registration(tags(&["INFO"]));
        assert_eq!(filter.snapshot(), tags(&["INFO"]));
    }

    #[test]
    fn test_set_during_registration_replaces_snapshot() {
        let filter = TagFilter::new();
        filter.begin_registration();
        filter.set_all(tags(&["FATAL"]));
        filter.finish_registration(tags(&["ERROR", "WARN"]));
        assert_eq!(filter.snapshot(), tags(&["FATAL"]));
    }

    #[test]
    fn test_cancelled_registration_stops_journaling() {
        let filter = TagFilter::new();
        filter.begin_registration();
        filter.add_some(tags(&["DEBUG"]));
        filter.cancel_registration();

        filter.begin_registration();
        filter.finish_registration(tags(&["ERROR"]));
        assert_eq!(filter.snapshot(), tags(&["ERROR"]));
    }

    #[test]
    fn test_concurrent_updates_and_reads() {
        let filter = Arc::new(TagFilter::with_tags(["BASE"]));
        let mut handles = Vec::new();

        for i in 0..4 {
            let filter = filter.clone();
            handles.push(std::thread::spawn(move || {
                for j in 0..100 {
                    let tag = format!("T{}-{}", i, j);
                    filter.add_some(vec![tag.clone()]);
                    assert!(filter.is_loggable("BASE"));
                    filter.remove_some(vec![tag]);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(filter.snapshot(), tags(&["BASE"]));
    }
}
