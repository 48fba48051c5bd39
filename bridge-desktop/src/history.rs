//! In-process navigation history for hosts without a browser address bar.

use bridge_traits::{
    error::Result,
    location::{NavigationHistory, PageLocation, RouteState},
};
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    state: Option<RouteState>,
    hash: String,
}

/// Stack of pushed entries on top of a fixed origin and pathname.
#[derive(Debug)]
pub struct MemoryNavigationHistory {
    location: Mutex<PageLocation>,
    entries: Mutex<Vec<Entry>>,
}

impl MemoryNavigationHistory {
    pub fn new(location: PageLocation) -> Self {
        let initial = Entry {
            state: None,
            hash: location.hash.clone(),
        };
        Self {
            location: Mutex::new(location),
            entries: Mutex::new(vec![initial]),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Replace the fragment without pushing, like typing into the address bar.
    pub fn set_hash(&self, hash: impl Into<String>) {
        let hash = hash.into();
        self.location.lock().hash = hash.clone();
        if let Some(top) = self.entries.lock().last_mut() {
            *top = Entry { state: None, hash };
        }
    }

    /// Step back one entry. Returns the state of the entry now shown, the
    /// payload a `popstate` would carry, or `None` at the first entry.
    pub fn back(&self) -> Option<Option<RouteState>> {
        let mut entries = self.entries.lock();
        if entries.len() < 2 {
            return None;
        }
        entries.pop();
        let top = entries.last()?.clone();
        drop(entries);

        debug!(hash = %top.hash, "History back");
        self.location.lock().hash = top.hash;
        Some(top.state)
    }
}

impl NavigationHistory for MemoryNavigationHistory {
    fn location(&self) -> PageLocation {
        self.location.lock().clone()
    }

    fn push(&self, state: Option<&RouteState>, hash: &str) -> Result<()> {
        self.location.lock().hash = hash.to_string();
        self.entries.lock().push(Entry {
            state: state.cloned(),
            hash: hash.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(course_id: &str, part: &str) -> RouteState {
        RouteState {
            course_id: course_id.into(),
            part: part.into(),
        }
    }

    #[test]
    fn test_push_and_back() {
        let history = MemoryNavigationHistory::new(PageLocation::local());
        history.push(Some(&route("Class01", "A")), "#Class01/A").unwrap();
        history.push(Some(&route("Class02", "B")), "#Class02/B").unwrap();
        assert_eq!(history.location().hash, "#Class02/B");
        assert_eq!(history.len(), 3);

        assert_eq!(history.back(), Some(Some(route("Class01", "A"))));
        assert_eq!(history.location().hash, "#Class01/A");

        assert_eq!(history.back(), Some(None));
        assert_eq!(history.location().hash, "");
        assert_eq!(history.back(), None);
    }

    #[test]
    fn test_set_hash_keeps_depth() {
        let history = MemoryNavigationHistory::new(PageLocation::local().with_hash("#Class01/A"));
        history.set_hash("#Class02/A");

        assert_eq!(history.len(), 1);
        assert_eq!(history.location().hash, "#Class02/A");
        assert_eq!(history.location().pathname, "/");
    }
}
