//! URL classification for frontier scheduling
//!
//! Every URL is mapped to an integer priority before it enters the frontier.
//! Lower values are fetched first. Priority only affects the order of
//! fetching, never whether a URL is admitted.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! | # | Rule | Priority | Side-list |
//! |---|------|----------|-----------|
//! | 1 | contains a blacklist-table entry | `Priority::MAX` | blacklisted |
//! | 2 | contains `.onion` | `Priority::MAX` | - |
//! | 3 | ends with an image/video extension | 20 | low priority |
//! | 4 | contains a social-media domain | 20 | blacklisted |
//! | 5 | contains an ad/tracker marker | 20 | low priority |
//! | 6 | ends with `.edu` or `.gov` | 1 | - |
//! | 7 | contains `research` or `science` | 5 | - |
//! | 8 | anything else | 10 | - |

mod rules;

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

pub use rules::{
    AD_MARKERS, BLACKLIST, MEDIA_EXTENSIONS, ONION_MARKER, SOCIAL_DOMAINS, TOPIC_MARKERS,
    TRUSTED_SUFFIXES,
};

/// Scheduling priority (lower sorts first)
pub type Priority = i32;

pub const PRIORITY_EXCLUDED: Priority = Priority::MAX;
pub const PRIORITY_LOW: Priority = 20;
pub const PRIORITY_DEFAULT: Priority = 10;
pub const PRIORITY_TOPICAL: Priority = 5;
pub const PRIORITY_TRUSTED: Priority = 1;

/// Which rule produced a priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlClass {
    Blacklisted,
    Onion,
    Media,
    Social,
    Advertising,
    Trusted,
    Topical,
    Default,
}

impl UrlClass {
    /// Determines the class of a URL without touching any side-list
    pub fn of(url: &str) -> Self {
        if rules::contains_any(url, BLACKLIST) {
            Self::Blacklisted
        } else if url.contains(ONION_MARKER) {
            Self::Onion
        } else if rules::has_media_extension(url) {
            Self::Media
        } else if rules::contains_any(url, SOCIAL_DOMAINS) {
            Self::Social
        } else if rules::contains_any(url, AD_MARKERS) {
            Self::Advertising
        } else if TRUSTED_SUFFIXES.iter().any(|suffix| url.ends_with(suffix)) {
            Self::Trusted
        } else if rules::contains_any(url, TOPIC_MARKERS) {
            Self::Topical
        } else {
            Self::Default
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            Self::Blacklisted | Self::Onion => PRIORITY_EXCLUDED,
            Self::Media | Self::Social | Self::Advertising => PRIORITY_LOW,
            Self::Trusted => PRIORITY_TRUSTED,
            Self::Topical => PRIORITY_TOPICAL,
            Self::Default => PRIORITY_DEFAULT,
        }
    }
}

/// A deduplicated, insertion-ordered list of URLs shared between workers
#[derive(Debug, Default)]
pub struct SideList {
    inner: Mutex<SideListInner>,
}

#[derive(Debug, Default)]
struct SideListInner {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl SideList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL; returns false if it was already present
    pub fn insert(&self, url: &str) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.seen.contains(url) {
            return false;
        }
        inner.seen.insert(url.to_string());
        inner.order.push(url.to_string());
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .seen
            .contains(url)
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the entries out in insertion order
    pub fn snapshot(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }
}

/// Classifier holding the side-lists for one crawl
///
/// The side-lists are for reporting only. Create a fresh classifier per crawl.
#[derive(Debug, Default)]
pub struct UrlClassifier {
    blacklisted: SideList,
    low_priority: SideList,
}

impl UrlClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a URL to its scheduling priority, recording it in a side-list when
    /// the matching rule calls for one
    pub fn classify(&self, url: &str) -> Priority {
        let class = UrlClass::of(url);
        match class {
            UrlClass::Blacklisted | UrlClass::Social => {
                self.blacklisted.insert(url);
            }
            UrlClass::Media | UrlClass::Advertising => {
                self.low_priority.insert(url);
            }
            _ => {}
        }
        class.priority()
    }

    pub fn blacklisted(&self) -> &SideList {
        &self.blacklisted
    }

    pub fn low_priority(&self) -> &SideList {
        &self.low_priority
    }
}
