use crate::types::FeedItem;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

const FINGERPRINT_LEN: usize = 16;

/// Stable identity of an article: the link when there is one, otherwise the
/// title and summary together. SHA-256, hex, cut to 16 characters.
pub fn fingerprint(item: &FeedItem) -> String {
    let unique = if !item.link.is_empty() {
        item.link.clone()
    } else {
        format!("{}{}", item.title, item.summary.as_deref().unwrap_or(""))
    };

    let digest = Sha256::digest(unique.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Fingerprints of every article observed so far. Grows without bound and
/// never forgets.
#[derive(Debug, Default)]
pub struct ArticleDedup {
    seen: HashSet<String>,
}

impl ArticleDedup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_seen(&self, fingerprint: &str) -> bool {
        self.seen.contains(fingerprint)
    }

    /// Returns true when the fingerprint was not recorded before.
    pub fn mark_seen(&mut self, fingerprint: impl Into<String>) -> bool {
        self.seen.insert(fingerprint.into())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Last announced video per channel. A channel without an entry has not been
/// observed yet, which is not the same as "nothing new".
#[derive(Debug, Default)]
pub struct ChannelDedup {
    last_video: HashMap<String, String>,
}

impl ChannelDedup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_last(&self, channel_id: &str) -> Option<&str> {
        self.last_video.get(channel_id).map(String::as_str)
    }

    pub fn set_last(&mut self, channel_id: impl Into<String>, video_id: impl Into<String>) {
        self.last_video.insert(channel_id.into(), video_id.into());
    }

    pub fn len(&self) -> usize {
        self.last_video.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_video.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, link: &str, summary: Option<&str>) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            link: link.to_string(),
            summary: summary.map(str::to_string),
            ..FeedItem::default()
        }
    }

    #[test]
    fn fingerprint_is_deterministic_and_short() {
        let a = item("Qubits", "https://example.com/q", None);
        let fp = fingerprint(&a);
        assert_eq!(fp, fingerprint(&a));
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn link_wins_over_title_and_summary() {
        let a = item("First title", "https://example.com/q", Some("one"));
        let b = item("Other title", "https://example.com/q", Some("two"));
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn without_link_title_and_summary_decide() {
        let a = item("Title", "", Some("summary"));
        let b = item("Title", "", Some("different"));
        let c = item("Titlesummary", "", None);
        assert_ne!(fingerprint(&a), fingerprint(&b));
        // Concatenation has no separator.
        assert_eq!(fingerprint(&a), fingerprint(&c));
    }

    #[test]
    fn known_sha256_prefix() {
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(fingerprint(&item("", "abc", None)), "ba7816bf8f01cfea");
    }

    #[test]
    fn mark_seen_is_monotonic_and_idempotent() {
        let mut dedup = ArticleDedup::new();
        assert!(!dedup.has_seen("f1"));
        assert!(dedup.mark_seen("f1"));
        assert!(!dedup.mark_seen("f1"));
        assert!(dedup.has_seen("f1"));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn channel_record_absence_means_uninitialized() {
        let mut dedup = ChannelDedup::new();
        assert_eq!(dedup.get_last("UC1"), None);
        dedup.set_last("UC1", "vid1");
        assert_eq!(dedup.get_last("UC1"), Some("vid1"));
        dedup.set_last("UC1", "vid2");
        assert_eq!(dedup.get_last("UC1"), Some("vid2"));
        assert_eq!(dedup.len(), 1);
    }
}
