//! Feed-specific utility functions shared by the pollers, registry and commands

/// URL and source-key utilities
pub mod url {
    use ::url::Url;

    pub const CHANNEL_ID_PREFIX: &str = "UC";
    pub const CHANNEL_ID_LEN: usize = 24;

    /// Extract domain from URL
    pub fn extract_domain(url_str: &str) -> Option<String> {
        Url::parse(url_str)
            .ok()
            .and_then(|url| url.domain().map(|d| d.to_string()))
    }

    /// Validate RSS feed URL format
    pub fn is_valid_rss_url(url_str: &str) -> bool {
        match Url::parse(url_str) {
            Ok(url) => (url.scheme() == "http" || url.scheme() == "https") && url.has_host(),
            Err(_) => false,
        }
    }

    /// YouTube channel ids are "UC" followed by 22 more characters.
    pub fn is_valid_channel_id(channel_id: &str) -> bool {
        channel_id.starts_with(CHANNEL_ID_PREFIX) && channel_id.chars().count() == CHANNEL_ID_LEN
    }
}

/// Text utilities for rendering feed content
pub mod feed {
    const ENTITIES: [(&str, &str); 5] = [
        ("&nbsp;", " "),
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
    ];

    /// Strip HTML tags and decode the handful of entities feeds commonly use.
    pub fn clean_html(html: &str) -> String {
        let mut text = String::with_capacity(html.len());
        let mut rest = html;

        while let Some(start) = rest.find('<') {
            text.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find('>') {
                // "<>" is not a tag
                Some(end) if end > 0 => rest = &after[end + 1..],
                _ => {
                    text.push('<');
                    rest = after;
                }
            }
        }
        text.push_str(rest);

        let decoded = ENTITIES
            .iter()
            .fold(text, |acc, &(entity, plain)| acc.replace(entity, plain));

        decoded.trim().to_string()
    }

    /// Cut `text` to at most `max_chars` characters, ending in "..." when cut.
    pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        let keep = max_chars.saturating_sub(3);
        let mut truncated: String = text.chars().take(keep).collect();
        truncated.push_str("...");
        truncated
    }

    /// Take the first `max_chars` characters without any marker.
    pub fn take_chars(text: &str, max_chars: usize) -> String {
        text.chars().take(max_chars).collect()
    }
}

/// Time utilities for status reports
pub mod time {
    use std::time::Duration;

    /// Whole minutes, rounded down, as shown in status replies.
    pub fn format_interval(interval: Duration) -> String {
        format!("{} minutes", interval.as_secs() / 60)
    }
}
