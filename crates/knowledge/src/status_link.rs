//! Status-link detection.
//!
//! Archive entries carry a markdown link whose text is the post timestamp and
//! whose target is the post's status URL:
//!
//! ```text
//! [Mon Jan 01 12:00:00 +0000 2024](https://twitter.com/someone/status/1742)
//! ```
//!
//! The first such link in a section wins. Anything that does not match the
//! shape below is simply not a status link; detection never fails.

/// Hosts accepted in a status URL.
const STATUS_HOSTS: &[&str] = &[
    "twitter.com",
    "www.twitter.com",
    "mobile.twitter.com",
    "x.com",
    "www.x.com",
];

const STATUS_SEGMENT: &str = "/status/";

/// A status link found in an archive section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLink<'a> {
    /// Link text, verbatim
    pub timestamp: &'a str,

    /// Link target
    pub url: &'a str,

    /// Trailing decimal status id of the URL
    pub status_id: &'a str,
}

/// Find the first status link in `text`.
pub fn find_status_link(text: &str) -> Option<StatusLink<'_>> {
    text.match_indices('[')
        .find_map(|(start, _)| parse_link_at(text, start))
}

/// Try to read `[text](url)` starting at the `[` at byte offset `start`.
fn parse_link_at(text: &str, start: usize) -> Option<StatusLink<'_>> {
    let after_open = &text[start + 1..];

    let close = after_open.find(']')?;
    let label = &after_open[..close];
    if label.is_empty() {
        return None;
    }

    let target = after_open[close + 1..].strip_prefix('(')?;
    let end = target.find(')')?;
    let url = &target[..end];

    let status_id = status_id_of(url)?;

    Some(StatusLink {
        timestamp: label,
        url,
        status_id,
    })
}

/// Extract the status id when `url` has the shape
/// `https://<host>/<user>/status/<digits>`.
fn status_id_of(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;

    let (host, path) = rest.split_once('/')?;
    if !STATUS_HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)) {
        return None;
    }

    let segment = path.rfind(STATUS_SEGMENT)?;
    // A user segment must precede /status/
    if segment == 0 {
        return None;
    }

    let id = &path[segment + STATUS_SEGMENT.len()..];
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_twitter_link() {
        let text = "> hi\n[Mon Jan 01 2024](https://twitter.com/u/status/123)\n";
        let link = find_status_link(text).unwrap();

        assert_eq!(link.timestamp, "Mon Jan 01 2024");
        assert_eq!(link.url, "https://twitter.com/u/status/123");
        assert_eq!(link.status_id, "123");
    }

    #[test]
    fn test_accepts_x_and_mobile_hosts() {
        let x = find_status_link("[t](https://x.com/u/status/9)").unwrap();
        assert_eq!(x.status_id, "9");

        let mobile = find_status_link("[t](https://mobile.twitter.com/u/status/77)").unwrap();
        assert_eq!(mobile.status_id, "77");
    }

    #[test]
    fn test_first_match_wins() {
        let text = "[a](https://twitter.com/u/status/1) and [b](https://twitter.com/u/status/2)";
        assert_eq!(find_status_link(text).unwrap().status_id, "1");
    }

    #[test]
    fn test_skips_non_status_links() {
        let text = "[docs](https://example.com/page) then [t](https://twitter.com/u/status/5)";
        let link = find_status_link(text).unwrap();
        assert_eq!(link.timestamp, "t");
        assert_eq!(link.status_id, "5");
    }

    #[test]
    fn test_rejects_malformed_links() {
        assert!(find_status_link("no links here").is_none());
        assert!(find_status_link("[](https://twitter.com/u/status/1)").is_none());
        assert!(find_status_link("[t] (https://twitter.com/u/status/1)").is_none());
        assert!(find_status_link("[t](https://twitter.com/u/status/12a)").is_none());
        assert!(find_status_link("[t](https://twitter.com/status/12)").is_none());
        assert!(find_status_link("[t](https://nottwitter.com/u/status/12)").is_none());
        assert!(find_status_link("[t](https://twitter.com/u/status/12").is_none());
    }

    #[test]
    fn test_uses_last_status_segment() {
        let link = find_status_link("[t](https://twitter.com/status/u/status/42)").unwrap();
        assert_eq!(link.status_id, "42");
    }
}
