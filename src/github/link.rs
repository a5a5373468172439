use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<(?P<url>[^>]+)>\s*;\s*rel="(?P<rel>[^"]+)""#)
            .unwrap_or_else(|e| panic!("invalid link pattern: {e}"))
    })
}

/// Parse an RFC 5988 `Link` header into a map of relation to URL
///
/// Entries that are not `<url>; rel="name"` pairs are skipped.
pub fn parse_links(header: Option<&str>) -> HashMap<String, String> {
    let Some(header) = header else {
        return HashMap::new();
    };

    header
        .split(',')
        .filter_map(|entry| link_pattern().captures(entry.trim()))
        .map(|caps| (caps["rel"].to_string(), caps["url"].to_string()))
        .collect()
}

/// URL of the `next` relation, if the header advertises one
pub fn next_link(header: Option<&str>) -> Option<String> {
    parse_links(header).remove("next")
}
