//! Query-string parameter extraction.
//!
//! The ESP-IDF HTTP server hands handlers the raw request URI, so parameter
//! lookup is done here rather than by the transport.

/// Look up `name` in an `a=b&c=d` query string.
///
/// Accepts either the bare query or a full URI (anything up to the first `?`
/// is skipped). The first occurrence wins. A key given without `=` yields an
/// empty value. Values are form-decoded (`+` and `%XX`).
pub fn query_param(query: &str, name: &str) -> Option<String> {
    let query = match query.split_once('?') {
        Some((_, query)) => query,
        None => query,
    };
    let query = query.split_once('#').map_or(query, |(query, _)| query);

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| decode(key) == name)
        .map(|(_, value)| decode(value))
}

/// Decode `application/x-www-form-urlencoded` text.
///
/// Malformed escapes are kept literally.
fn decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            byte => out.push(byte),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_params_in_query() {
        let query = "channel=1&target=90";
        assert_eq!(query_param(query, "channel").as_deref(), Some("1"));
        assert_eq!(query_param(query, "target").as_deref(), Some("90"));
        assert_eq!(query_param(query, "speed"), None);
    }

    #[test]
    fn test_accepts_full_uri() {
        let uri = "/move?channel=2&target=0";
        assert_eq!(query_param(uri, "channel").as_deref(), Some("2"));
        assert_eq!(query_param("/move", "channel"), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(
            query_param("target=10&target=20", "target").as_deref(),
            Some("10")
        );
    }

    #[test]
    fn test_bare_key_is_present_but_empty() {
        assert_eq!(query_param("channel&target=5", "channel").as_deref(), Some(""));
    }

    #[test]
    fn test_does_not_match_key_prefix() {
        assert_eq!(query_param("channels=1", "channel"), None);
    }

    #[test]
    fn test_decodes_escapes() {
        assert_eq!(query_param("target=%2B90", "target").as_deref(), Some("+90"));
        assert_eq!(query_param("note=a+b%20c", "note").as_deref(), Some("a b c"));
        assert_eq!(query_param("note=100%", "note").as_deref(), Some("100%"));
        assert_eq!(query_param("note=%zz", "note").as_deref(), Some("%zz"));
    }

    #[test]
    fn test_ignores_fragment() {
        assert_eq!(
            query_param("/move?channel=0#top", "channel").as_deref(),
            Some("0")
        );
    }
}
