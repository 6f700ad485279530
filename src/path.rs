//! URL-to-path-key helpers.
//!
//! Every registry operation keys on the **path component** of a URL, query
//! string and fragment stripped. These helpers exist so registration, lookup
//! and dispatch all derive the same key whether the caller passes a bare
//! path, a full URL string, or a pre-parsed [`Uri`].

use http::Uri;

use crate::error::Error;

/// Derives the registry key for a URL string. Total: never fails.
///
/// `/alpha/beta`, `/alpha/beta?x=1#frag` and
/// `http://example.com/alpha/beta?x=1` all key to `/alpha/beta`.
pub fn key(url: &str) -> String {
    let trimmed = url.trim();
    // `http::Uri` has no fragment concept, so strip it before parsing.
    let without_fragment = trimmed.split('#').next().unwrap_or_default();
    match without_fragment.parse::<Uri>() {
        Ok(uri) => uri.path().to_owned(),
        // Not parseable as a URI at all: best effort, cut at the query.
        Err(_) => without_fragment
            .split('?')
            .next()
            .unwrap_or_default()
            .to_owned(),
    }
}

/// Derives the registry key from an already-parsed [`Uri`].
pub fn key_of(uri: &Uri) -> String {
    uri.path().to_owned()
}

/// Parses a raw string into a [`Uri`], for callers that want to hold the
/// parsed form. Fragments are stripped first — `Uri` does not carry them.
pub fn parse(url: &str) -> Result<Uri, Error> {
    let trimmed = url.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or_default();
    without_fragment
        .parse::<Uri>()
        .map_err(|_| Error::InvalidUrl(url.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_and_fragment_are_stripped() {
        assert_eq!(key("/alpha/beta?x=1#frag"), "/alpha/beta");
        assert_eq!(key("/alpha/beta?x=1"), "/alpha/beta");
        assert_eq!(key("/alpha/beta#frag"), "/alpha/beta");
        assert_eq!(key("/alpha/beta"), "/alpha/beta");
    }

    #[test]
    fn equivalent_urls_share_one_key() {
        assert_eq!(key("/alpha/beta?x=1#frag"), key("/alpha/beta"));
    }

    #[test]
    fn absolute_urls_keep_only_the_path() {
        assert_eq!(key("http://example.com/users?id=1"), "/users");
        assert_eq!(key("http://example.com"), "/");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(key("  /ping  "), "/ping");
    }

    #[test]
    fn empty_input_keys_to_empty() {
        assert_eq!(key(""), "");
    }

    #[test]
    fn key_of_matches_key() {
        let uri = parse("/a/b?c=d").expect("valid url");
        assert_eq!(key_of(&uri), "/a/b");
        assert_eq!(key_of(&uri), key("/a/b?c=d"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse("not a url").is_err());
    }
}
