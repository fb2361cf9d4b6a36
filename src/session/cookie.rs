//! Cookie header parsing.
//!
//! Best-effort only: pairs are split on `"; "` and then on the first `=`.

/// Cookie carrying the session token when served over HTTPS.
pub const SECURE_SESSION_COOKIE: &str = "__Secure-next-auth.session-token";
/// Cookie carrying the session token otherwise.
pub const SESSION_COOKIE: &str = "next-auth.session-token";

/// Splits a raw `Cookie` header into `(name, value)` pairs.
///
/// Segments without `=` are skipped.
pub fn parse_cookies(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header
        .split("; ")
        .filter_map(|pair| pair.split_once('='))
}

/// Returns the value of the first cookie named `name`.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    parse_cookies(header)
        .find(|(cookie, _)| *cookie == name)
        .map(|(_, value)| value)
}

/// Picks the session token, preferring the secure cookie over the plain one.
///
/// Empty values count as absent.
pub fn session_token(header: &str) -> Option<&str> {
    find_cookie(header, SECURE_SESSION_COOKIE)
        .or_else(|| find_cookie(header, SESSION_COOKIE))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookies() {
        let pairs: Vec<_> = parse_cookies("a=1; b=2; flag; c=x=y").collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("c", "x=y")]);
    }

    #[test]
    fn test_plain_session_cookie() {
        let header = "theme=dark; next-auth.session-token=abc";
        assert_eq!(session_token(header), Some("abc"));
    }

    #[test]
    fn test_secure_cookie_wins() {
        let header = "next-auth.session-token=plain; __Secure-next-auth.session-token=secure";
        assert_eq!(session_token(header), Some("secure"));
    }

    #[test]
    fn test_no_session_cookie() {
        assert_eq!(session_token("theme=dark; lang=en"), None);
        assert_eq!(session_token(""), None);
    }

    #[test]
    fn test_empty_token_is_absent() {
        assert_eq!(session_token("next-auth.session-token="), None);
    }

    #[test]
    fn test_empty_secure_token_does_not_fall_back() {
        // Mirrors the secure-first lookup: a present secure cookie shadows the plain one
        let header = "__Secure-next-auth.session-token=; next-auth.session-token=abc";
        assert_eq!(session_token(header), None);
    }
}
