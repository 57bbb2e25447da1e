use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use super::WebError;

/// A numeric id taken from the path. Anything that is not a plain
/// non-negative integer is answered with the not-found page, the same as an
/// id that matches no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub i32);

impl<S: Send + Sync> FromRequestParts<S> for ResourceId {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| WebError::NotFound)?;

        parse_resource_id(&raw).map(Self).ok_or(WebError::NotFound)
    }
}

#[must_use]
pub fn parse_resource_id(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Accepts a post-login redirect target only if it stays on this site.
#[must_use]
pub fn safe_next(next: &str) -> Option<&str> {
    let next = next.trim();
    if !next.starts_with('/') || next.starts_with("//") {
        return None;
    }
    if next.contains('\\') || next.chars().any(char::is_control) {
        return None;
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_id() {
        assert_eq!(parse_resource_id("0"), Some(0));
        assert_eq!(parse_resource_id("42"), Some(42));
        assert_eq!(parse_resource_id(""), None);
        assert_eq!(parse_resource_id("-1"), None);
        assert_eq!(parse_resource_id("+1"), None);
        assert_eq!(parse_resource_id("abc"), None);
        assert_eq!(parse_resource_id("99999999999"), None);
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next("/topics/"), Some("/topics/"));
        assert_eq!(safe_next("/topics/3/?x=1"), Some("/topics/3/?x=1"));
        assert_eq!(safe_next("https://evil.example/"), None);
        assert_eq!(safe_next("//evil.example/"), None);
        assert_eq!(safe_next("/\\evil.example"), None);
        assert_eq!(safe_next("topics/"), None);
    }
}
