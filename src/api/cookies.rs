//! Cookie read/write helpers over raw headers.

use axum::http::{header::InvalidHeaderValue, HeaderMap, HeaderValue};

/// Pull a cookie value out of the request's `Cookie` header.
pub(crate) fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }
    None
}

/// Build a `Set-Cookie` value. The path is always `/` so sibling
/// applications under the same domain see the cookie.
pub(crate) fn set_cookie(
    name: &str,
    domain: Option<&str>,
    value: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(domain) = domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    HeaderValue::from_str(&cookie)
}

/// Build a `Set-Cookie` value that expires the cookie immediately.
pub(crate) fn clear_cookie(
    name: &str,
    domain: Option<&str>,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if let Some(domain) = domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::{clear_cookie, read_cookie, set_cookie};
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn read_cookie_finds_the_named_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("a=1; sso_token=abc-def; b=2"),
        );
        assert_eq!(read_cookie(&headers, "sso_token"), Some("abc-def".to_string()));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn read_cookie_without_header_is_none() {
        assert_eq!(read_cookie(&HeaderMap::new(), "sso_token"), None);
    }

    #[test]
    fn set_cookie_pins_the_root_path() {
        let value = set_cookie("sso", None, "token").expect("header value");
        let text = value.to_str().expect("ascii");
        assert!(text.starts_with("sso=token"));
        assert!(text.contains("Path=/"));
        assert!(!text.contains("Domain"));
    }

    #[test]
    fn set_cookie_includes_the_domain_when_configured() {
        let value = set_cookie("sso", Some("example.com"), "token").expect("header value");
        assert!(value.to_str().expect("ascii").contains("Domain=example.com"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let value = clear_cookie("sso", None).expect("header value");
        let text = value.to_str().expect("ascii");
        assert!(text.starts_with("sso=;"));
        assert!(text.contains("Max-Age=0"));
    }
}
