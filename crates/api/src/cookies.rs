//! Session cookie construction and parsing.
//!
//! Two cookies carry the session: `ACCESS_TOKEN` travels on every request
//! (SameSite=Lax, site-wide path) while `REFRESH_TOKEN` is scoped down to the
//! refresh endpoint with SameSite=Strict, so it never rides along on ordinary
//! navigation. Both are HttpOnly and Secure.

use axum::http::HeaderMap;
use chrono::Duration;

pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";

pub const REFRESH_PATH: &str = "/auth/refresh/token";
const REFRESH_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// `Set-Cookie` value for the access token.
pub fn access_cookie(token: &str, validity: Duration) -> String {
    format!(
        "{ACCESS_TOKEN}={token}; Max-Age={}; Path=/; HttpOnly; Secure; SameSite=Lax",
        validity.num_seconds().max(0)
    )
}

/// `Set-Cookie` value for the refresh token.
pub fn refresh_cookie(token: &str) -> String {
    format!(
        "{REFRESH_TOKEN}={token}; Max-Age={REFRESH_MAX_AGE_SECS}; Path={REFRESH_PATH}; \
         HttpOnly; Secure; SameSite=Strict"
    )
}

/// Expired `Set-Cookie` values that clear both session cookies.
pub fn clearing_cookies() -> [String; 2] {
    [
        format!("{ACCESS_TOKEN}=; Max-Age=0; Path=/; HttpOnly; Secure; SameSite=Lax"),
        format!(
            "{REFRESH_TOKEN}=; Max-Age=0; Path={REFRESH_PATH}; HttpOnly; Secure; SameSite=Strict"
        ),
    ]
}

/// Read one cookie from the request `Cookie` header.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn access_cookie_attributes() {
        let cookie = access_cookie("tok123", Duration::hours(1));
        assert!(cookie.starts_with("ACCESS_TOKEN=tok123;"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("Path=/;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn refresh_cookie_is_scoped_to_refresh_path() {
        let cookie = refresh_cookie("handle");
        assert!(cookie.contains("Path=/auth/refresh/token"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn read_cookie_picks_the_named_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("a=1; ACCESS_TOKEN=tok; REFRESH_TOKEN=handle"),
        );
        assert_eq!(read_cookie(&headers, ACCESS_TOKEN).as_deref(), Some("tok"));
        assert_eq!(read_cookie(&headers, REFRESH_TOKEN).as_deref(), Some("handle"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }
}
