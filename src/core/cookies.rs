//! Cookie helpers - Lettura dell'header `Cookie` e costruzione dei `Set-Cookie`

use axum::http::{HeaderMap, HeaderValue, header};

/// Returns the raw value of the first cookie named `name`
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// `HttpOnly; SameSite=Lax` cookie scoped to the whole site
pub fn build_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Cookie with `Max-Age=0`, forcing the browser to drop it
pub fn expired_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", 0, secure)
}

/// Converts a cookie string into a header value. Cookie values are built from
/// JWTs and percent-encoded JSON, so they are always valid header text.
pub fn to_header_value(cookie: &str) -> HeaderValue {
    HeaderValue::from_str(cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}
