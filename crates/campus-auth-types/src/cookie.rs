//! Cookie builders for the refresh token.
//!
//! The access token travels in the `Authorization` header; only the refresh
//! token is held in a cookie, scoped to the token endpoint.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the refresh token.
pub const CAMPUS_REFRESH_TOKEN: &str = "campus_refresh_token";

/// Path the refresh cookie is scoped to.
pub const REFRESH_TOKEN_COOKIE_PATH: &str = "/auth/token";

/// Set the refresh-token cookie on the jar.
///
/// `max_age_secs` should be the remaining lifetime of the stored token so the
/// browser drops the cookie when the server-side row expires.
///
/// ```
/// use axum_extra::extract::cookie::{CookieJar, SameSite};
/// use campus_auth_types::cookie::{set_refresh_token_cookie, CAMPUS_REFRESH_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_refresh_token_cookie(jar, "refresh_value".to_string(), "campus.test".to_string(), 604800);
/// let cookie = jar.get(CAMPUS_REFRESH_TOKEN).unwrap();
/// assert_eq!(cookie.value(), "refresh_value");
/// assert_eq!(cookie.path(), Some("/auth/token"));
/// assert_eq!(cookie.domain(), Some("campus.test"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert_eq!(cookie.same_site(), Some(SameSite::Strict));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_refresh_token_cookie(
    jar: CookieJar,
    value: String,
    domain: String,
    max_age_secs: i64,
) -> CookieJar {
    jar.add(refresh_cookie(value, domain, Duration::seconds(max_age_secs.max(0))))
}

/// Clear the refresh-token cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use campus_auth_types::cookie::{
///     clear_refresh_token_cookie, set_refresh_token_cookie, CAMPUS_REFRESH_TOKEN,
/// };
///
/// let jar = CookieJar::new();
/// let jar = set_refresh_token_cookie(jar, "r".to_string(), "campus.test".to_string(), 60);
/// let jar = clear_refresh_token_cookie(jar, "campus.test".to_string());
/// let refresh = jar.get(CAMPUS_REFRESH_TOKEN).unwrap();
/// assert_eq!(refresh.value(), "");
/// assert_eq!(refresh.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_refresh_token_cookie(jar: CookieJar, domain: String) -> CookieJar {
    jar.add(refresh_cookie(String::new(), domain, Duration::ZERO))
}

fn refresh_cookie(value: String, domain: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((CAMPUS_REFRESH_TOKEN, value))
        .path(REFRESH_TOKEN_COOKIE_PATH)
        .domain(domain)
        .max_age(max_age)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build()
}
