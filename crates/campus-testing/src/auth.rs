//! Bearer-credential helpers for extractor and handler tests.

use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

/// An access token presented the way clients send it.
pub struct MockBearer {
    pub token: String,
}

impl MockBearer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Return headers carrying `Authorization: Bearer <token>`.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token)).unwrap(),
        );
        map
    }
}
