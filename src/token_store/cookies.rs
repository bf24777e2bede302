use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use url::Url;

const COOKIE_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

/// Cookies visible to the API origin.
pub trait CookieSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    fn set(&self, name: &str, value: &str);

    fn remove(&self, name: &str);
}

/// The transport's cookie jar, viewed from the API base URL. The same jar is
/// handed to the HTTP client, so anything set here is sent with every request.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    jar: Arc<Jar>,
    url: Url,
}

impl SessionCookies {
    pub fn new(jar: Arc<Jar>, url: Url) -> Self {
        Self { jar, url }
    }
}

impl CookieSource for SessionCookies {
    fn get(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.url)?;
        let header = header.to_str().ok()?;
        find_cookie(header, name)
    }

    fn set(&self, name: &str, value: &str) {
        let cookie = format!(
            "{}={}; Path=/; Max-Age={}",
            name,
            urlencoding::encode(value),
            COOKIE_MAX_AGE_SECS
        );
        self.jar.add_cookie_str(&cookie, &self.url);
    }

    fn remove(&self, name: &str) {
        // an already-expired cookie evicts the stored one
        let cookie = format!("{}=; Path=/; Max-Age=0", name);
        self.jar.add_cookie_str(&cookie, &self.url);
    }
}

/// Looks `name` up in a `Cookie` header value (`a=1; b=2`).
/// Empty or undecodable values count as missing.
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty())
}
