use memrise_model::{Error, Result};
use reqwest::cookie::{CookieStore, Jar};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub mod attachments;
pub mod courses;
pub mod session;
mod schema;
#[cfg(test)]
mod stub;

pub const BASE_URL: &str = "https://app.memrise.com";

/// Timeout applied to every request unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "memrise-audio/0.1 (course audio uploader)";

/// HTTP client for the Memrise web app.
///
/// Holds the cookie jar that carries the session after [`login`](Self::login);
/// every later request reuses it. Requests are issued one at a time by the
/// caller, the client itself keeps no per-word state.
pub struct MemriseClient {
    http: reqwest::Client,
    cookies: Arc<Jar>,
    base_url: Url,
    logged_in: bool,
}

impl MemriseClient {
    /// Client against the public Memrise site.
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid Memrise base URL '{base_url}': {e}")))?;
        let cookies = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(Arc::clone(&cookies))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            cookies,
            base_url,
            logged_in: false,
        })
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("invalid path '{path}': {e}")))
    }

    /// `Referer` header value; the platform rejects POSTs without one.
    pub(crate) fn referer(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Current value of the `csrftoken` cookie.
    pub(crate) fn csrf_token(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        cookie_value(header, "csrftoken").map(str::to_string)
    }

    /// Send an authenticated GET and decode a JSON body.
    ///
    /// Transport failures and non-2xx statuses are connection errors; a body
    /// that does not match `T` is a parse error.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(url = %url, "GET");

        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Connection(describe(&e, &url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Connection(format!("HTTP {status} for {url}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Connection(describe(&e, &url)))?;

        serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("unexpected JSON from {path}: {e}")))
    }
}

/// Human-readable description of a request failure, calling out timeouts.
pub(crate) fn describe(err: &reqwest::Error, url: &Url) -> String {
    if err.is_timeout() {
        format!("request to {url} timed out")
    } else {
        format!("request to {url} failed: {err}")
    }
}

/// Find `name` in a `Cookie` header value (`a=1; b=2`).
/// The value is returned as sent, still percent-encoded if it was.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value() {
        let header = "sessionid_2=abc123; csrftoken=tok%3D; other=1";
        assert_eq!(cookie_value(header, "csrftoken"), Some("tok%3D"));
        assert_eq!(cookie_value(header, "sessionid_2"), Some("abc123"));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("", "csrftoken"), None);
    }

    #[test]
    fn test_url_join() {
        let client = MemriseClient::with_base_url("http://localhost:8080", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client.url("/v1.21/courses/42/levels/").unwrap().as_str(),
            "http://localhost:8080/v1.21/courses/42/levels/"
        );
        assert_eq!(client.referer("/signin"), "http://localhost:8080/signin");
    }

    #[test]
    fn test_csrf_token_from_jar() {
        let client = MemriseClient::with_base_url("http://localhost:8080", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.csrf_token(), None);

        client
            .cookies
            .add_cookie_str("csrftoken=xyz; Path=/", &client.base_url);
        assert_eq!(client.csrf_token().as_deref(), Some("xyz"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = MemriseClient::with_base_url("not a url", DEFAULT_TIMEOUT).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
