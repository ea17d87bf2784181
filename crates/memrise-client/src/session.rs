use crate::schema::AccessTokenResponse;
use crate::{describe, MemriseClient};
use memrise_model::{Error, Result};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

/// OAuth client id of the Memrise web app.
const CLIENT_ID: &str = "1e739f5e77704b57a703";

impl MemriseClient {
    /// Log in with username and password.
    ///
    /// Runs the same three steps as the web sign-in page: fetch a CSRF
    /// cookie, exchange the credentials for an access token, then trade the
    /// token for a web session cookie. Rejected credentials are reported as
    /// [`Error::Authentication`]; nothing is retried.
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<()> {
        self.logged_in = false;
        tracing::info!(username, "Logging in to Memrise");

        let url = self.url("/v1.21/web/ensure_csrf")?;
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Connection(describe(&e, &url)))?;
        if !response.status().is_success() {
            return Err(Error::Connection(format!(
                "HTTP {} for {url}",
                response.status()
            )));
        }

        let url = self.url("/v1.21/auth/access_token/")?;
        let form = [
            ("client_id", CLIENT_ID),
            ("grant_type", "password"),
            ("username", username),
            ("password", password.expose_secret()),
        ];
        let response = self
            .http
            .post(url.clone())
            .header(reqwest::header::REFERER, self.referer("/signin"))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Connection(describe(&e, &url)))?;
        check_login_status(response.status(), "access token")?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::Connection(describe(&e, &url)))?;
        let token: AccessTokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Authentication(format!("no access token in login response: {e}")))?;

        let url = self.url("/v1.21/auth/web/")?;
        let response = self
            .http
            .get(url.clone())
            .query(&[
                ("invalidate_token_after", "true"),
                ("token", token.access_token.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Connection(describe(&e, &url)))?;
        check_login_status(response.status(), "web session")?;

        if self.csrf_token().is_none() {
            return Err(Error::Authentication(
                "login did not leave a csrftoken cookie".to_string(),
            ));
        }

        self.logged_in = true;
        tracing::info!(username, "Logged in");
        Ok(())
    }
}

/// Server errors are connection failures; any other non-2xx during login
/// means the credentials (or the token derived from them) were rejected.
fn check_login_status(status: StatusCode, step: &str) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else if status.is_server_error() {
        Err(Error::Connection(format!("HTTP {status} during {step} step")))
    } else {
        Err(Error::Authentication(format!(
            "invalid username or password (HTTP {status} during {step} step)"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub;
    use crate::DEFAULT_TIMEOUT;
    use axum::http::{header, Method};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    fn login_app(token_status: axum::http::StatusCode) -> Router {
        Router::new()
            .route(
                "/v1.21/web/ensure_csrf",
                get(|| async { ([(header::SET_COOKIE, "csrftoken=tok123; Path=/")], Json(json!({}))) }),
            )
            .route(
                "/v1.21/auth/access_token/",
                post(move || async move {
                    (
                        token_status,
                        Json(json!({"access_token": {"access_token": "T0K", "token_type": "Bearer"}})),
                    )
                }),
            )
            .route(
                "/v1.21/auth/web/",
                get(|| async {
                    (
                        [(header::SET_COOKIE, "sessionid_2=s3ss; Path=/")],
                        Json(json!({"success": true})),
                    )
                }),
            )
    }

    fn password() -> SecretString {
        SecretString::from("bar".to_string())
    }

    #[tokio::test]
    async fn test_login_sequence() {
        let (base, requests) = stub::serve(login_app(axum::http::StatusCode::OK)).await;
        let mut client = MemriseClient::with_base_url(&base, DEFAULT_TIMEOUT).unwrap();

        client.login("foo", &password()).await.unwrap();
        assert!(client.is_logged_in());
        assert_eq!(client.csrf_token().as_deref(), Some("tok123"));

        let seen = requests.all();
        assert_eq!(
            requests.paths(),
            vec!["/v1.21/web/ensure_csrf", "/v1.21/auth/access_token/", "/v1.21/auth/web/"]
        );

        let token = &seen[1];
        assert_eq!(token.method, Method::POST);
        assert_eq!(token.header("referer"), Some(format!("{base}/signin").as_str()));
        for field in [
            "client_id=1e739f5e77704b57a703",
            "grant_type=password",
            "username=foo",
            "password=bar",
        ] {
            assert!(token.body.contains(field), "missing {field} in {}", token.body);
        }

        let web = &seen[2];
        assert!(web.query.contains("invalidate_token_after=true"));
        assert!(web.query.contains("token=T0K"));
        assert!(web.header("cookie").unwrap_or_default().contains("csrftoken=tok123"));
    }

    #[tokio::test]
    async fn test_login_rejected_credentials() {
        let (base, requests) = stub::serve(login_app(axum::http::StatusCode::FORBIDDEN)).await;
        let mut client = MemriseClient::with_base_url(&base, DEFAULT_TIMEOUT).unwrap();

        let err = client.login("foo", &password()).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
        assert!(!client.is_logged_in());
        assert_eq!(
            requests.paths(),
            vec!["/v1.21/web/ensure_csrf", "/v1.21/auth/access_token/"]
        );
    }

    #[tokio::test]
    async fn test_login_server_error_is_connection_error() {
        let (base, _) = stub::serve(login_app(axum::http::StatusCode::BAD_GATEWAY)).await;
        let mut client = MemriseClient::with_base_url(&base, DEFAULT_TIMEOUT).unwrap();

        let err = client.login("foo", &password()).await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[tokio::test]
    async fn test_login_without_token_in_body() {
        let app = Router::new()
            .route("/v1.21/web/ensure_csrf", get(|| async { Json(json!({})) }))
            .route(
                "/v1.21/auth/access_token/",
                post(|| async { Json(json!({"error": "unexpected"})) }),
            );
        let (base, _) = stub::serve(app).await;
        let mut client = MemriseClient::with_base_url(&base, DEFAULT_TIMEOUT).unwrap();

        let err = client.login("foo", &password()).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[test]
    fn test_check_login_status() {
        assert!(check_login_status(StatusCode::OK, "access token").is_ok());
        assert!(matches!(
            check_login_status(StatusCode::FORBIDDEN, "access token"),
            Err(Error::Authentication(_))
        ));
        assert!(matches!(
            check_login_status(StatusCode::BAD_REQUEST, "access token"),
            Err(Error::Authentication(_))
        ));
        assert!(matches!(
            check_login_status(StatusCode::BAD_GATEWAY, "web session"),
            Err(Error::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_login_unreachable_host_is_connection_error() {
        // Port 9 (discard) on localhost is closed on test machines.
        let mut client =
            MemriseClient::with_base_url("http://127.0.0.1:9", std::time::Duration::from_secs(2))
                .unwrap();
        let err = client
            .login("foo", &password())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        assert!(!client.is_logged_in());
    }
}
