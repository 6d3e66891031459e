use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{DecodeError, FetchError};
use crate::state::fragment::Fragment;
use super::client::build_client;

/// Anything that can produce the next fragment. The scheduler is generic
/// over this so it can be driven by a fake in tests.
pub trait FragmentSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Fragment, FetchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    url: Url,
    field: String,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            url: config.url.clone(),
            field: config.field.clone(),
            timeout: config.timeout,
        })
    }
}

impl FragmentSource for Fetcher {
    async fn fetch(&self) -> Result<Fragment, FetchError> {
        debug!(url = %self.url, "fetching fragment");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_transport(e, self.timeout))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_body(e, self.timeout))?;

        let text = decode_fragment(&bytes, &self.field)?;
        debug!(len = text.len(), "fragment received");
        Ok(Fragment::new(text))
    }
}

/// Extract the string stored under `field` from a JSON object body.
///
/// An exact key match wins; otherwise the first key equal to `field`
/// ignoring ASCII case is used, so `Value` also accepts `value`.
pub fn decode_fragment(body: &[u8], field: &str) -> Result<String, DecodeError> {
    let Value::Object(map) = serde_json::from_slice::<Value>(body)? else {
        return Err(DecodeError::NotAnObject);
    };

    let found = map.get(field).or_else(|| {
        map.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(field))
            .map(|(_, value)| value)
    });

    match found {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(DecodeError::NotAString(field.to_string())),
        None => Err(DecodeError::MissingField(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(server: &MockServer, timeout: &str) -> Fetcher {
        let config = RawConfig {
            url: Some(format!("{}/jokes/random", server.uri())),
            timeout: Some(timeout.to_string()),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        Fetcher::new(&config).unwrap()
    }

    async fn serve(response: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jokes/random"))
            .respond_with(response)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_decode_exact_field() {
        let body = br#"{"Value":"Chuck Norris can divide by zero."}"#;
        assert_eq!(
            decode_fragment(body, "Value").unwrap(),
            "Chuck Norris can divide by zero."
        );
    }

    #[test]
    fn test_decode_case_insensitive_field() {
        let body = br#"{"icon_url":"x","id":"abc","value":"Chuck Norris counted to infinity. Twice."}"#;
        assert_eq!(
            decode_fragment(body, "Value").unwrap(),
            "Chuck Norris counted to infinity. Twice."
        );
    }

    #[test]
    fn test_decode_prefers_exact_match() {
        let body = br#"{"value":"lower","Value":"exact"}"#;
        assert_eq!(decode_fragment(body, "Value").unwrap(), "exact");
    }

    #[test]
    fn test_decode_keeps_text_unmodified() {
        let body = r#"{"Value":"  tabs\tand \"quotes\" and ünïcødé \n "}"#;
        assert_eq!(
            decode_fragment(body.as_bytes(), "Value").unwrap(),
            "  tabs\tand \"quotes\" and ünïcødé \n "
        );
    }

    #[test]
    fn test_decode_missing_field() {
        let err = decode_fragment(br#"{"Other":"x"}"#, "Value").unwrap_err();
        assert!(matches!(err, DecodeError::MissingField(f) if f == "Value"));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            decode_fragment(b"{\"Value\": ", "Value"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            decode_fragment(b"<html>oops</html>", "Value"),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_decode_not_an_object() {
        assert!(matches!(
            decode_fragment(br#"["Value"]"#, "Value"),
            Err(DecodeError::NotAnObject)
        ));
    }

    #[test]
    fn test_decode_non_string_field() {
        assert!(matches!(
            decode_fragment(br#"{"Value":42}"#, "Value"),
            Err(DecodeError::NotAString(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let server = serve(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"Value":"Chuck Norris can divide by zero."}"#, "application/json"),
        )
        .await;
        let fragment = fetcher_for(&server, "5s").fetch().await.unwrap();
        assert_eq!(fragment.text, "Chuck Norris can divide by zero.");
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let server = serve(ResponseTemplate::new(500)).await;
        let err = fetcher_for(&server, "5s").fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_fetch_non_200_success_is_rejected() {
        let server = serve(ResponseTemplate::new(204)).await;
        let err = fetcher_for(&server, "5s").fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(s) if s == StatusCode::NO_CONTENT));
    }

    #[tokio::test]
    async fn test_fetch_missing_field() {
        let server = serve(ResponseTemplate::new(200).set_body_string(r#"{"Other":"x"}"#)).await;
        let err = fetcher_for(&server, "5s").fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(DecodeError::MissingField(_))));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = serve(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"Value":"late"}"#)
                .set_delay(Duration::from_millis(500)),
        )
        .await;
        let err = fetcher_for(&server, "100ms").fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(t) if t == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = RawConfig {
            url: Some(format!("http://127.0.0.1:{port}/jokes/random")),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        let err = Fetcher::new(&config).unwrap().fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
