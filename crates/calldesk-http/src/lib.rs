//! HTTP adapter for the calling backend.
//!
//! Implements `calldesk-core`'s `NumberGateway` over the two JSON endpoints
//! `GET /get-all-numbers` and `POST /add-number`.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use calldesk_core::{
    domain::{AddNumberRequest, NumberMapping},
    errors::Error,
    ports::NumberGateway,
    Result,
};

/// Response wrapper used by every backend endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct AddNumberBody<'a> {
    phone_number: &'a str,
    /// Base64 of the raw audio bytes.
    audio_file: String,
    text_content: &'a str,
}

#[derive(Clone, Debug)]
pub struct HttpGateway {
    base_url: String,
    http: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("invalid API base URL {base_url:?}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("calldesk/0.1")
            .build()
            .map_err(|e| Error::External(format!("http client build error: {e}")))?;

        Ok(Self { base_url, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[async_trait]
impl NumberGateway for HttpGateway {
    async fn list_numbers(&self) -> Result<Vec<NumberMapping>> {
        let resp = self
            .http
            .get(self.url("get-all-numbers"))
            .send()
            .await
            .map_err(|e| Error::External(format!("get-all-numbers request error: {e}")))?;

        let numbers: Vec<NumberMapping> =
            read_envelope(resp, "get-all-numbers", "Failed to load numbers").await?;
        tracing::debug!(count = numbers.len(), "fetched number mappings");
        Ok(numbers)
    }

    async fn add_number(&self, req: AddNumberRequest) -> Result<NumberMapping> {
        let body = AddNumberBody {
            phone_number: &req.phone_number,
            audio_file: BASE64.encode(&req.audio.data),
            text_content: &req.text_content,
        };

        let resp = self
            .http
            .post(self.url("add-number"))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::External(format!("add-number request error: {e}")))?;

        read_envelope(resp, "add-number", "Failed to add number").await
    }
}

/// Decode `{success, data, error}`.
///
/// `success: false` (or a missing `data`) is a remote error, whatever the
/// HTTP status. A body that is not an envelope is a remote error on non-2xx
/// and an external error otherwise.
async fn read_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
    op: &str,
    fallback_error: &str,
) -> Result<T> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| Error::External(format!("{op} body read error: {e}")))?;
    let status_error = || {
        Error::Remote(format!(
            "{op} failed: {status} {}",
            text.chars().take(200).collect::<String>()
        ))
    };

    let envelope: Envelope<T> = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) if status.is_success() => {
            return Err(Error::External(format!("{op} json error: {e}")));
        }
        Err(_) => return Err(status_error()),
    };

    // A non-2xx status is a failure whatever the body claims.
    if !status.is_success() {
        return Err(match envelope.error.filter(|e| !e.trim().is_empty()) {
            Some(msg) => Error::Remote(msg),
            None => status_error(),
        });
    }

    if !envelope.success {
        let msg = envelope
            .error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| fallback_error.to_string());
        return Err(Error::Remote(msg));
    }

    envelope
        .data
        .ok_or_else(|| Error::Remote(format!("{op} returned success without data")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calldesk_core::domain::AudioAttachment;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn gateway(server: &MockServer) -> HttpGateway {
        HttpGateway::new(format!("{}/api/v1/calling/", server.uri()), Duration::from_secs(5))
            .unwrap()
    }

    fn mapping_json(id: u64, phone: &str) -> serde_json::Value {
        json!({
            "id": id,
            "phone_number": phone,
            "audio_url": format!("https://example.com/audio{id}.mp3"),
            "text_content": "Thanks for calling",
            "created_at": "2024-01-15T10:30:00Z"
        })
    }

    fn request() -> AddNumberRequest {
        AddNumberRequest::new(
            "+15551234567",
            "Thanks for calling",
            Some(&AudioAttachment::new("hello.mp3", b"RIFF".to_vec())),
        )
        .unwrap()
    }

    #[test]
    fn rejects_unparsable_base_url() {
        assert!(matches!(
            HttpGateway::new("not a url", Duration::from_secs(1)),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn lists_numbers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/calling/get-all-numbers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [mapping_json(1, "+1234567890"), mapping_json(2, "+0987654321")]
            })))
            .mount(&server)
            .await;

        let numbers = gateway(&server).list_numbers().await.unwrap();
        assert_eq!(numbers.len(), 2);
        assert_eq!(numbers[1].phone_number, "+0987654321");
    }

    #[tokio::test]
    async fn unsuccessful_list_is_an_error_not_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/calling/get-all-numbers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
            .mount(&server)
            .await;

        let err = gateway(&server).list_numbers().await.unwrap_err();
        assert!(matches!(err, Error::Remote(msg) if msg == "Failed to load numbers"));
    }

    #[tokio::test]
    async fn add_number_posts_base64_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/calling/add-number"))
            .and(body_json(json!({
                "phone_number": "+15551234567",
                "audio_file": "UklGRg==",
                "text_content": "Thanks for calling"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": mapping_json(9, "+15551234567")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rec = gateway(&server).add_number(request()).await.unwrap();
        assert_eq!(rec.id, 9);
        assert_eq!(rec.phone_number, "+15551234567");
    }

    #[tokio::test]
    async fn add_number_surfaces_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/calling/add-number"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "error": "number already registered"
            })))
            .mount(&server)
            .await;

        let err = gateway(&server).add_number(request()).await.unwrap_err();
        assert!(matches!(err, Error::Remote(msg) if msg == "number already registered"));
    }

    #[tokio::test]
    async fn error_status_wins_over_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/calling/get-all-numbers"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "success": true,
                "data": []
            })))
            .mount(&server)
            .await;

        let err = gateway(&server).list_numbers().await.unwrap_err();
        assert!(matches!(err, Error::Remote(msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn add_number_defaults_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/calling/add-number"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
            .mount(&server)
            .await;

        let err = gateway(&server).add_number(request()).await.unwrap_err();
        assert!(matches!(err, Error::Remote(msg) if msg == "Failed to add number"));
    }

    #[tokio::test]
    async fn non_json_failure_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/calling/get-all-numbers"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = gateway(&server).list_numbers().await.unwrap_err();
        match err {
            Error::Remote(msg) => assert!(msg.contains("502"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn garbage_on_success_is_external() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/calling/get-all-numbers"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = gateway(&server).list_numbers().await.unwrap_err();
        assert!(matches!(err, Error::External(_)));
    }
}
