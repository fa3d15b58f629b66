use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;
use webhook_auth::webhook::{sign, WebhookSecret};

/// A webhook request ready to be posted, headers included.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl WebhookRequest {
    /// Signs `body` with a fresh message id and the given send time, using epoch seconds
    /// in the timestamp header.
    pub fn signed(secret: &WebhookSecret, body: &str, sent_at: DateTime<Utc>) -> Result<Self> {
        let epoch = sent_at.timestamp();
        Self::signed_with_timestamp(secret, body, epoch, epoch.to_string())
    }

    /// Same as [`WebhookRequest::signed`] but sends the timestamp as ISO-8601.
    pub fn signed_iso(secret: &WebhookSecret, body: &str, sent_at: DateTime<Utc>) -> Result<Self> {
        Self::signed_with_timestamp(
            secret,
            body,
            sent_at.timestamp(),
            sent_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }

    fn signed_with_timestamp(
        secret: &WebhookSecret,
        body: &str,
        epoch: i64,
        timestamp_header: String,
    ) -> Result<Self> {
        let msg_id = format!("msg_{}", Uuid::new_v4().simple());
        let signature =
            sign(secret, &msg_id, epoch, body.as_bytes()).context("Failed to sign payload")?;

        Ok(Self {
            headers: vec![
                ("webhook-id".to_string(), msg_id),
                ("webhook-timestamp".to_string(), timestamp_header),
                ("webhook-signature".to_string(), signature),
            ],
            body: body.to_string(),
        })
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.retain(|(existing, _)| existing != name);
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.retain(|(existing, _)| existing != name);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }
}

pub struct WebhookClient {
    client: Client,
    url: String,
}

impl WebhookClient {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }

    /// Posts the request and returns the JSON acknowledgment.
    pub async fn send(&self, request: &WebhookRequest) -> Result<Value> {
        let mut builder = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .context("Failed to send webhook request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Webhook endpoint answered {} - Response: {}", status, body);
        }

        response
            .json()
            .await
            .context("Webhook endpoint did not answer with JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn secret() -> WebhookSecret {
        WebhookSecret::parse("whsec_dGVzdF9zZWNyZXQ=").unwrap()
    }

    #[test]
    fn test_signed_request_carries_standard_headers() {
        let sent_at = Utc.timestamp_opt(1_706_832_000, 0).unwrap();
        let request = WebhookRequest::signed(&secret(), "{}", sent_at).unwrap();

        let msg_id = request.header("webhook-id").unwrap();
        assert!(msg_id.starts_with("msg_"));
        assert_eq!(request.header("webhook-timestamp"), Some("1706832000"));
        assert_eq!(
            request.header("webhook-signature").unwrap(),
            sign(&secret(), msg_id, 1_706_832_000, b"{}").unwrap()
        );
    }

    #[test]
    fn test_signed_iso_request_uses_rfc3339() {
        let sent_at = Utc.timestamp_opt(1_706_832_000, 0).unwrap();
        let request = WebhookRequest::signed_iso(&secret(), "{}", sent_at).unwrap();

        assert_eq!(
            request.header("webhook-timestamp"),
            Some("2024-02-02T00:00:00Z")
        );
    }

    #[test]
    fn test_header_overrides() {
        let request = WebhookRequest::signed(&secret(), "{}", Utc::now())
            .unwrap()
            .with_header("webhook-signature", "v1,AAAA")
            .without_header("webhook-id");

        assert_eq!(request.header("webhook-signature"), Some("v1,AAAA"));
        assert_eq!(request.header("webhook-id"), None);
        assert_eq!(request.headers.len(), 2);
    }

    #[tokio::test]
    async fn test_send_returns_acknowledgment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/webhook")
            .match_header("webhook-id", mockito::Matcher::Regex("^msg_".to_string()))
            .with_status(200)
            .with_body(r#"{"status":"success","message":"Event received and logged"}"#)
            .create_async()
            .await;
        let client = WebhookClient::new(Client::new(), format!("{}/webhook", server.url()));
        let request = WebhookRequest::signed(&secret(), "{}", Utc::now()).unwrap();

        let response = client.send(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response["status"], "success");
    }
}
