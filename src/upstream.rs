use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

pub const ROLE_USER: &str = "user";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
pub struct OpenAIRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [OpenAIMessage<'a>],
}

#[derive(Debug, Serialize)]
pub struct OpenAIMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Box<str>,
}

// Only the first choice is read; the rest are left unchecked.
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

/// Outcome of a single chat-completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamReply {
    /// `choices[0].message.content` was present and textual.
    Success { text: Box<str> },
    /// A 2xx reply whose body did not have the expected shape.
    Malformed,
    /// The API reported a failure, either through a non-2xx status or an
    /// `error` object in place of `choices`.
    UpstreamError {
        status: StatusCode,
        message: Option<Box<str>>,
    },
}

/// Reads the error text out of `{"error": "..."}` or `{"error": {"message": "..."}}`.
fn error_message(body: &str) -> Option<Box<str>> {
    let json: Value = serde_json::from_str(body).ok()?;
    let error = json.get("error")?;
    error
        .as_str()
        .or_else(|| error.get("message").and_then(Value::as_str))
        .map(Box::from)
}

pub fn classify(status: StatusCode, body: &str) -> UpstreamReply {
    if !status.is_success() {
        return UpstreamReply::UpstreamError {
            status,
            message: error_message(body),
        };
    }

    match serde_json::from_str::<OpenAIResponse>(body) {
        Ok(response) => match response
            .choices
            .into_iter()
            .next()
            .map(serde_json::from_value::<OpenAIChoice>)
        {
            Some(Ok(choice)) => UpstreamReply::Success {
                text: choice.message.content,
            },
            _ => UpstreamReply::Malformed,
        },
        Err(_) => match error_message(body) {
            Some(message) => UpstreamReply::UpstreamError {
                status,
                message: Some(message),
            },
            None => UpstreamReply::Malformed,
        },
    }
}

/// Chat-completion client bound to one endpoint, model and key.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    url: Box<str>,
    model: Box<str>,
    api_key: Box<str>,
}

impl Client {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: config.upstream_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn complete(&self, message: &str) -> Result<UpstreamReply, ApiError> {
        let messages = [OpenAIMessage {
            role: ROLE_USER,
            content: message,
        }];
        let openai_request = OpenAIRequest {
            model: &self.model,
            messages: &messages,
        };

        let response = self
            .http
            .post(&*self.url)
            .bearer_auth(&self.api_key)
            .json(&openai_request)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        Ok(classify(status, &response_text))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_first_choice_content() {
        let body = json!({
            "id": "gen-1",
            "choices": [
                {"message": {"role": "assistant", "content": "hi there"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        })
        .to_string();
        assert_eq!(
            classify(StatusCode::OK, &body),
            UpstreamReply::Success { text: "hi there".into() }
        );
    }

    #[test]
    fn ignores_choices_after_the_first() {
        let body = json!({
            "choices": [
                {"message": {"content": "hi there"}},
                {"finish_reason": "length"}
            ]
        })
        .to_string();
        assert_eq!(
            classify(StatusCode::OK, &body),
            UpstreamReply::Success { text: "hi there".into() }
        );
    }

    #[test]
    fn non_success_status_is_upstream_error() {
        let body = json!({"error": {"message": "No auth credentials found", "code": 401}}).to_string();
        assert_eq!(
            classify(StatusCode::UNAUTHORIZED, &body),
            UpstreamReply::UpstreamError {
                status: StatusCode::UNAUTHORIZED,
                message: Some("No auth credentials found".into()),
            }
        );
        assert_eq!(
            classify(StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>"),
            UpstreamReply::UpstreamError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: None,
            }
        );
    }

    #[test]
    fn error_payload_with_ok_status_is_upstream_error() {
        let body = json!({"error": "model not found"}).to_string();
        assert_eq!(
            classify(StatusCode::OK, &body),
            UpstreamReply::UpstreamError {
                status: StatusCode::OK,
                message: Some("model not found".into()),
            }
        );
    }

    #[test]
    fn unexpected_shapes_are_malformed() {
        assert_eq!(classify(StatusCode::OK, "not json"), UpstreamReply::Malformed);
        assert_eq!(classify(StatusCode::OK, "{}"), UpstreamReply::Malformed);
        assert_eq!(classify(StatusCode::OK, r#"{"choices": []}"#), UpstreamReply::Malformed);
        assert_eq!(
            classify(StatusCode::OK, r#"{"choices": [{"message": {"content": null}}]}"#),
            UpstreamReply::Malformed
        );
    }

    #[test]
    fn request_serializes_single_user_message() {
        let messages = [OpenAIMessage { role: ROLE_USER, content: "hello" }];
        let request = OpenAIRequest { model: "gpt-4o-mini", messages: &messages };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"model": "gpt-4o-mini", "messages": [{"role": "user", "content": "hello"}]})
        );
    }
}
