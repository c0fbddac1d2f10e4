use serde::Serialize;
use serde_json::Value;

use crate::service;

#[derive(Debug, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: Box<str>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: Box<str>,
}

impl ChatRequest {
    /// Validates an inbound body. `max_length` counts characters, not bytes.
    pub fn from_json(body: Value, max_length: usize) -> service::Result<Self> {
        let Value::Object(mut fields) = body else {
            return Err(service::Error::BadRequest(
                "request body must be a JSON object".into(),
            ));
        };

        let message = match fields.remove("message") {
            None | Some(Value::Null) => {
                return Err(service::Error::BadRequest("message is required".into()));
            }
            Some(Value::String(message)) => message,
            Some(_) => {
                return Err(service::Error::BadRequest("message must be a string".into()));
            }
        };

        if message.trim().is_empty() {
            return Err(service::Error::BadRequest("message must not be empty".into()));
        }
        if message.chars().count() > max_length {
            return Err(service::Error::BadRequest(
                format!("message exceeds {} characters", max_length).into(),
            ));
        }

        Ok(Self {
            message: message.into(),
        })
    }
}
