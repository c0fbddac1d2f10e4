use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

pub const DEFAULT_UPSTREAM_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CHAT_PATH: &str = "/chatbot";
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 16_000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("Invalid {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: Box<str>,
        reason: &'static str,
    },
}

/// Process-wide settings, read once before the listener starts.
#[derive(Clone)]
pub struct Config {
    pub api_key: Box<str>,
    pub upstream_url: Box<str>,
    pub model: Box<str>,
    pub host: IpAddr,
    pub port: u16,
    pub chat_path: Box<str>,
    pub max_message_length: usize,
}

// Hand-written so the key never ends up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("upstream_url", &self.upstream_url)
            .field("model", &self.model)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("chat_path", &self.chat_path)
            .field("max_message_length", &self.max_message_length)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENROUTER_API_KEY")
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing("OPENROUTER_API_KEY"))?;

        let upstream_url = lookup("OPENROUTER_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_URL.into());
        if !(upstream_url.starts_with("http://") || upstream_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "OPENROUTER_URL",
                value: upstream_url.into(),
                reason: "expected an http or https URL",
            });
        }

        let model = lookup("DEFAULT_MODEL")
            .map(|model| model.trim().to_owned())
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.into());

        let host = match lookup("HOST") {
            Some(host) => host.parse::<IpAddr>().map_err(|_| ConfigError::Invalid {
                name: "HOST",
                value: host.into(),
                reason: "expected an IP address",
            })?,
            None => DEFAULT_HOST,
        };

        let port = match lookup("PORT") {
            Some(port) => port.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: port.into(),
                reason: "expected a number between 0 and 65535",
            })?,
            None => DEFAULT_PORT,
        };

        let chat_path = lookup("CHATBOT_PATH").unwrap_or_else(|| DEFAULT_CHAT_PATH.into());
        if !chat_path.starts_with('/') || chat_path == "/health" {
            return Err(ConfigError::Invalid {
                name: "CHATBOT_PATH",
                value: chat_path.into(),
                reason: "must start with '/' and not collide with /health",
            });
        }
        if !is_literal_path(&chat_path) {
            return Err(ConfigError::Invalid {
                name: "CHATBOT_PATH",
                value: chat_path.into(),
                reason: "must be a literal path without captures or wildcards",
            });
        }

        let max_message_length = match lookup("MAX_MESSAGE_LENGTH") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_MESSAGE_LENGTH",
                        value: raw.into(),
                        reason: "expected a positive integer",
                    });
                }
            },
            None => DEFAULT_MAX_MESSAGE_LENGTH,
        };

        Ok(Self {
            api_key: api_key.into(),
            upstream_url: upstream_url.into(),
            model: model.into(),
            host,
            port,
            chat_path: chat_path.into(),
            max_message_length,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// True when the router would match `path` verbatim. Braces open captures and
/// segments led by `:` or `*` are rejected by the router at registration.
fn is_literal_path(path: &str) -> bool {
    !path.contains(['{', '}'])
        && path
            .split('/')
            .all(|segment| !segment.starts_with([':', '*']))
}
