use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Identity of the pre-provisioned assistant that drafts the documents.
pub const DEFAULT_ASSISTANT_ID: &str = "asst_am7evj3dygihdztqx0boe0e6";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub assistant: AssistantConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub max_upload_bytes: usize,
    /// Idle time after which a visitor has to accept the terms again
    pub session_ttl_secs: u64,
}

impl ServerConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[derive(Clone, Deserialize)]
pub struct AssistantConfig {
    pub api_key: String,
    pub assistant_id: String,
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

// Keeps the API key out of `info!("{:?}", config)` lines.
impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("assistant_id", &self.assistant_id)
            .field("base_url", &self.base_url)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AssistantConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Tesseract language code, e.g. `por`
    pub ocr_language: String,
    pub tesseract_cmd: String,
    /// Only read by the in-process engine (`ocr` feature)
    pub tessdata_dir: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ocr_language: "por".to_string(),
            tesseract_cmd: "tesseract".to_string(),
            tessdata_dir: "/usr/share/tesseract-ocr/5/tessdata".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8501".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .unwrap_or_else(|_| (25 * 1024 * 1024).to_string())
                    .parse()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                session_ttl_secs: env::var("SESSION_TTL_SECS")
                    .unwrap_or_else(|_| "43200".to_string())
                    .parse()
                    .context("SESSION_TTL_SECS must be an integer")?,
            },
            assistant: AssistantConfig {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                assistant_id: env::var("ASSISTANT_ID")
                    .unwrap_or_else(|_| DEFAULT_ASSISTANT_ID.to_string()),
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
                poll_interval_ms: env::var("ASSISTANT_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .context("ASSISTANT_POLL_INTERVAL_MS must be an integer")?,
                timeout_secs: env::var("ASSISTANT_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .context("ASSISTANT_TIMEOUT_SECS must be an integer")?,
            },
            extraction: ExtractionConfig {
                ocr_language: env::var("OCR_LANGUAGE").unwrap_or_else(|_| "por".to_string()),
                tesseract_cmd: env::var("TESSERACT_CMD")
                    .unwrap_or_else(|_| "tesseract".to_string()),
                tessdata_dir: env::var("TESSDATA_DIR")
                    .unwrap_or_else(|_| ExtractionConfig::default().tessdata_dir),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let config = AssistantConfig {
            api_key: "sk-secret-123".to_string(),
            assistant_id: DEFAULT_ASSISTANT_ID.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            poll_interval_ms: 1000,
            timeout_secs: 300,
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret-123"));
        assert!(rendered.contains("<redacted>"));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.timeout(), Duration::from_secs(300));
    }
}
