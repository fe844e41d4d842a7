use reqwest::Client;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::cache::ResponseCache;
use crate::error::{Result, WunderlogError};

pub const WUNDERGROUND_API: &str = "https://api.wunderground.com/api";

const KEY_PLACEHOLDER: &str = "{api_key}";

/// Thin client over the Weather Underground REST API for one location.
#[derive(Debug)]
pub struct ApiClient {
    base_url: String,
    api_key: String,
    location: String,
    http: Client,
    cache: Box<dyn ResponseCache>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: String,
        location: String,
        cache: Box<dyn ResponseCache>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key,
            location,
            http: Client::new(),
            cache,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// `{base}/{key}/{path}/q/{location}.json`
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/q/{}.json",
            self.base_url,
            self.api_key,
            path.trim_matches('/'),
            self.location
        )
    }

    /// `url` with the API key replaced by a placeholder, safe to log.
    pub fn redact(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            return url.to_owned();
        }
        url.replace(&self.api_key, KEY_PLACEHOLDER)
    }

    /// GET `path` for this location and return the parsed body.
    ///
    /// The API reports some failures (bad key, unknown location) with a 200
    /// status and a `response.error` object; those become
    /// [`WunderlogError::Api`].
    pub async fn request(&self, path: &str) -> Result<Value> {
        let url = self.url_for(path);
        let redacted = self.redact(&url);
        tracing::info!("Fetching {redacted}");

        let key = cache_key(&url);
        let body = match self.cache.get(&key).await? {
            Some(body) => {
                tracing::debug!("Cache hit for {redacted}");
                body
            }
            None => {
                let body = self
                    .http
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                self.cache.put(&key, &body).await?;
                body
            }
        };

        let parsed: Value = serde_json::from_str(&body).map_err(|source| WunderlogError::Decode {
            url: redacted.clone(),
            source,
        })?;

        if let Some(error) = parsed.pointer("/response/error").filter(|e| is_set(e)) {
            return Err(WunderlogError::Api {
                url: redacted,
                error: error.clone(),
            });
        }

        Ok(parsed)
    }
}

/// Hex SHA-256 of the full URL, API key included.
fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

// null, false, 0, "" and empty containers count as "no error"
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
