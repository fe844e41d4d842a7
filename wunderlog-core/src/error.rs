use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = WunderlogError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum WunderlogError {
    /// Transport failure or a non-success HTTP status.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The API answered 200 but reported an error in the body.
    #[error("{url}: {error}")]
    Api {
        url: String,
        error: serde_json::Value,
    },

    #[error("{url}: response is not valid JSON")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("forecast kind must be 'hourly' or 'daily', not '{0}'")]
    InvalidForecastKind(String),

    #[error("'{key}' response has no '{field}'")]
    MissingField { key: String, field: &'static str },

    #[error("observation has an invalid date: {0}")]
    InvalidObservationDate(String),

    #[error("I/O error on '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on '{path}'")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no API key: {0}")]
    Credentials(String),
}

impl WunderlogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_message_embeds_url_and_payload() {
        let err = WunderlogError::Api {
            url: "https://example.test/{api_key}/history_20240101/q/X.json".into(),
            error: json!({"description": "bad key"}),
        };
        let msg = err.to_string();

        assert!(msg.starts_with("https://example.test/{api_key}/"));
        assert!(msg.contains("bad key"));
    }

    #[test]
    fn invalid_kind_names_the_value() {
        let err = WunderlogError::InvalidForecastKind("weekly".into());
        assert!(err.to_string().contains("'weekly'"));
    }
}
