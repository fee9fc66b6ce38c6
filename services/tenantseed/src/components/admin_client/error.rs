use reqwest::Method;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{method} {path} failed: {source}")]
    Transport {
        method: Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {path} timed out")]
    Timeout { method: Method, path: String },

    #[error("{method} {path} returned status {status}: {body}")]
    Status {
        method: Method,
        path: String,
        status: u16,
        body: String,
    },

    #[error("{method} {path} returned a body that is not JSON: {source}")]
    MalformedResponse {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected `{what}` response: {source}")]
    UnexpectedShape {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request url: {source}")]
    InvalidUrl {
        #[from]
        source: url::ParseError,
    },
}

impl ClientError {
    pub(super) fn from_reqwest(method: Method, path: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return ClientError::Timeout {
                method,
                path: path.to_string(),
            };
        }

        ClientError::Transport {
            method,
            path: path.to_string(),
            source,
        }
    }
}
