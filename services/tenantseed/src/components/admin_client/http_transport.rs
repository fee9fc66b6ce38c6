use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use url::form_urlencoded;

use super::error::ClientError;
use super::params::ApiParams;
use super::transport::{carries_body, AdminTransport};

const HTTP_TARGET: &str = "tenantseed::http";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const MAX_ERROR_BODY: usize = 512;
const HIDDEN_TOKEN: &str = "<HIDDEN>";

///
/// `https://{host}`, unless the host already names a scheme.
///
pub fn base_url(host: &str) -> Result<Url, url::ParseError> {
    let host = host.trim().trim_end_matches('/');

    if host.starts_with("http://") || host.starts_with("https://") {
        Url::parse(host)
    } else {
        Url::parse(&format!("https://{}", host))
    }
}

pub struct HttpTransport {
    client: Client,
    base_url: Url,
    encoded_token: String,
}

/// `token_part` goes in verbatim, so it must already be encoded.
fn join_query(token_part: &str, encoded_params: &str) -> String {
    if encoded_params.is_empty() {
        format!("access_token={}", token_part)
    } else {
        format!("access_token={}&{}", token_part, encoded_params)
    }
}

impl HttpTransport {
    pub fn new(
        base_url: Url,
        access_token: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            encoded_token: form_urlencoded::byte_serialize(access_token.as_bytes()).collect(),
        })
    }

    fn query(&self, encoded_params: &str) -> String {
        join_query(&self.encoded_token, encoded_params)
    }

    fn traced_query(&self, encoded_params: &str) -> String {
        join_query(HIDDEN_TOKEN, encoded_params)
    }
}

#[async_trait::async_trait]
impl AdminTransport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &ApiParams,
    ) -> Result<Value, ClientError> {
        let encoded_params = params.encode();
        let with_body = carries_body(&method);
        let query_params = if with_body { "" } else { encoded_params.as_str() };

        tracing::debug!(
            target: HTTP_TARGET,
            "{} {}?{}",
            method,
            path,
            self.traced_query(query_params)
        );

        let mut url = self.base_url.join(path)?;
        url.set_query(Some(&self.query(query_params)));

        let mut request = self.client.request(method.clone(), url);
        if with_body {
            tracing::debug!(target: HTTP_TARGET, "{}", encoded_params);
            request = request
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(encoded_params);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ClientError::from_reqwest(method.clone(), path, err))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ClientError::from_reqwest(method.clone(), path, err))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(ClientError::Status {
                method,
                path: path.to_string(),
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        // DELETE answers with an empty body.
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|source| ClientError::MalformedResponse {
            method,
            path: path.to_string(),
            source,
        })
    }
}
