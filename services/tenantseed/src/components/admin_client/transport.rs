use reqwest::Method;
use serde_json::Value;

use super::error::ClientError;
use super::params::ApiParams;

///
/// "Send request, get parsed JSON response" against the admin API.
///
#[async_trait::async_trait]
pub trait AdminTransport: Sync + Send + 'static {
    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &ApiParams,
    ) -> Result<Value, ClientError>;
}

pub fn carries_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}
