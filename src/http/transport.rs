//! Transport seam between pagination and the network

use super::client::HttpClient;
use crate::endpoint::ApiCall;
use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;

/// Fetches one page of an API call
///
/// Implementations own retries; callers see only the final outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `call` with the given pagination parameters and return the body
    async fn fetch(&self, call: &ApiCall, paging: &[(String, String)]) -> Result<JsonValue>;
}

#[async_trait]
impl Transport for HttpClient {
    async fn fetch(&self, call: &ApiCall, paging: &[(String, String)]) -> Result<JsonValue> {
        self.get_json(&call.path_and_query(paging)).await
    }
}
