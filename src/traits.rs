use async_trait::async_trait;

use crate::error::Result;

/// What a server answered, before any interpretation
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Something that can send HTTP requests to the booking server.
///
/// Implementors must keep the cookies set by the server and send them back on later requests,
/// since this is how the login session is carried.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST to `url`, with a JSON body if there is one
    async fn post(&self, url: &str, json_body: Option<Vec<u8>>) -> Result<RawResponse>;
}
