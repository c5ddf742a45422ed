use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use super::{VisionError, VisionResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

/// HTTPS session capability used by the vision client.
pub trait HttpTransport {
    fn post_json(&self, url: &str, bearer: &str, body: Vec<u8>) -> VisionResult<HttpReply>;
}

/// Blocking reqwest session with a bounded request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> VisionResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| VisionError::Network {
                message: format!("failed to build http client: {err}"),
            })?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, err: reqwest::Error) -> VisionError {
        if err.is_timeout() {
            VisionError::Timeout {
                timeout: self.timeout,
            }
        } else {
            VisionError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_json(&self, url: &str, bearer: &str, body: Vec<u8>) -> VisionResult<HttpReply> {
        let response = self
            .client
            .post(url)
            .bearer_auth(bearer)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|err| self.map_error(err))?;

        let status = response.status().as_u16();
        let body = response.bytes().map_err(|err| self.map_error(err))?;
        Ok(HttpReply {
            status,
            body: body.to_vec(),
        })
    }
}
