//! Vision-language API client: one chat completion request per analysis.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

use crate::prompt::Prompt;
use crate::storage::ImageRef;

mod payload;
mod transport;

pub use transport::{HttpReply, HttpTransport, ReqwestTransport};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4-vision-preview";
pub const DEFAULT_MAX_TOKENS: u32 = 300;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Where in the response body extraction gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Body,
    Choices,
    Message,
    Content,
}

impl std::fmt::Display for ParseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            Self::Body => "json body",
            Self::Choices => "choices[0]",
            Self::Message => "choices[0].message",
            Self::Content => "choices[0].message.content",
        };
        f.write_str(stage)
    }
}

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("failed to read image: {path}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no prompt text configured for {prompt}")]
    MissingPromptText { prompt: String },
    #[error("failed to encode request: {message}")]
    Encode { message: String },
    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },
    #[error("network error: {message}")]
    Network { message: String },
    #[error("vision api returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response at {stage}: {message}")]
    Parse { stage: ParseStage, message: String },
}

pub type VisionResult<T> = std::result::Result<T, VisionError>;

/// Anything that can turn an image plus a prompt into text.
pub trait ImageAnalyzer {
    fn analyze(&self, image: &ImageRef, prompt: Prompt) -> VisionResult<String>;
}

#[derive(Debug, Clone)]
pub struct VisionOptions {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_key: String,
    /// Instruction text keyed by prompt name.
    pub prompt_texts: HashMap<String, String>,
}

impl VisionOptions {
    pub fn new(api_key: impl Into<String>, prompt_texts: HashMap<String, String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_key: api_key.into(),
            prompt_texts,
        }
    }
}

#[derive(Debug)]
pub struct VisionClient<T> {
    transport: T,
    options: VisionOptions,
}

impl<T: HttpTransport> VisionClient<T> {
    pub fn new(transport: T, options: VisionOptions) -> Self {
        Self { transport, options }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn prompt_text(&self, prompt: Prompt) -> VisionResult<&str> {
        self.options
            .prompt_texts
            .get(prompt.name())
            .map(String::as_str)
            .ok_or_else(|| VisionError::MissingPromptText {
                prompt: prompt.name().to_string(),
            })
    }

    fn build_body(&self, image: &ImageRef, prompt: Prompt) -> VisionResult<Vec<u8>> {
        let prompt_text = self.prompt_text(prompt)?;
        let bytes = std::fs::read(image.path()).map_err(|source| VisionError::ReadImage {
            path: image.path().to_path_buf(),
            source,
        })?;
        let encoded = STANDARD.encode(bytes);
        let request = payload::ChatRequest::new(
            &self.options.model,
            prompt_text,
            &encoded,
            self.options.max_tokens,
        );
        serde_json::to_vec(&request).map_err(|err| VisionError::Encode {
            message: err.to_string(),
        })
    }
}

impl<T: HttpTransport> ImageAnalyzer for VisionClient<T> {
    fn analyze(&self, image: &ImageRef, prompt: Prompt) -> VisionResult<String> {
        let body = self.build_body(image, prompt)?;
        tracing::info!(
            image = %image,
            prompt = %prompt,
            bytes = body.len(),
            "sending vision request"
        );

        let reply = self
            .transport
            .post_json(&self.options.endpoint, &self.options.api_key, body)?;
        if !(200..300).contains(&reply.status) {
            let preview: String = String::from_utf8_lossy(&reply.body)
                .chars()
                .take(ERROR_BODY_PREVIEW_CHARS)
                .collect();
            tracing::warn!(status = reply.status, "vision request rejected");
            return Err(VisionError::Status {
                status: reply.status,
                body: preview,
            });
        }

        let content = payload::extract_content(&reply.body)?;
        tracing::debug!(chars = content.chars().count(), "vision reply parsed");
        Ok(content)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Transport double returning a canned reply and recording requests.
    #[derive(Debug)]
    pub(crate) struct CannedTransport {
        pub(crate) reply: Result<HttpReply, fn() -> VisionError>,
        pub(crate) requests: RefCell<Vec<(String, String, Vec<u8>)>>,
    }

    impl CannedTransport {
        pub(crate) fn ok(status: u16, body: &str) -> Self {
            Self {
                reply: Ok(HttpReply {
                    status,
                    body: body.as_bytes().to_vec(),
                }),
                requests: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn failing(error: fn() -> VisionError) -> Self {
            Self {
                reply: Err(error),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpTransport for CannedTransport {
        fn post_json(&self, url: &str, bearer: &str, body: Vec<u8>) -> VisionResult<HttpReply> {
            self.requests
                .borrow_mut()
                .push((url.to_string(), bearer.to_string(), body));
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(make_error) => Err(make_error()),
            }
        }
    }

    pub(crate) fn options() -> VisionOptions {
        let prompt_texts = crate::prompt::PROMPT_NAMES
            .iter()
            .map(|name| (name.to_string(), format!("Describe as {name}")))
            .collect();
        VisionOptions::new("sk-test", prompt_texts)
    }

    pub(crate) fn completion(content: &str) -> String {
        serde_json::json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
            .to_string()
    }

    fn image_in(dir: &std::path::Path) -> ImageRef {
        let path = dir.join("IMG_0001.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xD9]).expect("image should be written");
        ImageRef::from_path(path)
    }

    fn haiku() -> Prompt {
        crate::prompt::PromptCatalog::new()
            .iter()
            .find(|prompt| prompt.name() == "HAIKU")
            .expect("HAIKU is in the catalog")
    }

    #[test]
    fn analyze_posts_bearer_request_and_returns_content() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let image = image_in(dir.path());
        let client = VisionClient::new(CannedTransport::ok(200, &completion("A cat.")), options());

        let text = client.analyze(&image, haiku()).expect("analysis should succeed");
        assert_eq!(text, "A cat.");

        let requests = client.transport().requests.borrow();
        assert_eq!(requests.len(), 1);
        let (url, bearer, body) = &requests[0];
        assert_eq!(url, DEFAULT_ENDPOINT);
        assert_eq!(bearer, "sk-test");
        let body: serde_json::Value = serde_json::from_slice(body).expect("body is json");
        assert_eq!(body["messages"][0]["content"][0]["text"], "Describe as HAIKU");
        assert_eq!(
            body["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,/9j/2Q=="
        );
    }

    #[test]
    fn analyze_rejects_non_success_status() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let image = image_in(dir.path());
        let client = VisionClient::new(
            CannedTransport::ok(401, r#"{"error":{"message":"invalid key"}}"#),
            options(),
        );

        let err = client.analyze(&image, haiku()).expect_err("401 should fail");
        assert!(matches!(err, VisionError::Status { status: 401, ref body } if body.contains("invalid key")));
    }

    #[test]
    fn analyze_surfaces_transport_timeout() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let image = image_in(dir.path());
        let client = VisionClient::new(
            CannedTransport::failing(|| VisionError::Timeout {
                timeout: DEFAULT_TIMEOUT,
            }),
            options(),
        );

        let err = client.analyze(&image, haiku()).expect_err("timeout should fail");
        assert!(matches!(err, VisionError::Timeout { .. }));
    }

    #[test]
    fn analyze_fails_before_network_when_image_is_missing() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let image = ImageRef::from_path(dir.path().join("IMG_0404.jpg"));
        let client = VisionClient::new(CannedTransport::ok(200, &completion("unused")), options());

        let err = client.analyze(&image, haiku()).expect_err("missing image should fail");
        assert!(matches!(err, VisionError::ReadImage { .. }));
        assert!(client.transport().requests.borrow().is_empty());
    }

    #[test]
    fn analyze_requires_prompt_text() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let image = image_in(dir.path());
        let client = VisionClient::new(
            CannedTransport::ok(200, &completion("unused")),
            VisionOptions::new("sk-test", HashMap::new()),
        );

        let err = client.analyze(&image, haiku()).expect_err("prompt text is required");
        assert!(matches!(err, VisionError::MissingPromptText { ref prompt } if prompt == "HAIKU"));
    }
}
