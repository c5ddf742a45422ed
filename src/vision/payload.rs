use serde::Serialize;
use serde_json::Value;

use super::{ParseStage, VisionError, VisionResult};

const USER_ROLE: &str = "user";

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: [ContentPart<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

impl<'a> ChatRequest<'a> {
    pub(crate) fn new(model: &'a str, prompt_text: &'a str, image_base64: &str, max_tokens: u32) -> Self {
        Self {
            model,
            messages: [ChatMessage {
                role: USER_ROLE,
                content: [
                    ContentPart::Text { text: prompt_text },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{image_base64}"),
                        },
                    },
                ],
            }],
            max_tokens,
        }
    }
}

/// Pull `choices[0].message.content` out of a chat completion body.
pub(crate) fn extract_content(body: &[u8]) -> VisionResult<String> {
    let value: Value = serde_json::from_slice(body).map_err(|err| VisionError::Parse {
        stage: ParseStage::Body,
        message: err.to_string(),
    })?;

    let choice = value
        .get("choices")
        .and_then(|choices| choices.get(0))
        .ok_or_else(|| missing(ParseStage::Choices))?;
    let message = choice
        .get("message")
        .ok_or_else(|| missing(ParseStage::Message))?;
    let content = message
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| missing(ParseStage::Content))?;

    Ok(content.to_string())
}

fn missing(stage: ParseStage) -> VisionError {
    VisionError::Parse {
        stage,
        message: "field missing or wrong type".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_chat_completion_shape() {
        let request = ChatRequest::new("gpt-4-vision-preview", "Write a haiku", "QUJD", 300);
        let value = serde_json::to_value(&request).expect("request should serialize");

        assert_eq!(value["model"], "gpt-4-vision-preview");
        assert_eq!(value["max_tokens"], 300);
        assert_eq!(value["messages"][0]["role"], "user");
        let content = &value["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "Write a haiku");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,QUJD");
    }

    #[test]
    fn extract_content_reads_first_choice() {
        let body = br#"{"choices":[{"message":{"role":"assistant","content":"A cat."}},{"message":{"content":"ignored"}}]}"#;
        assert_eq!(extract_content(body).expect("content present"), "A cat.");
    }

    #[test]
    fn extract_content_names_failing_stage() {
        let cases: [(&[u8], ParseStage); 5] = [
            (b"<html>", ParseStage::Body),
            (br#"{"error":{"message":"bad key"}}"#, ParseStage::Choices),
            (br#"{"choices":[]}"#, ParseStage::Choices),
            (br#"{"choices":[{"text":"legacy"}]}"#, ParseStage::Message),
            (br#"{"choices":[{"message":{"content":null}}]}"#, ParseStage::Content),
        ];

        for (body, expected) in cases {
            let err = extract_content(body).expect_err("malformed body should fail");
            assert!(
                matches!(err, VisionError::Parse { stage, .. } if stage == expected),
                "unexpected error for {}: {err:?}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
