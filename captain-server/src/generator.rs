use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use captain_types::GeneratedGame;

#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<ImageAttachment>,
}

/// The single failure the generation provider can produce. The reason is for
/// logs only; callers never get a partial result.
#[derive(Debug, thiserror::Error)]
#[error("Game generation failed: {reason}")]
pub struct GenerationFailed {
    reason: String,
}

impl GenerationFailed {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Turns a description (and optional sketch) into a playable game.
#[async_trait]
pub trait GameGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedGame, GenerationFailed>;
}

pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl GameGenerator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedGame, GenerationFailed> {
        let url = self.endpoint();
        tracing::debug!("Requesting game generation from {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request_body(request))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Generation request failed: {:?}", e);
                GenerationFailed::new(e.to_string())
            })?;

        if !response.status().is_success() {
            tracing::warn!("Generation provider returned status: {}", response.status());
            return Err(GenerationFailed::new(format!(
                "provider returned {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| {
            tracing::warn!("Failed to read generation response: {:?}", e);
            GenerationFailed::new(e.to_string())
        })?;

        parse_response(&body)
    }
}

fn build_prompt(description: &str) -> String {
    format!(
        "You are an expert game developer for kids.\n\
         User request: \"{}\".\n\n\
         If an image is provided, treat it as a sketch of a game level.\n\n\
         Generate a SINGLE self-contained HTML file with inline CSS and JS that implements \
         this simple game so it plays in a web browser. Use canvas or DOM elements so it is \
         interactive, use neon colors on a dark space theme, and keep the code short.\n\n\
         Also write a simple, encouraging explanation for a child of how the code works.",
        description
    )
}

/// Request body for `generateContent`. The sketch goes first so the text
/// instructions can refer to it.
pub fn build_request_body(request: &GenerationRequest) -> serde_json::Value {
    let mut parts = Vec::new();

    if let Some(image) = &request.image {
        parts.push(json!({
            "inline_data": {
                "mime_type": image.mime_type,
                "data": base64::engine::general_purpose::STANDARD.encode(&image.data),
            }
        }));
    }
    parts.push(json!({ "text": build_prompt(&request.prompt) }));

    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "explanation": {
                        "type": "STRING",
                        "description": "A friendly explanation for a child about the code logic."
                    },
                    "code": {
                        "type": "STRING",
                        "description": "The full executable HTML code for the game."
                    }
                },
                "required": ["explanation", "code"]
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pull the structured game out of a `generateContent` response body.
pub fn parse_response(body: &str) -> Result<GeneratedGame, GenerationFailed> {
    let response: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        tracing::warn!("Failed to parse generation envelope: {:?}", e);
        GenerationFailed::new("malformed response envelope")
    })?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect::<String>())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationFailed::new("no response from provider"));
    }

    let game: GeneratedGame = serde_json::from_str(&text).map_err(|e| {
        tracing::warn!("Generated payload is not the expected JSON: {:?}", e);
        GenerationFailed::new("malformed game payload")
    })?;

    if game.code.trim().is_empty() {
        return Err(GenerationFailed::new("provider returned empty game code"));
    }

    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    #[test]
    fn test_request_body_without_image() {
        let body = build_request_body(&GenerationRequest {
            prompt: "floor is lava".to_string(),
            image: None,
        });

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0]["text"].as_str().unwrap().contains("floor is lava"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_request_body_puts_image_first() {
        let body = build_request_body(&GenerationRequest {
            prompt: "collect stars".to_string(),
            image: Some(ImageAttachment {
                mime_type: "image/png".to_string(),
                data: vec![1, 2, 3],
            }),
        });

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[0]["inline_data"]["data"], "AQID");
        assert!(parts[1]["text"].is_string());
    }

    #[test]
    fn test_parse_response() {
        let payload = json!({
            "explanation": "The loop moves your rocket!",
            "code": "<html><script>loop()</script></html>"
        })
        .to_string();

        let game = parse_response(&envelope(&payload)).unwrap();
        assert_eq!(game.explanation, "The loop moves your rocket!");
        assert_eq!(game.code, "<html><script>loop()</script></html>");
    }

    #[test]
    fn test_parse_response_without_candidates() {
        assert!(parse_response(r#"{"candidates": []}"#).is_err());
        assert!(parse_response("{}").is_err());
    }

    #[test]
    fn test_parse_response_rejects_malformed_payloads() {
        assert!(parse_response("not json").is_err());
        assert!(parse_response(&envelope("just some prose")).is_err());
        assert!(parse_response(&envelope(r#"{"explanation": "hi"}"#)).is_err());
        assert!(parse_response(&envelope(r#"{"explanation": "hi", "code": "  "}"#)).is_err());
    }
}
