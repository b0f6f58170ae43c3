use async_trait::async_trait;
use ordbok_generator::{GenerateError, GenerateRequest, Generator, ProviderMetadata};
use serde_json::{Value, json};

/// Gemini `generateContent` backend
#[derive(Clone)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Request body for one generation
pub fn request_body(request: &GenerateRequest) -> Value {
    let mut generation_config = json!({
        "responseMimeType": "application/json",
        "temperature": request.temperature,
    });
    if let Some(schema) = &request.response_schema {
        generation_config["responseSchema"] = schema.clone();
    }

    json!({
        "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
        "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
        "generationConfig": generation_config,
    })
}

/// Text of the first candidate, all parts joined
pub fn response_text(body: &Value) -> Result<String, GenerateError> {
    let parts = body["candidates"]
        .get(0)
        .and_then(|c| c["content"]["parts"].as_array());

    let Some(parts) = parts else {
        if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
            return Err(GenerateError::Malformed(format!("prompt blocked: {reason}")));
        }
        return Err(GenerateError::EmptyResponse);
    };

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() {
        return Err(GenerateError::EmptyResponse);
    }

    Ok(text)
}

/// Message of a Gemini error body, if it has one
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json["error"]["message"].as_str().map(str::to_string)
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError> {
        if self.api_key.is_empty() {
            return Err(GenerateError::AuthenticationError);
        }

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(request))
            .send()
            .await?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(GenerateError::AuthenticationError);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            tracing::debug!("Gemini returned {}: {}", status, message);

            return Err(GenerateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| GenerateError::Malformed(format!("Failed to parse response: {}", e)))?;

        response_text(&json)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Gemini".to_string(),
            model: self.model.clone(),
            requires_api_key: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(schema: Option<Value>) -> GenerateRequest {
        GenerateRequest {
            system_instruction: "You are a dictionary.".into(),
            prompt: "Entry for: \"bil\".".into(),
            response_schema: schema,
            temperature: 0.0,
        }
    }

    #[test]
    fn endpoint_joins_url_and_model() {
        let generator = GeminiGenerator::new(
            "key".into(),
            "https://example.test/v1beta/".into(),
            "gemini-1.5-flash".into(),
        );
        assert_eq!(
            generator.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn body_carries_instruction_prompt_and_schema() {
        let body = request_body(&request(Some(json!({ "type": "ARRAY" }))));

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a dictionary.");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Entry for: \"bil\".");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert_eq!(body["generationConfig"]["temperature"], 0.0);

        let body = request_body(&request(None));
        assert!(body["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn text_is_read_from_first_candidate() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "[{\"word\":" }, { "text": "\"bil\"}]" }] } }]
        });
        assert_eq!(response_text(&body).unwrap(), "[{\"word\":\"bil\"}]");
    }

    #[test]
    fn missing_or_blocked_text_is_an_error() {
        assert!(matches!(
            response_text(&json!({ "candidates": [] })),
            Err(GenerateError::EmptyResponse)
        ));
        assert!(matches!(
            response_text(&json!({ "promptFeedback": { "blockReason": "SAFETY" } })),
            Err(GenerateError::Malformed(_))
        ));
    }

    #[test]
    fn error_body_message_is_extracted() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded for model", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(error_message(body).as_deref(), Some("Quota exceeded for model"));
        assert_eq!(error_message("<html>"), None);
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let generator = GeminiGenerator::new(
            String::new(),
            "http://127.0.0.1:9".into(),
            "gemini-1.5-flash".into(),
        );
        let err = generator.generate(&request(None)).await.unwrap_err();
        assert!(matches!(err, GenerateError::AuthenticationError));
    }
}
