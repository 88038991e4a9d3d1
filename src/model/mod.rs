use actix_web::http::StatusCode;
use actix_web::web::Bytes;
use anyhow::Result;
use futures_util::Stream;
use futures_util::StreamExt;
use log::{debug, error, info};
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;

use crate::web::models::{ContentPart, ImageUrl, UpstreamMessage};
use crate::web::ApiError;

const DEFAULT_API_URL: &str = "https://qianfan.baidubce.com/v2";
const DEFAULT_MODEL: &str = "ernie-5.0-thinking-preview";

// Instruction template sent alongside the avatar image.
const ANALYSIS_PROMPT: &str = "You are an experienced personality analyst who reads character and taste from a user's avatar and nickname.

Using the avatar image and nickname provided, write a thorough and entertaining personality analysis. Cover:

1. Avatar reading: the overall style (real photo, cartoon, landscape, animal, abstract art), the colour palette (warm or cool, bright or muted), and what the composition and way of presenting themselves suggests.

2. Nickname reading: the language style (literary, humorous, minimal, edgy), any deeper meaning it may carry, and the self-image the user seems to be going for.

3. Personality portrait: outgoing or reserved, rational or emotional, three to five keyword traits, and their likely way of handling things.

4. Interests and tastes: probable hobbies, aesthetic preferences and lifestyle leanings.

5. Social profile: how they relate to people and the role they tend to play in a group.

6. Friendly suggestions: one or two personalised tips for daily life or socialising based on the analysis.

Keep the tone light, insightful and kind, so the user feels understood. Be specific and detailed, but stay positive throughout. This is an entertainment feature, so keep everything friendly and avoid anything negative or offensive.

Do not use markdown formatting; output plain text with paragraphs separated by line breaks.";

// A client for the Qianfan ERNIE multimodal chat API
pub struct ErnieModel {
    api_url: String,
    model_name: String,
    client: Client,
}

impl ErnieModel {
    pub async fn new() -> Result<Self> {
        // Get API URL and model name from environment or use defaults
        let api_url =
            env::var("WENXIN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model_name =
            env::var("WENXIN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        info!("Using ERNIE API at: {} (model: {})", api_url, model_name);

        Ok(Self {
            api_url,
            model_name,
            client: Client::new(),
        })
    }

    fn build_payload(&self, nickname: &str, image_base64: &str) -> Value {
        let message = UpstreamMessage {
            role: "user".to_string(),
            content: vec![
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:image/jpeg;base64,{}", image_base64),
                    },
                },
                ContentPart::Text {
                    text: build_instruction(nickname),
                },
            ],
        };

        json!({
            "model": self.model_name,
            "stream": true,
            "enable_thinking": false,
            "messages": [message],
        })
    }

    // Issues the outbound analysis call and hands back the raw streaming
    // response once the upstream has accepted the request.
    pub async fn stream_analysis(
        &self,
        nickname: &str,
        image_base64: &str,
    ) -> std::result::Result<reqwest::Response, ApiError> {
        // The credential is read per request so a fixed deployment
        // recovers without a restart
        let api_key = env::var("WENXIN_API_KEY").map_err(|_| {
            ApiError::Configuration(
                "API key not configured; set WENXIN_API_KEY in the server environment"
                    .to_string(),
            )
        })?;

        let payload = self.build_payload(nickname, image_base64);
        let url = format!("{}/chat/completions", self.api_url);

        debug!("Requesting streamed analysis from {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = StatusCode::from_u16(response.status().as_u16())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            // Upstream error bodies are for the operator, not the client
            let body = response.text().await.unwrap_or_default();
            error!("ERNIE API error ({}): {}", status, body);
            return Err(ApiError::Upstream(status));
        }

        Ok(response)
    }
}

// Forwards the upstream SSE bytes chunk-for-chunk, closing with a single
// `data: [DONE]` event when the upstream stream ends. Chunks are pulled one
// at a time, so a slow client throttles the upstream read instead of
// growing a buffer.
pub fn relay_stream(
    response: reqwest::Response,
) -> impl Stream<Item = std::result::Result<Bytes, ApiError>> {
    async_stream::stream! {
        let mut upstream = response.bytes_stream();

        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => yield Ok(bytes),
                Err(e) => {
                    error!("Error while reading analysis stream: {}", e);
                    yield Err(ApiError::Request(e));
                    return;
                }
            }
        }

        yield Ok(Bytes::from_static(b"data: [DONE]\n\n"));
    }
}

fn build_instruction(nickname: &str) -> String {
    format!(
        "{}\n\nUser nickname: \"{}\"\n\nBased on the avatar image above and this nickname, write a fun personality analysis.",
        ANALYSIS_PROMPT, nickname
    )
}

// Singleton instance for the model client
pub struct ModelManager {
    pub model: Arc<ErnieModel>,
}

impl ModelManager {
    pub async fn new() -> Result<Self> {
        let model = ErnieModel::new().await?;
        Ok(Self {
            model: Arc::new(model),
        })
    }
}
