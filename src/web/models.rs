use serde::{Deserialize, Serialize};

// Fields are optional so an absent key fails validation in the handler
// instead of failing deserialization.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub nickname: Option<String>,
    #[serde(rename = "imageBase64")]
    pub image_base64: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpstreamMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

// Multipart message content for the OpenAI-compatible vision API.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}
